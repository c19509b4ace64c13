//! Streaming parser for pipe-delimited MAUDE extracts
//!
//! Files are read lazily row by row, decoded with the schema's single-byte
//! encoding and turned into [`RawRecord`]s tied to the detected schema.
//! Rows that cannot satisfy the schema are yielded as [`MalformedRow`] items
//! rather than stopping the stream.
//!
//! ## Architecture
//!
//! - [`header`] - First-line sniffing used by schema detection
//! - [`reader`] - The lazy [`RecordStream`] iterator
//! - [`stats`] - Counters kept while streaming
//!
//! ## Usage
//!
//! ```no_run
//! use maude_ingest::app::services::record_parser::{ParseOptions, ParsedRow, RecordParser};
//! use maude_ingest::app::services::schema_registry::SchemaRegistry;
//! use maude_ingest::app::models::FileType;
//! use std::path::Path;
//!
//! # fn example() -> maude_ingest::Result<()> {
//! let registry = SchemaRegistry::with_builtin()?;
//! let schema = registry.get(FileType::Device, "device-34").unwrap().clone();
//!
//! let mut stream = RecordParser::new(ParseOptions::default())
//!     .open(Path::new("foidev2021.txt"), schema)?;
//! for row in stream.by_ref() {
//!     if let ParsedRow::Record(record) = row? {
//!         println!("{:?}", record.get_named("BRAND_NAME"));
//!     }
//! }
//! println!("{}", stream.stats().summary());
//! # Ok(())
//! # }
//! ```

pub mod header;
pub mod reader;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use header::sniff_header;
pub use reader::{MalformedRow, ParsedRow, RecordStream};
pub use stats::ParseStats;

use crate::app::models::SchemaDefinition;
use crate::constants::DEFAULT_MAX_FIELD_LENGTH;
use crate::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Per-file parsing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum characters kept per field
    pub max_field_length: usize,

    /// Data rows to skip before yielding (resume offset)
    pub start_row: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
            start_row: 0,
        }
    }
}

impl ParseOptions {
    pub fn with_start_row(mut self, start_row: u64) -> Self {
        self.start_row = start_row;
        self
    }

    pub fn with_max_field_length(mut self, max_field_length: usize) -> Self {
        self.max_field_length = max_field_length;
        self
    }
}

/// Opens record streams for files with a known schema
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    options: ParseOptions,
}

impl RecordParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Start streaming a file from the beginning
    ///
    /// Each call opens the file afresh, so a stream can be restarted by
    /// opening it again.
    pub fn open(&self, path: &Path, schema: Arc<SchemaDefinition>) -> Result<RecordStream<File>> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path)
            } else {
                Error::io(format!("Failed to open {}", path.display()), e)
            }
        })?;

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(
            "Streaming {} with schema {} from row {}",
            source, schema.name, self.options.start_row
        );

        self.from_reader(file, source, schema)
    }

    /// Stream rows from any reader, labelling records with `source`
    pub fn from_reader<R: Read>(
        &self,
        reader: R,
        source: impl Into<Arc<str>>,
        schema: Arc<SchemaDefinition>,
    ) -> Result<RecordStream<R>> {
        RecordStream::new(reader, source.into(), schema, self.options)
    }
}

/// Decode one field with a single-byte codepage
pub(crate) fn decode_field(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> String {
    encoding.decode_without_bom_handling(bytes).0.into_owned()
}
