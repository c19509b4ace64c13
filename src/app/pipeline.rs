//! End-to-end processing of one bulk extract
//!
//! A [`Pipeline`] runs the stages for a single file in order:
//! file-type and year-hint inference, header sniffing, schema detection,
//! streaming parse, per-row transformation and batch loading. Every attempt
//! ends with one provenance entry appended to the configured sink, including
//! files whose schema could not be recognized.

use crate::app::models::{
    FileType, LoadStatus, ProvenanceEntry, resolve_single_byte_encoding,
};
use crate::app::services::batch_loader::{BatchLoader, LoadOptions, LoadOutcome, RowOutcome};
use crate::app::services::field_transformer::CanonicalBuilder;
use crate::app::services::record_parser::{ParseOptions, ParsedRow, RecordParser, sniff_header};
use crate::app::services::schema_registry::{Detection, SchemaRegistry, year_hint_from_path};
use crate::app::services::storage::{ProvenanceSink, Storage};
use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_DELIMITER, DEFAULT_ENCODING};
use crate::{Error, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Per-file settings for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub batch_size: usize,
    pub parse: ParseOptions,
    pub load: LoadOptions,

    /// File type to use instead of inferring one from the file name
    pub file_type: Option<FileType>,

    /// Year used instead of the one in the file name
    pub year_hint: Option<i32>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parse: ParseOptions::default(),
            load: LoadOptions::default(),
            file_type: None,
            year_hint: None,
        }
    }
}

impl PipelineOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    pub fn with_year_hint(mut self, year: i32) -> Self {
        self.year_hint = Some(year);
        self
    }

    pub fn with_start_row(mut self, start_row: u64) -> Self {
        self.parse = self.parse.with_start_row(start_row);
        self
    }
}

/// Result of detecting a file's type and schema without loading it
#[derive(Debug, Clone)]
pub struct FileInspection {
    pub file_name: String,
    pub file_type: FileType,
    pub year_hint: Option<i32>,
    pub column_count: usize,
    pub detection: Detection,
}

/// Runs files through detection, parsing, transformation and loading
pub struct Pipeline<S: Storage, P: ProvenanceSink> {
    registry: Arc<SchemaRegistry>,
    storage: S,
    provenance: P,
    options: PipelineOptions,
    cancellation: Option<CancellationToken>,
}

impl<S: Storage, P: ProvenanceSink> Pipeline<S, P> {
    pub fn new(registry: Arc<SchemaRegistry>, storage: S, provenance: P, options: PipelineOptions) -> Self {
        Self {
            registry,
            storage,
            provenance,
            options,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn provenance(&self) -> &P {
        &self.provenance
    }

    pub fn into_parts(self) -> (S, P) {
        (self.storage, self.provenance)
    }

    /// Detect the file type and schema era of a file
    pub fn inspect(&self, path: &Path) -> Result<FileInspection> {
        inspect_file(&self.registry, path, &self.options)
    }

    fn resume_row(&self) -> Option<u64> {
        let start_row = self.options.parse.start_row;
        (start_row > 0).then_some(start_row)
    }

    /// Load one file and record its provenance
    ///
    /// Errors that prevent loading from starting (unknown file type, missing
    /// file, unrecognized schema) are returned after a `Failed` provenance
    /// entry with zero rows has been appended. Failures during loading are
    /// reported through the returned outcome's state.
    pub fn run_file(&mut self, path: &Path) -> Result<LoadOutcome> {
        let started = Instant::now();
        let loaded_at = Utc::now();
        let file_name = file_name_of(path);

        let inspection = match self.inspect(path) {
            Ok(inspection) => inspection,
            Err(e) => {
                warn!("Skipping {}: {}", file_name, e);
                let entry = ProvenanceEntry {
                    source_file: file_name,
                    file_type: self.options.file_type.or_else(|| FileType::from_path(path)),
                    loaded_at,
                    schema: None,
                    rows_read: 0,
                    rows_accepted: 0,
                    rows_rejected: 0,
                    status: LoadStatus::Failed,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    resumed_from: self.resume_row(),
                    error: Some(e.to_string()),
                };
                self.provenance.append(&entry)?;
                return Err(e);
            }
        };

        let schema = Arc::clone(&inspection.detection.schema);
        let file_type = inspection.file_type;
        info!(
            "{}: {} file, schema {} ({} columns, year hint {})",
            file_name,
            file_type,
            schema.name,
            inspection.column_count,
            inspection
                .year_hint
                .map_or_else(|| "none".to_string(), |y| y.to_string())
        );

        let parser = RecordParser::new(self.options.parse);
        let mut stream = parser.open(path, Arc::clone(&schema))?;
        let builder = CanonicalBuilder::new(file_type, &schema);

        let rows = stream.by_ref().map(|row| {
            row.map(|parsed| match parsed {
                ParsedRow::Record(raw) => match builder.build(&raw) {
                    Ok(record) => RowOutcome::Accepted(record),
                    Err(rejected) => RowOutcome::Rejected(rejected),
                },
                ParsedRow::Malformed(malformed) => RowOutcome::Rejected(malformed.into()),
            })
        });

        let load_options = LoadOptions {
            resume_from: self.options.parse.start_row,
            ..self.options.load
        };
        let mut loader = BatchLoader::new(&mut self.storage, load_options);
        if let Some(token) = &self.cancellation {
            loader = loader.with_cancellation(token.clone());
        }
        let outcome = loader.load(&file_name, file_type, &schema.name, rows, self.options.batch_size);

        let stats = stream.stats();
        debug!("{}: {}", file_name, stats.summary());
        if stats.fields_truncated > 0 {
            warn!(
                "{}: {} fields truncated to {} characters",
                file_name, stats.fields_truncated, self.options.parse.max_field_length
            );
        }

        self.provenance.append(&outcome.entry)?;
        Ok(outcome)
    }
}

/// Infer the file type, sniff the header and detect the schema of a file
pub fn inspect_file(registry: &SchemaRegistry, path: &Path, options: &PipelineOptions) -> Result<FileInspection> {
    let file_name = file_name_of(path);

    let file_type = match options.file_type.or_else(|| FileType::from_path(path)) {
        Some(file_type) => file_type,
        None => {
            return Err(Error::data_validation(format!(
                "Cannot infer file type of {} from its name",
                file_name
            )));
        }
    };

    let year_hint = options.year_hint.or_else(|| year_hint_from_path(path));
    let (delimiter, encoding) = sniff_settings(registry, file_type)?;
    let header = sniff_header(path, delimiter, encoding)?;
    let column_count = header.len();

    let detection = registry.detect(file_type, &header, year_hint, &file_name)?;

    Ok(FileInspection {
        file_name,
        file_type,
        year_hint,
        column_count,
        detection,
    })
}

/// Delimiter and encoding used to read a header before the era is known
fn sniff_settings(registry: &SchemaRegistry, file_type: FileType) -> Result<(u8, &'static encoding_rs::Encoding)> {
    match registry.schemas(file_type).first() {
        Some(schema) => Ok((schema.delimiter_byte(), schema.resolve_encoding()?)),
        None => {
            let encoding = resolve_single_byte_encoding(DEFAULT_ENCODING).map_err(Error::configuration)?;
            Ok((DEFAULT_DELIMITER as u8, encoding))
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
