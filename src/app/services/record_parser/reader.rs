//! Lazy row iterator over a delimited extract

use super::stats::ParseStats;
use super::{ParseOptions, decode_field};
use crate::app::models::{RawRecord, RejectedRow, SchemaDefinition};
use crate::constants::REJECTED_ROW_PREVIEW_CHARS;
use crate::{Error, Result};
use csv::{ByteRecord, Reader, ReaderBuilder};
use encoding_rs::Encoding;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

/// A data row with fewer fields than its schema declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub row_index: u64,
    pub field_count: usize,
    pub expected: usize,

    /// Leading characters of the raw row for diagnostics
    pub preview: String,
}

impl MalformedRow {
    pub fn reason(&self) -> String {
        format!(
            "expected {} fields, found {}",
            self.expected, self.field_count
        )
    }
}

impl From<MalformedRow> for RejectedRow {
    fn from(row: MalformedRow) -> Self {
        let reason = row.reason();
        RejectedRow::new(row.row_index, reason, row.preview)
    }
}

/// One item of a record stream
#[derive(Debug, Clone)]
pub enum ParsedRow {
    Record(RawRecord),
    Malformed(MalformedRow),
}

/// Streams [`ParsedRow`]s from a reader
///
/// The iterator yields an I/O or decoding failure once as `Err` and returns
/// `None` afterwards.
pub struct RecordStream<R: Read> {
    reader: Reader<R>,
    record: ByteRecord,
    schema: Arc<SchemaDefinition>,
    encoding: &'static Encoding,
    source: Arc<str>,
    options: ParseOptions,
    next_row: u64,
    header_pending: bool,
    finished: bool,
    stats: ParseStats,
}

impl<R: Read> RecordStream<R> {
    pub(crate) fn new(
        reader: R,
        source: Arc<str>,
        schema: Arc<SchemaDefinition>,
        options: ParseOptions,
    ) -> Result<Self> {
        let encoding = schema.resolve_encoding()?;

        // Quotes are literal in the extracts and row widths vary before we
        // validate them ourselves.
        let reader = ReaderBuilder::new()
            .delimiter(schema.delimiter_byte())
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .buffer_capacity(64 * 1024)
            .from_reader(reader);

        Ok(Self {
            reader,
            record: ByteRecord::new(),
            header_pending: schema.has_header,
            schema,
            encoding,
            source,
            options,
            next_row: 0,
            finished: false,
            stats: ParseStats::new(),
        })
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn schema(&self) -> &Arc<SchemaDefinition> {
        &self.schema
    }

    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    /// Read the next line into the reusable record buffer
    fn read_next(&mut self) -> Option<Result<()>> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(())),
            Ok(false) => None,
            Err(e) => Some(Err(Error::csv(
                self.source.as_ref(),
                format!("read failed after {} data rows", self.next_row),
                e,
            ))),
        }
    }

    fn build_row(&mut self, row_index: u64) -> ParsedRow {
        let expected = self.schema.column_count;
        let delimiter = self.schema.delimiter;

        let mut fields: Vec<String> = self
            .record
            .iter()
            .map(|field| decode_field(self.encoding, field))
            .collect();

        if fields.len() < expected {
            let preview: String = fields
                .join(&delimiter.to_string())
                .chars()
                .take(REJECTED_ROW_PREVIEW_CHARS)
                .collect();
            debug!(
                "{}: row {} has {} of {} fields",
                self.source,
                row_index,
                fields.len(),
                expected
            );
            self.stats.rows_malformed += 1;
            return ParsedRow::Malformed(MalformedRow {
                row_index,
                field_count: fields.len(),
                expected,
                preview,
            });
        }

        if fields.len() > expected {
            let overflow = fields.split_off(expected - 1);
            fields.push(overflow.join(&delimiter.to_string()));
            self.stats.rows_rejoined += 1;
        }

        let max = self.options.max_field_length;
        for field in fields.iter_mut() {
            if let Some((cut, _)) = field.char_indices().nth(max) {
                field.truncate(cut);
                self.stats.fields_truncated += 1;
            }
        }

        self.stats.rows_yielded += 1;
        ParsedRow::Record(RawRecord::new(
            Arc::clone(&self.schema),
            Arc::clone(&self.source),
            row_index,
            fields,
        ))
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.read_next() {
                None => {
                    self.finished = true;
                    if self.stats.fields_truncated > 0 {
                        warn!(
                            "{}: truncated {} fields to {} characters",
                            self.source, self.stats.fields_truncated, self.options.max_field_length
                        );
                    }
                    return None;
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                Some(Ok(())) => {}
            }

            if self.header_pending {
                self.header_pending = false;
                continue;
            }

            let row_index = self.next_row;
            self.next_row += 1;

            if row_index < self.options.start_row {
                self.stats.rows_skipped += 1;
                continue;
            }

            self.stats.rows_seen += 1;
            return Some(Ok(self.build_row(row_index)));
        }
    }
}

impl<R: Read> std::iter::FusedIterator for RecordStream<R> {}

impl<R: Read> std::fmt::Debug for RecordStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream")
            .field("source", &self.source)
            .field("schema", &self.schema.name)
            .field("next_row", &self.next_row)
            .field("finished", &self.finished)
            .field("stats", &self.stats)
            .finish()
    }
}
