//! Data models for MAUDE ingestion
//!
//! This module contains the core data structures flowing through the pipeline:
//! file types, era-specific schema contracts, raw records streamed from a file
//! and the typed canonical records produced from them.

pub mod provenance;

use crate::constants::{self, tables};
use crate::{Error, Result};
use chrono::NaiveDate;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub use provenance::{LoadStatus, ProvenanceEntry};

// =============================================================================
// File Types
// =============================================================================

/// The five kinds of MAUDE bulk extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Master event records (`mdrfoi*`)
    Master,
    /// Device records (`foidev*`)
    Device,
    /// Patient records (`patient*`)
    Patient,
    /// Narrative text records (`foitext*`)
    Text,
    /// Device problem codes (`foidevproblem*`)
    ProblemCode,
}

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::Master,
        FileType::Device,
        FileType::Patient,
        FileType::Text,
        FileType::ProblemCode,
    ];

    /// Detect the file type from a MAUDE file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        constants::FILE_PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .and_then(|(_, kind)| kind.parse().ok())
    }

    /// Storage table holding canonical records of this type
    pub fn table_name(&self) -> &'static str {
        match self {
            FileType::Master => tables::MASTER_EVENTS,
            FileType::Device => tables::DEVICES,
            FileType::Patient => tables::PATIENTS,
            FileType::Text => tables::NARRATIVES,
            FileType::ProblemCode => tables::PROBLEM_CODES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Master => "master",
            FileType::Device => "device",
            FileType::Patient => "patient",
            FileType::Text => "text",
            FileType::ProblemCode => "problem_code",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "master" | "mdrfoi" | "event" => Ok(FileType::Master),
            "device" | "foidev" => Ok(FileType::Device),
            "patient" => Ok(FileType::Patient),
            "text" | "foitext" | "narrative" => Ok(FileType::Text),
            "problem_code" | "problem" | "foidevproblem" => Ok(FileType::ProblemCode),
            other => Err(Error::data_validation(format!(
                "Unknown file type '{}'. Expected one of: master, device, patient, text, problem_code",
                other
            ))),
        }
    }
}

// =============================================================================
// Schema Contracts
// =============================================================================

/// Column layout of one file type during one schema era
///
/// Definitions are shared as `Arc<SchemaDefinition>` once registered and are
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Era name, unique within its file type (e.g. "device-34")
    pub name: String,

    /// Ordered column names
    pub columns: Vec<String>,

    /// First extract year this layout applies to (None = open-ended)
    pub start_year: Option<i32>,

    /// Last extract year this layout applies to (None = open-ended)
    pub end_year: Option<i32>,

    /// Declared number of columns
    pub column_count: usize,

    /// Field delimiter
    pub delimiter: char,

    /// Single-byte source encoding label (WHATWG name)
    pub encoding: String,

    /// Whether the first line carries column names
    pub has_header: bool,
}

impl SchemaDefinition {
    /// Create a pipe-delimited, headered, windows-1252 definition
    pub fn new<I>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        Self {
            name: name.into(),
            column_count: columns.len(),
            columns,
            start_year: None,
            end_year: None,
            delimiter: constants::DEFAULT_DELIMITER,
            encoding: constants::DEFAULT_ENCODING.to_string(),
            has_header: true,
        }
    }

    pub fn with_years(mut self, start_year: Option<i32>, end_year: Option<i32>) -> Self {
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }

    /// Whether an extract year falls inside this era
    pub fn covers_year(&self, year: i32) -> bool {
        self.start_year.is_none_or(|start| year >= start)
            && self.end_year.is_none_or(|end| year <= end)
    }

    /// Position of a column by name
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Delimiter as the single byte the reader splits on
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    /// Resolve the declared encoding label
    pub fn resolve_encoding(&self) -> Result<&'static Encoding> {
        resolve_single_byte_encoding(&self.encoding)
            .map_err(|message| Error::invalid_schema(&self.name, message))
    }

    /// Check internal consistency of the definition
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_schema(&self.name, "schema name cannot be empty"));
        }

        if self.columns.is_empty() {
            return Err(Error::invalid_schema(&self.name, "column list cannot be empty"));
        }

        if self.columns.len() != self.column_count {
            return Err(Error::invalid_schema(
                &self.name,
                format!(
                    "declares {} columns but lists {}",
                    self.column_count,
                    self.columns.len()
                ),
            ));
        }

        if !self.delimiter.is_ascii() || self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(Error::invalid_schema(
                &self.name,
                format!("delimiter {:?} must be a single ASCII character", self.delimiter),
            ));
        }

        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(Error::invalid_schema(
                    &self.name,
                    format!("year range {}..={} is empty", start, end),
                ));
            }
        }

        self.resolve_encoding()?;
        Ok(())
    }

    /// Human-readable year range (e.g. "2009-", "-2008", "any")
    pub fn year_range_label(&self) -> String {
        match (self.start_year, self.end_year) {
            (None, None) => "any".to_string(),
            (Some(start), None) => format!("{}-", start),
            (None, Some(end)) => format!("-{}", end),
            (Some(start), Some(end)) => format!("{}-{}", start, end),
        }
    }
}

/// Look up an encoding label and require a single-byte codepage
pub fn resolve_single_byte_encoding(label: &str) -> std::result::Result<&'static Encoding, String> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| format!("unknown encoding label '{}'", label))?;

    if encoding.is_single_byte() {
        Ok(encoding)
    } else {
        Err(format!(
            "encoding '{}' is not a single-byte codepage",
            encoding.name()
        ))
    }
}

// =============================================================================
// Raw Records
// =============================================================================

/// One parsed row, still as raw strings, tied to the schema it was read with
#[derive(Debug, Clone)]
pub struct RawRecord {
    schema: Arc<SchemaDefinition>,
    source_file: Arc<str>,
    row_index: u64,
    fields: Vec<String>,
}

impl RawRecord {
    pub(crate) fn new(
        schema: Arc<SchemaDefinition>,
        source_file: Arc<str>,
        row_index: u64,
        fields: Vec<String>,
    ) -> Self {
        Self {
            schema,
            source_file,
            row_index,
            fields,
        }
    }

    pub fn schema(&self) -> &Arc<SchemaDefinition> {
        &self.schema
    }

    pub fn source_file(&self) -> &Arc<str> {
        &self.source_file
    }

    /// Zero-based data row index (header excluded)
    pub fn row_index(&self) -> u64 {
        self.row_index
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at a position
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Field by column name
    pub fn get_named(&self, column: &str) -> Option<&str> {
        self.schema.index_of(column).and_then(|i| self.get(i))
    }
}

/// A row refused before it reached storage, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row_index: u64,
    pub reason: String,

    /// Leading characters of the raw row
    pub preview: String,
}

impl RejectedRow {
    pub fn new(row_index: u64, reason: impl Into<String>, preview: impl Into<String>) -> Self {
        Self {
            row_index,
            reason: reason.into(),
            preview: preview.into(),
        }
    }
}

// =============================================================================
// Canonical Records
// =============================================================================

/// Typed value of one canonical field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Boolean(bool),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Text)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Integer)
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Date)
    }
}

impl From<Option<bool>> for FieldValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Boolean)
    }
}

/// Fields common to every canonical record variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordBody {
    mdr_report_key: String,
    source_file: Arc<str>,
    fields: Vec<(&'static str, FieldValue)>,
    extra: Vec<(String, String)>,
}

impl RecordBody {
    pub(crate) fn new(
        mdr_report_key: String,
        source_file: Arc<str>,
        fields: Vec<(&'static str, FieldValue)>,
        extra: Vec<(String, String)>,
    ) -> Self {
        Self {
            mdr_report_key,
            source_file,
            fields,
            extra,
        }
    }
}

/// Typed, normalized representation of one parsed row
///
/// Variants are keyed by file type so every consumer must handle all five.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum CanonicalRecord {
    MasterEvent(RecordBody),
    Device(RecordBody),
    Patient(RecordBody),
    Text(RecordBody),
    ProblemCode(RecordBody),
}

impl CanonicalRecord {
    pub(crate) fn from_body(file_type: FileType, body: RecordBody) -> Self {
        match file_type {
            FileType::Master => CanonicalRecord::MasterEvent(body),
            FileType::Device => CanonicalRecord::Device(body),
            FileType::Patient => CanonicalRecord::Patient(body),
            FileType::Text => CanonicalRecord::Text(body),
            FileType::ProblemCode => CanonicalRecord::ProblemCode(body),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            CanonicalRecord::MasterEvent(_) => FileType::Master,
            CanonicalRecord::Device(_) => FileType::Device,
            CanonicalRecord::Patient(_) => FileType::Patient,
            CanonicalRecord::Text(_) => FileType::Text,
            CanonicalRecord::ProblemCode(_) => FileType::ProblemCode,
        }
    }

    fn body(&self) -> &RecordBody {
        match self {
            CanonicalRecord::MasterEvent(body)
            | CanonicalRecord::Device(body)
            | CanonicalRecord::Patient(body)
            | CanonicalRecord::Text(body)
            | CanonicalRecord::ProblemCode(body) => body,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.file_type().table_name()
    }

    /// Report identifier linking variants of the same event
    pub fn report_key(&self) -> &str {
        &self.body().mdr_report_key
    }

    /// Source file this record was loaded from
    pub fn source_file(&self) -> &str {
        &self.body().source_file
    }

    /// Canonical fields in layout order
    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.body().fields
    }

    /// Raw columns with no canonical mapping, copied through unchanged
    pub fn extra(&self) -> &[(String, String)] {
        &self.body().extra
    }

    /// Canonical field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.body()
            .fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Passthrough field by raw column name
    pub fn get_extra(&self, column: &str) -> Option<&str> {
        self.body()
            .extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_type_from_path() {
        let cases = [
            ("mdrfoiThru2023.txt", Some(FileType::Master)),
            ("foidev2015.txt", Some(FileType::Device)),
            ("DEVICE2021.txt", Some(FileType::Device)),
            ("foidevproblem.txt", Some(FileType::ProblemCode)),
            ("patientAdd.txt", Some(FileType::Patient)),
            ("foitext2019.txt", Some(FileType::Text)),
            ("readme.txt", None),
        ];

        for (name, expected) in cases {
            let path = PathBuf::from("/data").join(name);
            assert_eq!(FileType::from_path(&path), expected, "file {}", name);
        }
    }

    #[test]
    fn test_file_type_round_trips_through_str() {
        for file_type in FileType::ALL {
            assert_eq!(file_type.as_str().parse::<FileType>().unwrap(), file_type);
        }
        assert!("nonsense".parse::<FileType>().is_err());
    }

    #[test]
    fn test_schema_covers_year() {
        let schema = SchemaDefinition::new("s", &["A"]).with_years(Some(2009), None);
        assert!(schema.covers_year(2009));
        assert!(schema.covers_year(2030));
        assert!(!schema.covers_year(2008));

        let closed = SchemaDefinition::new("c", &["A"]).with_years(None, Some(2008));
        assert!(closed.covers_year(1991));
        assert!(!closed.covers_year(2009));
    }

    #[test]
    fn test_schema_validation() {
        assert!(SchemaDefinition::new("ok", &["A", "B"]).validate().is_ok());

        let mut miscounted = SchemaDefinition::new("bad", &["A", "B"]);
        miscounted.column_count = 3;
        assert!(matches!(
            miscounted.validate(),
            Err(Error::InvalidSchema { .. })
        ));

        let multibyte = SchemaDefinition::new("utf", &["A"]).with_encoding("utf-8");
        assert!(multibyte.validate().is_err());

        let unknown = SchemaDefinition::new("enc", &["A"]).with_encoding("klingon");
        assert!(unknown.validate().is_err());

        let inverted = SchemaDefinition::new("yrs", &["A"]).with_years(Some(2010), Some(2000));
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_latin1_label_resolves_to_single_byte() {
        let encoding = resolve_single_byte_encoding("latin1").unwrap();
        assert!(encoding.is_single_byte());
    }
}
