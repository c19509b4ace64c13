//! Application constants for the MAUDE ingestion pipeline
//!
//! This module contains default values, file naming conventions and code
//! tables used throughout the pipeline.

// =============================================================================
// File Formats
// =============================================================================

/// Field delimiter used by every MAUDE bulk extract
pub const DEFAULT_DELIMITER: char = '|';

/// Legacy single-byte codepage the FDA extracts are published in
pub const DEFAULT_ENCODING: &str = "windows-1252";

/// File name prefixes per file type, checked in this order
///
/// `foidevproblem` must be tested before `foidev` because it shares the prefix.
pub const FILE_PREFIXES: &[(&str, &str)] = &[
    ("foidevproblem", "problem_code"),
    ("deviceproblem", "problem_code"),
    ("mdrfoi", "master"),
    ("foidev", "device"),
    ("device", "device"),
    ("patient", "patient"),
    ("foitext", "text"),
];

/// Earliest and latest plausible extract years used for year-hint inference
pub const MIN_HINT_YEAR: i32 = 1900;
pub const MAX_HINT_YEAR: i32 = 2099;

// =============================================================================
// Storage Tables
// =============================================================================

pub mod tables {
    pub const MASTER_EVENTS: &str = "master_events";
    pub const DEVICES: &str = "devices";
    pub const PATIENTS: &str = "patients";
    pub const NARRATIVES: &str = "narratives";
    pub const PROBLEM_CODES: &str = "problem_codes";
    pub const PROVENANCE: &str = "load_provenance";

    pub const ALL: &[&str] = &[MASTER_EVENTS, DEVICES, PATIENTS, NARRATIVES, PROBLEM_CODES];
}

/// Column shared by every canonical table linking variants of one event
pub const REPORT_KEY_COLUMN: &str = "MDR_REPORT_KEY";

// =============================================================================
// Field Normalization
// =============================================================================

/// Sentinel returned when a manufacturer name is empty
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

/// Separators accepted between outcome codes
pub const OUTCOME_SEPARATORS: &[char] = &[';', ','];

/// Patient outcome codes and the flag each one sets
///
/// The single-letter forms appear in the older extracts, the two-letter forms
/// in the current ones.
pub mod outcome_codes {
    pub const DEATH: &[&str] = &["D"];
    pub const LIFE_THREATENING: &[&str] = &["L"];
    pub const HOSPITALIZATION: &[&str] = &["H"];
    pub const DISABILITY: &[&str] = &["S", "DS"];
    pub const CONGENITAL_ANOMALY: &[&str] = &["C", "CA"];
    pub const REQUIRED_INTERVENTION: &[&str] = &["R", "RI"];
    pub const OTHER: &[&str] = &["O", "OT"];
}

// =============================================================================
// Processing Defaults
// =============================================================================

/// Records per bulk insert
pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// Maximum characters kept per field before truncation
pub const DEFAULT_MAX_FIELD_LENGTH: usize = 32_000;

/// Rejected rows retained for diagnostics per load
pub const DEFAULT_DIAGNOSTIC_SAMPLE_SIZE: usize = 10;

/// Upper bound on concurrent file loads
pub const MAX_PARALLEL_WORKERS: usize = 32;

/// Characters of a rejected row kept in the diagnostic sample
pub const REJECTED_ROW_PREVIEW_CHARS: usize = 200;

/// Default SQLite database file name
pub const DEFAULT_DATABASE_FILE: &str = "maude.sqlite";

/// Config directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "maude-ingest";
