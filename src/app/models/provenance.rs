//! Provenance records for load attempts
//!
//! One [`ProvenanceEntry`] is appended per load attempt, successful or not.
//! Reprocessing a file appends a new entry rather than replacing the old one.

use super::FileType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final status of a load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Complete,
    Failed,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Complete => f.write_str("complete"),
            LoadStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Metadata identifying which file and attempt produced a set of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Source file name (the tag stamped on every record)
    pub source_file: String,

    /// File type of the source, when it could be inferred
    pub file_type: Option<FileType>,

    /// When the attempt started
    pub loaded_at: DateTime<Utc>,

    /// Schema era used; None when detection failed
    pub schema: Option<String>,

    pub rows_read: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,

    pub status: LoadStatus,

    /// Wall-clock duration of the attempt
    pub elapsed_ms: u64,

    /// Starting data row when the attempt resumed an interrupted load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed_from: Option<u64>,

    /// Error message for failed attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProvenanceEntry {
    pub fn is_complete(&self) -> bool {
        self.status == LoadStatus::Complete
    }

    /// Accepted rows per second over the attempt
    pub fn throughput(&self) -> f64 {
        if self.elapsed_ms == 0 {
            self.rows_accepted as f64
        } else {
            self.rows_accepted as f64 / (self.elapsed_ms as f64 / 1000.0)
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] schema={} read={} accepted={} rejected={} in {}ms",
            self.source_file,
            self.status,
            self.schema.as_deref().unwrap_or("-"),
            self.rows_read,
            self.rows_accepted,
            self.rows_rejected,
            self.elapsed_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: LoadStatus) -> ProvenanceEntry {
        ProvenanceEntry {
            source_file: "foidev2020.txt".to_string(),
            file_type: Some(FileType::Device),
            loaded_at: Utc::now(),
            schema: Some("device-34".to_string()),
            rows_read: 12,
            rows_accepted: 10,
            rows_rejected: 2,
            status,
            elapsed_ms: 500,
            resumed_from: None,
            error: None,
        }
    }

    #[test]
    fn test_throughput() {
        let e = entry(LoadStatus::Complete);
        assert!((e.throughput() - 20.0).abs() < f64::EPSILON);
        assert!(e.is_complete());
    }

    #[test]
    fn test_serialization_round_trip() {
        let e = entry(LoadStatus::Failed);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(!json.contains("\"error\""));
        let back: ProvenanceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_summary_without_schema() {
        let mut e = entry(LoadStatus::Failed);
        e.schema = None;
        assert!(e.summary().contains("schema=-"));
    }
}
