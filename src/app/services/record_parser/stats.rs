//! Counters kept while streaming a file

use serde::{Deserialize, Serialize};

/// Row and field counters for one stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data rows read after the resume offset
    pub rows_seen: u64,

    /// Rows yielded as raw records
    pub rows_yielded: u64,

    /// Rows yielded as malformed (too few fields)
    pub rows_malformed: u64,

    /// Rows whose overflow fields were folded into the last column
    pub rows_rejoined: u64,

    /// Fields cut to the maximum length
    pub fields_truncated: u64,

    /// Rows skipped by the resume offset
    pub rows_skipped: u64,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of seen rows yielded as records, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.rows_seen == 0 {
            0.0
        } else {
            (self.rows_yielded as f64 / self.rows_seen as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows seen, {} parsed, {} malformed, {} truncated fields, {} skipped ({:.1}% success)",
            self.rows_seen,
            self.rows_yielded,
            self.rows_malformed,
            self.fields_truncated,
            self.rows_skipped,
            self.success_rate()
        )
    }
}
