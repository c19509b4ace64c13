//! Error handling for MAUDE ingestion operations.
//!
//! Provides structured error types for schema detection, file parsing,
//! storage writes and configuration. Row- and field-level problems are not
//! errors at all: they are counted by the parser and loader instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the MAUDE ingestion pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for MAUDE ingestion
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Delimited reader failed while streaming a file
    #[error("Delimited read error in file '{file}': {message}")]
    Csv {
        file: String,
        message: String,
        #[source]
        source: csv::Error,
    },

    /// File header matched no registered schema; the whole file is refused
    #[error("No registered schema matches '{file}' ({column_count} columns): {reason}")]
    SchemaUnrecognized {
        file: String,
        column_count: usize,
        reason: String,
    },

    /// A schema with the same (file type, name) is already registered
    #[error("Schema '{name}' is already registered for {file_type}")]
    DuplicateSchema { file_type: String, name: String },

    /// A schema definition failed validation at registration time
    #[error("Invalid schema '{name}': {message}")]
    InvalidSchema { name: String, message: String },

    /// Storage write failed during a load; the in-flight batch was abandoned
    #[error("Load of '{file}' failed after {rows_accepted} accepted rows: {message}")]
    LoadFailure {
        file: String,
        rows_accepted: u64,
        message: String,
    },

    /// Storage backend error
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Load job state machine was driven through an illegal edge
    #[error("Invalid load state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a delimited reader error with context
    pub fn csv(file: impl Into<String>, message: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a schema-unrecognized error
    pub fn schema_unrecognized(
        file: impl Into<String>,
        column_count: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaUnrecognized {
            file: file.into(),
            column_count,
            reason: reason.into(),
        }
    }

    /// Create a duplicate schema error
    pub fn duplicate_schema(file_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateSchema {
            file_type: file_type.into(),
            name: name.into(),
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a load failure error
    pub fn load_failure(
        file: impl Into<String>,
        rows_accepted: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::LoadFailure {
            file: file.into(),
            rows_accepted,
            message: message.into(),
        }
    }

    /// Create a storage error without an underlying source
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error wrapping a backend error
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid state transition error
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error means the file must be refused outright
    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::SchemaUnrecognized { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage {
            message: "SQLite operation failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid TOML: {}", error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::DataValidation {
            message: format!("JSON serialization failed: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_unrecognized_message_carries_context() {
        let error = Error::schema_unrecognized("foidev2015.txt", 31, "no schema with 31 columns");
        let message = error.to_string();
        assert!(message.contains("foidev2015.txt"));
        assert!(message.contains("31 columns"));
        assert!(error.is_schema_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: Error = io.into();
        assert!(matches!(error, Error::Io { .. }));
        assert!(!error.is_schema_error());
    }

    #[test]
    fn test_load_failure_message() {
        let error = Error::load_failure("mdrfoi2020.txt", 150_000, "disk full");
        assert_eq!(
            error.to_string(),
            "Load of 'mdrfoi2020.txt' failed after 150000 accepted rows: disk full"
        );
    }
}
