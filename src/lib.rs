//! MAUDE Ingest Library
//!
//! A Rust library for loading FDA MAUDE medical-device adverse-event bulk
//! extracts into a normalized, queryable SQLite store.
//!
//! This library provides tools for:
//! - Registering the column layouts the extracts used across eras and
//!   detecting which one a file follows
//! - Streaming pipe-delimited rows in the legacy single-byte codepage
//! - Normalizing dates, numbers, manufacturer names, outcome codes and
//!   narrative text into typed canonical records
//! - Loading records in batches so that reprocessing a file is idempotent
//! - Recording provenance for every load attempt

pub mod config;
pub mod constants;
pub mod error;

// Core application modules
pub mod app {
    pub mod models;
    pub mod pipeline;
    pub mod services {
        pub mod batch_loader;
        pub mod field_transformer;
        pub mod record_parser;
        pub mod schema_registry;
        pub mod storage;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CanonicalRecord, FieldValue, FileType, ProvenanceEntry, SchemaDefinition};
pub use app::pipeline::{Pipeline, PipelineOptions};
pub use config::Config;
pub use error::{Error, Result};
