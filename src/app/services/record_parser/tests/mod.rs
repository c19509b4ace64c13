//! Shared fixtures for record parser tests

use crate::app::models::SchemaDefinition;
use std::sync::Arc;

pub mod reader_tests;

/// Three-column headered schema
pub fn abc_schema() -> Arc<SchemaDefinition> {
    Arc::new(SchemaDefinition::new("abc", ["A", "B", "C"]))
}

/// Three-column schema without a header line
pub fn headerless_schema() -> Arc<SchemaDefinition> {
    Arc::new(SchemaDefinition::new("abc-raw", ["A", "B", "C"]).without_header())
}
