//! Shared fixtures for schema registry tests

use crate::app::models::SchemaDefinition;

pub mod detector_tests;

/// Header line with `count` generic column names
pub fn header(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("COL_{}", i)).collect()
}

/// Schema with `count` generic columns
pub fn schema(name: &str, count: usize) -> SchemaDefinition {
    SchemaDefinition::new(name, header(count))
}
