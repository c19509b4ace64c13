//! Tests for field normalization

use crate::app::models::{RawRecord, SchemaDefinition};
use std::sync::Arc;

pub mod canonical_tests;
pub mod numbers_tests;

/// Raw record for a schema, with fields given by column name
pub fn raw_record(
    schema: &Arc<SchemaDefinition>,
    row_index: u64,
    values: &[(&str, &str)],
) -> RawRecord {
    let fields = schema
        .columns
        .iter()
        .map(|column| {
            values
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        })
        .collect();

    RawRecord::new(Arc::clone(schema), Arc::from("fixture.txt"), row_index, fields)
}
