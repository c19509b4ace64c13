//! Schema detection from an observed file header
//!
//! Detection is a pure lookup: the observed column count selects the
//! candidates of the file type, and the year hint breaks ties between eras
//! that share a count.

use super::SchemaRegistry;
use crate::app::models::{FileType, SchemaDefinition};
use crate::constants::{MAX_HINT_YEAR, MIN_HINT_YEAR};
use crate::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a successful detection
#[derive(Debug, Clone)]
pub struct Detection {
    pub schema: Arc<SchemaDefinition>,

    /// Number of registered eras sharing the observed column count
    pub candidates: usize,

    /// Whether the year hint was needed to pick the schema
    pub resolved_by_year: bool,

    /// Header names that differ from the schema's declared names
    pub renamed_columns: Vec<(usize, String)>,
}

impl SchemaRegistry {
    /// Select the schema for a file from its header columns
    ///
    /// `source` only labels the error. A single count match is returned
    /// without consulting `year_hint`.
    pub fn detect(
        &self,
        file_type: FileType,
        header_columns: &[String],
        year_hint: Option<i32>,
        source: &str,
    ) -> Result<Detection> {
        let column_count = header_columns.len();
        let candidates: Vec<&Arc<SchemaDefinition>> = self
            .schemas(file_type)
            .iter()
            .filter(|s| s.column_count == column_count)
            .collect();

        let (schema, resolved_by_year) = match candidates.as_slice() {
            [] => {
                let known = self
                    .schemas(file_type)
                    .iter()
                    .map(|s| s.column_count.to_string())
                    .collect::<Vec<_>>();
                let reason = if known.is_empty() {
                    format!("no schemas registered for {}", file_type)
                } else {
                    format!(
                        "{} schemas have {} columns",
                        file_type,
                        known.join(" or ")
                    )
                };
                return Err(Error::schema_unrecognized(source, column_count, reason));
            }
            [only] => (Arc::clone(only), false),
            several => {
                let names = several
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let Some(year) = year_hint else {
                    return Err(Error::schema_unrecognized(
                        source,
                        column_count,
                        format!("ambiguous between {} and no year hint given", names),
                    ));
                };
                match several.iter().find(|s| s.covers_year(year)) {
                    Some(schema) => (Arc::clone(schema), true),
                    None => {
                        return Err(Error::schema_unrecognized(
                            source,
                            column_count,
                            format!("ambiguous between {} and none covers {}", names, year),
                        ));
                    }
                }
            }
        };

        let renamed_columns = renamed_columns(&schema, header_columns);
        if !renamed_columns.is_empty() {
            warn!(
                "{}: {} header names differ from schema {}",
                source,
                renamed_columns.len(),
                schema.name
            );
        }

        debug!(
            "{}: detected schema {} ({} candidates, year hint {:?})",
            source,
            schema.name,
            candidates.len(),
            year_hint
        );

        Ok(Detection {
            schema,
            candidates: candidates.len(),
            resolved_by_year,
            renamed_columns,
        })
    }
}

fn renamed_columns(schema: &SchemaDefinition, header_columns: &[String]) -> Vec<(usize, String)> {
    header_columns
        .iter()
        .zip(&schema.columns)
        .enumerate()
        .filter(|(_, (observed, declared))| !observed.trim().eq_ignore_ascii_case(declared))
        .map(|(index, (observed, _))| (index, observed.clone()))
        .collect()
}

/// Extract year implied by a file name
///
/// Takes the last run of exactly four digits in the file stem that falls in
/// the plausible extract range, so `mdrfoiThru2023.txt` gives 2023.
pub fn year_hint_from_path(path: &Path) -> Option<i32> {
    let stem = path.file_stem()?.to_string_lossy();

    stem.split(|c: char| !c.is_ascii_digit())
        .filter(|run| run.len() == 4)
        .filter_map(|run| run.parse::<i32>().ok())
        .filter(|year| (MIN_HINT_YEAR..=MAX_HINT_YEAR).contains(year))
        .last()
}
