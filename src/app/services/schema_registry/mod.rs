//! Schema registry for era-specific MAUDE column layouts
//!
//! The registry holds every known [`SchemaDefinition`] grouped by file type.
//! Definitions are validated on registration and shared as `Arc` afterwards;
//! detection of the schema for a given file header lives in [`detector`].

use crate::app::models::{FileType, SchemaDefinition};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub mod builtin;
pub mod contracts;
pub mod detector;

#[cfg(test)]
pub mod tests;

pub use builtin::builtin_schemas;
pub use contracts::{SchemaContract, SchemaContractFile};
pub use detector::{year_hint_from_path, Detection};

/// Registered schema eras keyed by file type
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Definitions per file type in registration order
    pub(crate) schemas: BTreeMap<FileType, Vec<Arc<SchemaDefinition>>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the historical MAUDE eras
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        for (file_type, schema) in builtin_schemas() {
            registry.register(file_type, schema)?;
        }
        Ok(registry)
    }

    /// Built-in eras plus any contracts from a TOML file
    pub fn with_contracts(path: &Path) -> Result<Self> {
        let mut registry = Self::with_builtin()?;
        registry.load_contracts(path)?;
        Ok(registry)
    }

    /// Add a definition for a file type
    ///
    /// Fails if the definition is internally inconsistent or a definition with
    /// the same name already exists for that file type.
    pub fn register(
        &mut self,
        file_type: FileType,
        schema: SchemaDefinition,
    ) -> Result<Arc<SchemaDefinition>> {
        schema.validate()?;

        let entries = self.schemas.entry(file_type).or_default();
        if entries.iter().any(|existing| existing.name == schema.name) {
            return Err(Error::duplicate_schema(file_type.as_str(), &schema.name));
        }

        debug!(
            "Registered schema {} for {} ({} columns, years {})",
            schema.name,
            file_type,
            schema.column_count,
            schema.year_range_label()
        );

        let schema = Arc::new(schema);
        entries.push(Arc::clone(&schema));
        Ok(schema)
    }

    /// Definitions registered for a file type
    pub fn schemas(&self, file_type: FileType) -> &[Arc<SchemaDefinition>] {
        self.schemas
            .get(&file_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a definition by name
    pub fn get(&self, file_type: FileType, name: &str) -> Option<&Arc<SchemaDefinition>> {
        self.schemas(file_type).iter().find(|s| s.name == name)
    }

    /// Every (file type, definition) pair in file-type order
    pub fn iter(&self) -> impl Iterator<Item = (FileType, &Arc<SchemaDefinition>)> {
        self.schemas
            .iter()
            .flat_map(|(file_type, list)| list.iter().map(move |s| (*file_type, s)))
    }

    /// Total number of registered definitions
    pub fn len(&self) -> usize {
        self.schemas.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
