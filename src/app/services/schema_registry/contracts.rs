//! Schema contracts supplied as TOML
//!
//! A contract file lists additional eras as `[[schema]]` tables:
//!
//! ```toml
//! [[schema]]
//! file_type = "device"
//! name = "device-36"
//! start_year = 2026
//! columns = ["MDR_REPORT_KEY", "DEVICE_EVENT_KEY"]
//! ```

use super::SchemaRegistry;
use crate::app::models::{FileType, SchemaDefinition};
use crate::constants::{DEFAULT_DELIMITER, DEFAULT_ENCODING};
use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Top-level layout of a contract file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaContractFile {
    #[serde(default, rename = "schema")]
    pub schemas: Vec<SchemaContract>,
}

/// One era contract as written in TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaContract {
    pub file_type: FileType,
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_has_header() -> bool {
    true
}

impl SchemaContract {
    pub fn into_definition(self) -> (FileType, SchemaDefinition) {
        let mut schema = SchemaDefinition::new(self.name, self.columns)
            .with_years(self.start_year, self.end_year)
            .with_delimiter(self.delimiter)
            .with_encoding(self.encoding);
        if !self.has_header {
            schema = schema.without_header();
        }
        (self.file_type, schema)
    }
}

impl SchemaContractFile {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        let content = fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read schema contracts {}", path.display()), e)
        })?;
        Self::parse(&content)
    }
}

impl SchemaRegistry {
    /// Register every contract in a TOML file, returning how many were added
    ///
    /// Contracts are registered in file order; the first invalid or duplicate
    /// entry aborts the load and leaves the earlier ones registered.
    pub fn load_contracts(&mut self, path: &Path) -> Result<usize> {
        let file = SchemaContractFile::from_file(path)?;
        let count = file.schemas.len();

        for contract in file.schemas {
            let (file_type, schema) = contract.into_definition();
            self.register(file_type, schema)?;
        }

        info!("Loaded {} schema contracts from {}", count, path.display());
        Ok(count)
    }
}
