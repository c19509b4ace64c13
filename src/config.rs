//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! command-line overrides applied by the CLI, and finally [`Config::validate`].

use crate::app::models::resolve_single_byte_encoding;
use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_FILE, DEFAULT_DIAGNOSTIC_SAMPLE_SIZE,
    DEFAULT_ENCODING, DEFAULT_MAX_FIELD_LENGTH, MAX_PARALLEL_WORKERS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-file ingestion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Canonical records per bulk insert
    pub batch_size: usize,

    /// Maximum characters kept per raw field
    pub max_field_length: usize,

    /// Rejected rows kept per load for diagnostics
    pub diagnostic_sample_size: usize,

    /// Codepage label assumed for schemas that do not name one
    pub default_encoding: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
            diagnostic_sample_size: DEFAULT_DIAGNOSTIC_SAMPLE_SIZE,
            default_encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database holding the canonical tables
    pub database_path: PathBuf,

    /// Optional JSON-lines provenance log kept alongside the database table
    pub provenance_log: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            provenance_log: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    /// Files loaded concurrently
    pub workers: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().clamp(1, MAX_PARALLEL_WORKERS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemasConfig {
    /// TOML file of additional schema contracts
    pub contracts_file: Option<PathBuf>,

    /// Skip the built-in schema eras and use only the contracts file
    pub skip_builtin: bool,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ingest: IngestConfig,
    pub storage: StorageConfig,
    pub performance: PerformanceConfig,
    pub schemas: SchemasConfig,
}

impl Config {
    /// Default config file location (`<config dir>/maude-ingest/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
            .ok_or_else(|| Error::configuration("Could not determine the user config directory"))
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path)
            } else {
                Error::io(format!("Failed to read config file {}", path.display()), e)
            }
        })?;
        Self::from_toml(&content).map_err(|e| {
            Error::configuration(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Defaults overlaid with a config file, when one is given or present
    ///
    /// An explicitly named file must exist. The default location is used
    /// only if a file is there.
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.ingest.batch_size = batch_size;
        self
    }

    pub fn with_max_field_length(mut self, max_field_length: usize) -> Self {
        self.ingest.max_field_length = max_field_length;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.performance.workers = workers;
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.database_path = path.into();
        self
    }

    pub fn with_provenance_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.provenance_log = Some(path.into());
        self
    }

    pub fn with_contracts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schemas.contracts_file = Some(path.into());
        self
    }

    /// Check every setting for consistency
    pub fn validate(&self) -> Result<()> {
        if self.ingest.batch_size == 0 {
            return Err(Error::configuration("Batch size must be greater than 0"));
        }

        if self.ingest.max_field_length == 0 {
            return Err(Error::configuration(
                "Maximum field length must be greater than 0",
            ));
        }

        resolve_single_byte_encoding(&self.ingest.default_encoding).map_err(|e| {
            Error::configuration(format!("Invalid default encoding: {}", e))
        })?;

        if self.performance.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.performance.workers > MAX_PARALLEL_WORKERS {
            return Err(Error::configuration(format!(
                "Number of workers cannot exceed {}",
                MAX_PARALLEL_WORKERS
            )));
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(Error::configuration("Database path cannot be empty"));
        }

        if self.schemas.skip_builtin && self.schemas.contracts_file.is_none() {
            return Err(Error::configuration(
                "skip_builtin requires a schema contracts file",
            ));
        }

        if let Some(contracts) = &self.schemas.contracts_file {
            if !contracts.exists() {
                return Err(Error::configuration(format!(
                    "Schema contracts file does not exist: {}",
                    contracts.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ingest.batch_size, 50_000);
        assert_eq!(config.ingest.default_encoding, "windows-1252");
        assert!(config.performance.workers >= 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [ingest]
            batch_size = 1000

            [storage]
            database_path = "/tmp/maude.sqlite"
            "#,
        )
        .unwrap();

        assert_eq!(config.ingest.batch_size, 1000);
        assert_eq!(config.ingest.max_field_length, DEFAULT_MAX_FIELD_LENGTH);
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/maude.sqlite"));
        assert_eq!(config.storage.provenance_log, None);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml("[ingest]\nbatchsize = 10\n").is_err());
        assert!(Config::from_toml("[logging]\nlevel = \"info\"\n").is_err());
    }

    #[test]
    fn test_validation_failures() {
        assert!(Config::default().with_batch_size(0).validate().is_err());
        assert!(Config::default().with_max_field_length(0).validate().is_err());
        assert!(Config::default().with_workers(0).validate().is_err());
        assert!(
            Config::default()
                .with_workers(MAX_PARALLEL_WORKERS + 1)
                .validate()
                .is_err()
        );

        let mut config = Config::default();
        config.ingest.default_encoding = "utf-8".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.schemas.skip_builtin = true;
        assert!(config.validate().is_err());

        let config = Config::default().with_contracts_file("/nonexistent/contracts.toml");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_layered_from_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[performance]\nworkers = 3\n").unwrap();

        let config = Config::load_layered(Some(&path)).unwrap();
        assert_eq!(config.performance.workers, 3);

        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            Config::load_layered(Some(&missing)),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_config_serializes_back_to_toml() {
        let config = Config::default()
            .with_batch_size(10)
            .with_provenance_log("provenance.jsonl");
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
