//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use crate::app::models::{FileType, LoadStatus, ProvenanceEntry};
use crate::app::services::schema_registry::SchemaRegistry;
use crate::cli::args::{LoadArgs, LogArgs};
use crate::config::Config;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of a command run, used to pick the exit status
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandReport {
    /// Files processed successfully
    pub files_succeeded: usize,
    /// Files that failed or were skipped
    pub files_failed: usize,
}

impl CommandReport {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Totals over every file of a load command
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    pub files_loaded: usize,
    pub files_failed: usize,
    pub rows_read: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    pub rows_replaced: u64,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_seconds")]
    pub elapsed: Duration,
    pub entries: Vec<ProvenanceEntry>,
}

fn serialize_seconds<S: serde::Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl LoadSummary {
    /// Fold one file's provenance entry into the totals
    pub fn record(&mut self, entry: ProvenanceEntry, rows_replaced: usize) {
        match entry.status {
            LoadStatus::Complete => self.files_loaded += 1,
            LoadStatus::Failed => self.files_failed += 1,
        }
        self.rows_read += entry.rows_read;
        self.rows_accepted += entry.rows_accepted;
        self.rows_rejected += entry.rows_rejected;
        self.rows_replaced += rows_replaced as u64;
        self.entries.push(entry);
    }

    /// A file that failed before any provenance could be recorded
    pub fn record_skipped(&mut self) {
        self.files_failed += 1;
    }

    /// Accepted rows per second over the whole command
    pub fn rows_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.rows_accepted as f64 / seconds
        } else {
            self.rows_accepted as f64
        }
    }

    pub fn report(&self) -> CommandReport {
        CommandReport {
            files_succeeded: self.files_loaded,
            files_failed: self.files_failed,
        }
    }
}

/// Set up structured logging for a command
pub fn setup_logging(log: &LogArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = log.get_log_level();

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("maude_ingest={}", log_level)));

    let result = if log.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> args)
pub fn load_configuration(args: &LoadArgs) -> Result<Config> {
    info!("Loading configuration");

    let mut config = Config::load_layered(args.config_file.as_deref())?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &LoadArgs) {
    if let Some(database) = &args.database {
        config.storage.database_path = database.clone();
    }
    if let Some(log) = &args.provenance_log {
        config.storage.provenance_log = Some(log.clone());
    }
    if let Some(batch_size) = args.batch_size {
        config.ingest.batch_size = batch_size;
    }
    if let Some(workers) = args.workers {
        config.performance.workers = workers;
    }
    if let Some(schemas) = &args.schemas_file {
        config.schemas.contracts_file = Some(schemas.clone());
    }
}

/// Build the schema registry from built-in eras and an optional contracts file
pub fn build_registry(contracts_file: Option<&Path>, skip_builtin: bool) -> Result<SchemaRegistry> {
    let mut registry = if skip_builtin {
        SchemaRegistry::new()
    } else {
        SchemaRegistry::with_builtin()?
    };

    if let Some(path) = contracts_file {
        let added = registry.load_contracts(path)?;
        info!("Registered {} schema contracts from {}", added, path.display());
    }

    debug!("Schema registry holds {} eras", registry.len());
    Ok(registry)
}

/// Expand the command inputs into a sorted list of extract files
///
/// Arguments may be files, directories (searched recursively for files whose
/// names carry a known file-type prefix) or glob patterns.
pub fn discover_input_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if is_glob_pattern(input) {
            let paths = glob::glob(input).map_err(|e| {
                Error::configuration(format!("Invalid glob pattern '{}': {}", input, e))
            })?;
            let before = files.len();
            for path in paths {
                let path = path.map_err(|e| Error::io(format!("Failed to read {}", input), e.into_error()))?;
                if path.is_file() {
                    files.push(path);
                }
            }
            if files.len() == before {
                warn!("Pattern '{}' matched no files", input);
            }
            continue;
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            files.extend(discover_extract_files(&path)?);
        } else if path.is_file() {
            files.push(path);
        } else {
            return Err(Error::file_not_found(path));
        }
    }

    files.sort();
    files.dedup();
    debug!("Discovered {} input files", files.len());
    Ok(files)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Extract files below a directory, recognized by their file-type prefix
pub fn discover_extract_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(format!("Failed to walk {}", dir.display()), e)
        })?;
        let path = entry.path();
        let is_text = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

        if entry.file_type().is_file() && is_text && FileType::from_path(path).is_some() {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!("Discovered {} extract files in {}", files.len(), dir.display());
    Ok(files)
}

/// Refuse inputs that share a file name
///
/// Records are tagged with the bare file name, so two inputs with the same
/// name would replace each other's rows.
pub fn check_duplicate_names(files: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::new();

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(previous) = seen.insert(name.clone(), file) {
            return Err(Error::configuration(format!(
                "Inputs {} and {} share the file name '{}'",
                previous.display(),
                file.display(),
                name
            )));
        }
    }
    Ok(())
}

/// Format a row count with thousands separators
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(status: LoadStatus, accepted: u64) -> ProvenanceEntry {
        ProvenanceEntry {
            source_file: "foidev2021.txt".to_string(),
            file_type: Some(FileType::Device),
            loaded_at: Utc::now(),
            schema: Some("device-34".to_string()),
            rows_read: accepted + 1,
            rows_accepted: accepted,
            rows_rejected: 1,
            status,
            elapsed_ms: 10,
            resumed_from: None,
            error: None,
        }
    }

    #[test]
    fn test_load_summary_totals() {
        let mut summary = LoadSummary::default();
        summary.record(entry(LoadStatus::Complete, 10), 4);
        summary.record(entry(LoadStatus::Failed, 5), 0);
        summary.record_skipped();

        assert_eq!(summary.files_loaded, 1);
        assert_eq!(summary.files_failed, 2);
        assert_eq!(summary.rows_accepted, 15);
        assert_eq!(summary.rows_rejected, 2);
        assert_eq!(summary.rows_replaced, 4);
        assert!(summary.report().has_failures());
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12_345_678), "12,345,678");
    }

    #[test]
    fn test_discover_extract_files() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("2021");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join("mdrfoi2020.txt"), "").unwrap();
        std::fs::write(nested.join("foidev2021.txt"), "").unwrap();
        std::fs::write(nested.join("notes.txt"), "").unwrap();
        std::fs::write(nested.join("foidev2021.zip"), "").unwrap();

        let files = discover_extract_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| FileType::from_path(f).is_some()));
    }

    #[test]
    fn test_discover_input_files() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("patient2019.txt");
        let b = temp_dir.path().join("patient2020.txt");
        std::fs::write(&a, "").unwrap();
        std::fs::write(&b, "").unwrap();

        let pattern = format!("{}/patient*.txt", temp_dir.path().display());
        let files = discover_input_files(&[pattern, a.display().to_string()]).unwrap();
        assert_eq!(files, vec![a, b]);

        let missing = temp_dir.path().join("missing.txt").display().to_string();
        assert!(matches!(
            discover_input_files(&[missing]),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_refused() {
        let files = vec![
            PathBuf::from("/a/foidev2021.txt"),
            PathBuf::from("/b/foidev2021.txt"),
        ];
        assert!(check_duplicate_names(&files).is_err());

        let files = vec![
            PathBuf::from("/a/foidev2021.txt"),
            PathBuf::from("/a/foidev2020.txt"),
        ];
        assert!(check_duplicate_names(&files).is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        use crate::cli::args::Args;
        use clap::Parser;

        let args = Args::try_parse_from([
            "maude-ingest",
            "load",
            "x.txt",
            "--database",
            "custom.sqlite",
            "--batch-size",
            "7",
            "-j",
            "3",
        ])
        .unwrap();
        let Some(crate::cli::args::Commands::Load(load)) = args.command else {
            panic!("expected load command");
        };

        let mut config = Config::default();
        apply_cli_overrides(&mut config, &load);
        assert_eq!(config.storage.database_path, PathBuf::from("custom.sqlite"));
        assert_eq!(config.ingest.batch_size, 7);
        assert_eq!(config.performance.workers, 3);
    }
}
