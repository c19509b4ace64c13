//! Command-line argument definitions for the MAUDE ingester
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::app::models::FileType;
use crate::constants::{MAX_HINT_YEAR, MAX_PARALLEL_WORKERS, MIN_HINT_YEAR};
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the MAUDE adverse-event ingester
///
/// Loads FDA MAUDE bulk extracts into a normalized SQLite database,
/// detecting each file's schema era and recording provenance per load.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "maude-ingest",
    version,
    about = "Load FDA MAUDE adverse-event bulk extracts into a normalized SQLite store",
    long_about = "Streams the pipe-delimited MAUDE master, device, patient, narrative and \
                  problem-code extracts into typed SQLite tables. Column layouts are detected \
                  per file across the historical eras, values are normalized, and reloading a \
                  file replaces its previous records instead of duplicating them."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load extract files into the database
    Load(LoadArgs),
    /// Report the detected file type and schema era of files without loading
    Detect(DetectArgs),
    /// List the registered schema eras
    Schemas(SchemasArgs),
}

/// Logging options shared by every command
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct LogArgs {
    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors and critical messages. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl LogArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Arguments for the load command
#[derive(Debug, Clone, Parser)]
pub struct LoadArgs {
    /// Extract files or directories containing them
    ///
    /// Directories are searched recursively for `.txt` files whose names
    /// carry a known file-type prefix. Glob patterns are expanded.
    #[arg(value_name = "PATH", required = true)]
    pub inputs: Vec<String>,

    /// SQLite database to load into
    ///
    /// Created if it doesn't exist. Defaults to the configured path.
    #[arg(
        short = 'd',
        long = "database",
        value_name = "FILE",
        help = "SQLite database to load into"
    )]
    pub database: Option<PathBuf>,

    /// Records per bulk insert
    #[arg(
        short = 'b',
        long = "batch-size",
        value_name = "ROWS",
        help = "Records per bulk insert"
    )]
    pub batch_size: Option<usize>,

    /// Data rows to skip at the start of each file
    #[arg(
        long = "start-row",
        value_name = "ROW",
        default_value_t = 0,
        help = "Data rows to skip at the start of each file"
    )]
    pub start_row: u64,

    /// Year used to choose between schema eras instead of the file name's
    #[arg(long = "year", value_name = "YEAR", help = "Year hint for schema detection")]
    pub year: Option<i32>,

    /// File type to assume instead of inferring it from file names
    #[arg(long = "file-type", value_name = "TYPE", help = "File type for every input")]
    pub file_type: Option<FileType>,

    /// Number of files loaded concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of files loaded concurrently"
    )]
    pub workers: Option<usize>,

    /// Path to configuration file
    ///
    /// TOML configuration file for advanced settings. If not specified,
    /// looks for ~/.config/maude-ingest/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Additional schema contracts (TOML)
    #[arg(long = "schemas", value_name = "FILE", help = "Additional schema contracts file")]
    pub schemas_file: Option<PathBuf>,

    /// JSON-lines provenance log written in addition to the database table
    #[arg(long = "provenance-log", value_name = "FILE", help = "Append provenance entries to a JSON-lines file")]
    pub provenance_log: Option<PathBuf>,

    /// Load into memory only and report what would be stored
    #[arg(long = "dry-run", help = "Load into in-memory storage without writing the database")]
    pub dry_run: bool,

    #[command(flatten)]
    pub log: LogArgs,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the detect command
#[derive(Debug, Clone, Parser)]
pub struct DetectArgs {
    /// Extract files to inspect
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[arg(long = "year", value_name = "YEAR", help = "Year hint for schema detection")]
    pub year: Option<i32>,

    #[arg(long = "file-type", value_name = "TYPE", help = "File type for every input")]
    pub file_type: Option<FileType>,

    #[arg(long = "schemas", value_name = "FILE", help = "Additional schema contracts file")]
    pub schemas_file: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,

    #[arg(long = "output-format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the schemas command
#[derive(Debug, Clone, Parser)]
pub struct SchemasArgs {
    /// Only list eras of one file type
    #[arg(long = "file-type", value_name = "TYPE")]
    pub file_type: Option<FileType>,

    /// Include each era's column names
    #[arg(long = "columns", help = "Include column names")]
    pub columns: bool,

    #[arg(long = "schemas", value_name = "FILE", help = "Additional schema contracts file")]
    pub schemas_file: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,

    #[arg(long = "output-format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

fn validate_year(year: Option<i32>) -> Result<()> {
    if let Some(year) = year {
        if !(MIN_HINT_YEAR..=MAX_HINT_YEAR).contains(&year) {
            return Err(Error::configuration(format!(
                "Year hint {} outside {}..={}",
                year, MIN_HINT_YEAR, MAX_HINT_YEAR
            )));
        }
    }
    Ok(())
}

impl LoadArgs {
    /// Validate the load command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Error::configuration(
                    "Number of workers must be greater than 0",
                ));
            }
            if workers > MAX_PARALLEL_WORKERS {
                return Err(Error::configuration(format!(
                    "Number of workers cannot exceed {}",
                    MAX_PARALLEL_WORKERS
                )));
            }
        }

        if self.batch_size == Some(0) {
            return Err(Error::configuration("Batch size must be greater than 0"));
        }

        validate_year(self.year)?;

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Check if we should show progress spinners (not in quiet mode or JSON output)
    pub fn show_progress(&self) -> bool {
        !self.log.quiet && self.output_format == OutputFormat::Human
    }
}

impl DetectArgs {
    pub fn validate(&self) -> Result<()> {
        validate_year(self.year)
    }
}
