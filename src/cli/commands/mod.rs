//! Command implementations for the MAUDE ingester CLI
//!
//! Each command is implemented in its own module:
//! - `load`: Detect, parse, transform and load extract files
//! - `detect`: Report schema detection results without loading
//! - `schemas`: List registered schema eras

pub mod detect;
pub mod load;
pub mod schemas;
pub mod shared;

pub use shared::{CommandReport, LoadSummary};

use crate::Result;
use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Main command runner
///
/// Dispatches to the subcommand handler. Returns an empty report when no
/// subcommand was given.
pub async fn run(args: Args, cancellation: CancellationToken) -> Result<CommandReport> {
    match args.command {
        Some(Commands::Load(load_args)) => load::run_load(load_args, cancellation).await,
        Some(Commands::Detect(detect_args)) => detect::run_detect(detect_args).await,
        Some(Commands::Schemas(schemas_args)) => schemas::run_schemas(schemas_args).await,
        None => Ok(CommandReport::default()),
    }
}
