//! Load command implementation
//!
//! Files are loaded concurrently, one blocking task per file, bounded by the
//! configured worker count. Each task owns its storage connection, so the
//! per-file sequence of deletes, inserts and checkpoint stays strictly ordered.

use super::shared::{
    CommandReport, LoadSummary, build_registry, check_duplicate_names, discover_input_files,
    format_count, load_configuration, setup_logging,
};
use crate::app::pipeline::{Pipeline, PipelineOptions};
use crate::app::services::batch_loader::{LoadOptions, LoadOutcome};
use crate::app::services::record_parser::ParseOptions;
use crate::app::services::schema_registry::SchemaRegistry;
use crate::app::services::storage::{
    JsonlProvenanceLog, MemoryProvenanceLog, MemoryStorage, ProvenanceSink, SqliteStorage,
};
use crate::cli::args::{LoadArgs, OutputFormat};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use indicatif::HumanDuration;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Where loaded records go
#[derive(Debug, Clone)]
enum Target {
    /// Shared in-memory store for dry runs
    Memory {
        storage: MemoryStorage,
        provenance: MemoryProvenanceLog,
    },
    Sqlite(PathBuf),
}

/// Everything a worker needs to load one file
#[derive(Clone)]
struct LoadContext {
    registry: Arc<SchemaRegistry>,
    options: PipelineOptions,
    target: Target,
    provenance_log: Option<PathBuf>,
    cancellation: CancellationToken,
}

/// Load command runner
///
/// 1. Set up logging and configuration
/// 2. Expand inputs and refuse duplicate file names
/// 3. Load files concurrently
/// 4. Print the summary
pub async fn run_load(args: LoadArgs, cancellation: CancellationToken) -> Result<CommandReport> {
    let start_time = Instant::now();

    setup_logging(&args.log)?;
    info!("Starting MAUDE load");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args)?;

    let files = discover_input_files(&args.inputs)?;
    if files.is_empty() {
        return Err(Error::configuration("No extract files found in the given inputs"));
    }
    check_duplicate_names(&files)?;

    let registry = build_registry(
        config.schemas.contracts_file.as_deref(),
        config.schemas.skip_builtin,
    )?;

    let target = prepare_target(&config, args.dry_run)?;
    let context = LoadContext {
        registry: Arc::new(registry),
        options: pipeline_options(&config, &args),
        target,
        provenance_log: config.storage.provenance_log.clone(),
        cancellation,
    };

    info!(
        "Loading {} files with {} workers",
        files.len(),
        config.performance.workers
    );

    let results = load_files(&context, files, config.performance.workers).await;

    let mut summary = LoadSummary::default();
    for (path, result) in results {
        match result {
            Ok(outcome) => {
                if !outcome.is_complete() {
                    error!(
                        "{} failed: {}",
                        path.display(),
                        outcome.entry.error.as_deref().unwrap_or("unknown error")
                    );
                }
                summary.record(outcome.entry, outcome.rows_deleted);
            }
            Err(e) => {
                error!("{}: {}", path.display(), e);
                summary.record_skipped();
            }
        }
    }
    summary.elapsed = start_time.elapsed();

    generate_report(&args, &summary, &context.target)?;
    Ok(summary.report())
}

fn pipeline_options(config: &Config, args: &LoadArgs) -> PipelineOptions {
    PipelineOptions {
        batch_size: config.ingest.batch_size,
        parse: ParseOptions::default()
            .with_max_field_length(config.ingest.max_field_length)
            .with_start_row(args.start_row),
        load: LoadOptions {
            diagnostic_sample_size: config.ingest.diagnostic_sample_size,
            show_progress: args.show_progress(),
            resume_from: args.start_row,
        },
        file_type: args.file_type,
        year_hint: args.year,
    }
}

/// Create the database up front so workers only ever open an existing schema
fn prepare_target(config: &Config, dry_run: bool) -> Result<Target> {
    if dry_run {
        info!("Dry run: records are kept in memory only");
        return Ok(Target::Memory {
            storage: MemoryStorage::new(),
            provenance: MemoryProvenanceLog::new(),
        });
    }

    let path = config.storage.database_path.clone();
    SqliteStorage::open(&path)?;
    info!("Loading into {}", path.display());
    Ok(Target::Sqlite(path))
}

/// Run every file through its own pipeline, at most `workers` at a time
async fn load_files(
    context: &LoadContext,
    files: Vec<PathBuf>,
    workers: usize,
) -> Vec<(PathBuf, Result<LoadOutcome>)> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let context = context.clone();
        let semaphore = Arc::clone(&semaphore);

        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    let error = Error::processing_interrupted(format!("worker pool closed: {}", e));
                    return (path, Err(error));
                }
            };

            let task_path = path.clone();
            let result = tokio::task::spawn_blocking(move || load_one(&context, &task_path))
                .await
                .unwrap_or_else(|e| {
                    Err(Error::processing_interrupted(format!("load task failed: {}", e)))
                });
            (path, result)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in futures::future::join_all(handles).await {
        match handle {
            Ok(result) => results.push(result),
            Err(e) => error!("Load task panicked: {}", e),
        }
    }
    results
}

/// Load a single file with storage and provenance sinks opened for it
fn load_one(context: &LoadContext, path: &Path) -> Result<LoadOutcome> {
    if context.cancellation.is_cancelled() {
        return Err(Error::processing_interrupted(format!(
            "{} not started before cancellation",
            path.display()
        )));
    }

    let mut sinks: Vec<Box<dyn ProvenanceSink>> = Vec::new();
    if let Some(log) = &context.provenance_log {
        sinks.push(Box::new(JsonlProvenanceLog::new(log.clone())));
    }

    let registry = Arc::clone(&context.registry);
    match &context.target {
        Target::Memory {
            storage,
            provenance,
        } => {
            sinks.push(Box::new(provenance.clone()));
            Pipeline::new(registry, storage.clone(), sinks, context.options.clone())
                .with_cancellation(context.cancellation.clone())
                .run_file(path)
        }
        Target::Sqlite(database) => {
            let storage = SqliteStorage::open(database)?;
            sinks.push(Box::new(SqliteStorage::open(database)?));
            Pipeline::new(registry, storage, sinks, context.options.clone())
                .with_cancellation(context.cancellation.clone())
                .run_file(path)
        }
    }
}

fn generate_report(args: &LoadArgs, summary: &LoadSummary, target: &Target) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            generate_human_report(summary, target);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
            Ok(())
        }
    }
}

fn generate_human_report(summary: &LoadSummary, target: &Target) {
    let duration = HumanDuration(summary.elapsed);

    println!();
    if summary.files_failed == 0 {
        println!("{}", "MAUDE load complete".green().bold());
    } else {
        println!("{}", "MAUDE load finished with failures".yellow().bold());
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Files loaded: {}", summary.files_loaded);
    if summary.files_failed > 0 {
        println!(
            "   • Files failed: {}",
            summary.files_failed.to_string().red()
        );
    }
    println!("   • Rows read: {}", format_count(summary.rows_read));
    println!("   • Rows accepted: {}", format_count(summary.rows_accepted));
    if summary.rows_rejected > 0 {
        println!(
            "   • Rows rejected: {}",
            format_count(summary.rows_rejected).yellow()
        );
    }
    if summary.rows_replaced > 0 {
        println!(
            "   • Rows replaced from earlier loads: {}",
            format_count(summary.rows_replaced)
        );
    }
    println!(
        "   • Processing time: {} ({:.0} rows/s)",
        duration,
        summary.rows_per_second()
    );
    match target {
        Target::Sqlite(path) => println!("   • Database: {}", path.display()),
        Target::Memory { .. } => println!("   • Database: {}", "dry run, nothing written".dimmed()),
    }

    if !summary.entries.is_empty() {
        println!("\nFiles:");
        for entry in &summary.entries {
            let status = if entry.is_complete() {
                "ok".green()
            } else {
                "failed".red()
            };
            println!(
                "   [{}] {} ({}) {} rows",
                status,
                entry.source_file,
                entry.schema.as_deref().unwrap_or("no schema"),
                format_count(entry.rows_accepted)
            );
        }
    }
    println!();
}
