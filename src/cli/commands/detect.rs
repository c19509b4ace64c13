//! Detect command implementation
//!
//! Reports the inferred file type, year hint and schema era of each input
//! without reading past the header.

use super::shared::{CommandReport, build_registry, setup_logging};
use crate::app::pipeline::{FileInspection, PipelineOptions, inspect_file};
use crate::cli::args::{DetectArgs, OutputFormat};
use crate::Result;
use colored::*;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, warn};

pub async fn run_detect(args: DetectArgs) -> Result<CommandReport> {
    setup_logging(&args.log)?;
    args.validate()?;

    let registry = build_registry(args.schemas_file.as_deref(), false)?;
    let options = PipelineOptions {
        file_type: args.file_type,
        year_hint: args.year,
        ..PipelineOptions::default()
    };

    let results: Vec<(PathBuf, Result<FileInspection>)> = args
        .files
        .iter()
        .map(|path| (path.clone(), inspect_file(&registry, path, &options)))
        .collect();

    let mut report = CommandReport::default();
    for (path, result) in &results {
        match result {
            Ok(inspection) => {
                debug!("{}: {:?}", path.display(), inspection.detection);
                report.files_succeeded += 1;
            }
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                report.files_failed += 1;
            }
        }
    }

    match args.output_format {
        OutputFormat::Human => print_human(&results),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&results))?),
    }

    Ok(report)
}

fn to_json(results: &[(PathBuf, Result<FileInspection>)]) -> serde_json::Value {
    let items = results
        .iter()
        .map(|(path, result)| match result {
            Ok(inspection) => json!({
                "path": path.display().to_string(),
                "file_type": inspection.file_type.as_str(),
                "year_hint": inspection.year_hint,
                "column_count": inspection.column_count,
                "schema": inspection.detection.schema.name,
                "candidates": inspection.detection.candidates,
                "resolved_by_year": inspection.detection.resolved_by_year,
                "renamed_columns": inspection.detection.renamed_columns.len(),
            }),
            Err(e) => json!({
                "path": path.display().to_string(),
                "error": e.to_string(),
            }),
        })
        .collect::<Vec<_>>();
    serde_json::Value::Array(items)
}

fn print_human(results: &[(PathBuf, Result<FileInspection>)]) {
    for (path, result) in results {
        match result {
            Ok(inspection) => {
                let year = inspection
                    .year_hint
                    .map_or_else(|| "-".to_string(), |y| y.to_string());
                println!(
                    "{} {}: {} file, {} columns, year {} -> {}",
                    "✓".green(),
                    path.display(),
                    inspection.file_type,
                    inspection.column_count,
                    year,
                    inspection.detection.schema.name.bold()
                );
                if !inspection.detection.renamed_columns.is_empty() {
                    println!(
                        "    {} header names differ from the schema",
                        inspection.detection.renamed_columns.len().to_string().yellow()
                    );
                }
            }
            Err(e) => println!("{} {}: {}", "✗".red(), path.display(), e),
        }
    }
}
