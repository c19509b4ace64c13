//! Schemas command implementation

use super::shared::{CommandReport, build_registry, setup_logging};
use crate::app::models::SchemaDefinition;
use crate::app::services::schema_registry::SchemaRegistry;
use crate::cli::args::{OutputFormat, SchemasArgs};
use crate::Result;
use colored::*;
use serde_json::json;

pub async fn run_schemas(args: SchemasArgs) -> Result<CommandReport> {
    setup_logging(&args.log)?;
    let registry = build_registry(args.schemas_file.as_deref(), false)?;

    match args.output_format {
        OutputFormat::Human => print_human(&registry, &args),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&registry, &args))?),
    }

    Ok(CommandReport::default())
}

fn selected<'a>(
    registry: &'a SchemaRegistry,
    args: &'a SchemasArgs,
) -> impl Iterator<Item = (crate::FileType, &'a std::sync::Arc<SchemaDefinition>)> + 'a {
    registry
        .iter()
        .filter(move |(file_type, _)| args.file_type.is_none_or(|wanted| wanted == *file_type))
}

fn to_json(registry: &SchemaRegistry, args: &SchemasArgs) -> serde_json::Value {
    let items = selected(registry, args)
        .map(|(file_type, schema)| {
            let mut item = json!({
                "file_type": file_type.as_str(),
                "name": schema.name,
                "column_count": schema.column_count,
                "start_year": schema.start_year,
                "end_year": schema.end_year,
                "delimiter": schema.delimiter.to_string(),
                "encoding": schema.encoding,
                "has_header": schema.has_header,
            });
            if args.columns {
                item["columns"] = json!(schema.columns);
            }
            item
        })
        .collect::<Vec<_>>();
    serde_json::Value::Array(items)
}

fn print_human(registry: &SchemaRegistry, args: &SchemasArgs) {
    println!("{}", "Registered schema eras".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (file_type, schema) in selected(registry, args) {
        println!(
            "   {:<13} {:<12} {:>3} columns  {}",
            file_type.as_str(),
            schema.name.cyan(),
            schema.column_count,
            schema.year_range_label()
        );
        if args.columns {
            for (index, column) in schema.columns.iter().enumerate() {
                println!("{:>8}. {}", index + 1, column);
            }
        }
    }
}
