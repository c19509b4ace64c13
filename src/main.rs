use clap::Parser;
use maude_ingest::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // Loads stop at their next batch boundary once the token fires
        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, finishing current batches and stopping...");
                shutdown_token.cancel();
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(report) if report.has_failures() => {
            // Per-file errors have already been reported by the command
            process::exit(2);
        }
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("MAUDE Ingest - FDA adverse-event bulk data loader");
    println!("=================================================");
    println!();
    println!("Load FDA MAUDE medical-device adverse-event extracts into a");
    println!("normalized SQLite database with per-file provenance.");
    println!();
    println!("USAGE:");
    println!("    maude-ingest <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    load        Load extract files or directories into the database");
    println!("    detect      Show the detected file type and schema era of files");
    println!("    schemas     List the registered schema eras");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Load every extract in a directory:");
    println!("    maude-ingest load ./maude --database maude.sqlite");
    println!();
    println!("    # Check which schema a file will be read with:");
    println!("    maude-ingest detect foidev2021.txt");
    println!();
    println!("For detailed help on any command, use:");
    println!("    maude-ingest <COMMAND> --help");
}
