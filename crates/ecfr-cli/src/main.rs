//! # ecfr CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ecfr_cli::ingest::{run_ingest_from_env, IngestArgs};
use ecfr_cli::query::{
    run_coverage, run_history, run_search, run_structure, CoverageArgs, HistoryArgs, SearchArgs,
    StructureArgs,
};

/// eCFR stack CLI.
///
/// Ingests agencies, titles and title structure from the eCFR API into the
/// item store, and queries what is stored.
#[derive(Parser, Debug)]
#[command(name = "ecfr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one bounded ingestion pass and print the report.
    Ingest(IngestArgs),

    /// Show an agency and the CFR titles it maps to.
    Coverage(CoverageArgs),

    /// Show the first chapters and parts of a title.
    Structure(StructureArgs),

    /// Look up rows by entity type, title or agency.
    Search(SearchArgs),

    /// Show legacy snapshot history for an agency code.
    History(HistoryArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = match ecfr_store::connect_from_env().await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("store initialization failed: {e}");
            return ExitCode::from(1);
        }
    };

    let mut out = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Ingest(args) => run_ingest_from_env(args, store, &mut out).await,
        Commands::Coverage(args) => run_coverage(args, store.as_ref(), &mut out).await,
        Commands::Structure(args) => run_structure(args, store.as_ref(), &mut out).await,
        Commands::Search(args) => run_search(args, store.as_ref(), &mut out).await,
        Commands::History(args) => run_history(args, store.as_ref(), &mut out).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
