#![deny(missing_docs)]

//! # Apiculi CLI
//!
//! Command Line Interface for rendering apiculi OpenAPI documents.
//!
//! Supported Commands:
//! - `demo`: Registers a sample resource API and writes its document.

use apiculi_core::AppResult;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Apiculi OpenAPI CLI")]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Writes the OpenAPI document of a sample resource API.
    Demo(demo::DemoArgs),
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Logs go to stderr so a document written to stdout stays clean.
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Demo(args) => demo::execute(args)?,
    }

    Ok(())
}
