//! Command-line interface for get-settings
//!
//! Provides `find`, `load` and `ancestors` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod ancestors;
mod find;
mod load;

/// Find the nearest settings file above a directory and load its settings
#[derive(Parser)]
#[command(name = "get-settings")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the path of the nearest settings file
    Find(find::FindArgs),

    /// Load a settings file and print its settings
    Load(load::LoadArgs),

    /// Print a directory and each of its ancestors
    Ancestors(ancestors::AncestorsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Find(args) => find::run(args),
        Commands::Load(args) => load::run(args),
        Commands::Ancestors(args) => ancestors::run(args),
    }
}
