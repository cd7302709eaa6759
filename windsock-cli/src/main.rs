//! # Windsock CLI
//!
//! Command-line client for the windsock channel subsystem.
//!
//! This CLI provides commands for:
//! - Watching a channel: printing its messages and connection state
//! - Resolving channel targets against a base URL

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use windsock_telemetry::logging::init_logging;
use windsock_telemetry::metrics::init_metrics;

use commands::{resolve, watch};
use config::AppConfig;

/// Windsock - shared, self-healing streaming channels
#[derive(Parser)]
#[command(name = "windsock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (.yaml, .toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Connect to a channel and print what it receives
    Watch(watch::WatchArgs),

    /// Print the streaming address a target resolves to
    Resolve(resolve::ResolveArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    let _guards = init_logging(&config.logging).context("Failed to initialize logging")?;
    if config.metrics.enabled {
        init_metrics(&config.metrics).context("Failed to initialize metrics")?;
    }

    match cli.command {
        Commands::Watch(args) => watch::run(args, config.channels).await?,
        Commands::Resolve(args) => resolve::run(&args, config.channels)?,
    }

    Ok(())
}
