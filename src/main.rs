//! Home Archive - a personal book catalog.
//!
//! This application aggregates book metadata from external providers
//! (Open Library, Google Books) and archives it in a local SQLite catalog.
//! Everything is driven through CLI commands.

pub mod cli;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod model;
pub mod search;
#[cfg(test)]
pub mod test_utils;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("home_archive=info".parse().unwrap()))
        .init();

    // Try to run a CLI command
    if cli::run_command(&args)? {
        // A command was executed, exit normally
        return Ok(());
    }

    // No command specified, show usage
    cli::Cli::command().print_help()?;
    Ok(())
}
