//! Command-line interface for home-archive.
//!
//! This module provides CLI commands for searching providers, enriching
//! the catalog, and inspecting its contents.

mod commands;

pub use commands::{Cli, Commands, run_command};
