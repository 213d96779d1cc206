//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule for maintainability:
//! - `search`: Provider searches and catalog listing
//! - `enrich`: Catalog enrichment and refresh from providers
//! - `health`: Provider health reporting

mod enrich;
mod health;
mod search;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

pub use enrich::{cmd_enrich, cmd_update};
pub use health::cmd_health;
pub use search::{cmd_list, cmd_lookup, cmd_search};

use crate::config::Config;
use crate::search::SearchAggregator;

/// Home Archive CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Google Books API key (or set GOOGLE_BOOKS_API_KEY env var)
    #[arg(long, global = true, env = "GOOGLE_BOOKS_API_KEY")]
    pub google_api_key: Option<String>,
}

/// What field a search query targets.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SearchField {
    /// Search every field the providers support
    All,
    /// Search titles only
    Title,
    /// Search authors only
    Author,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Search external providers without touching the catalog
    Search {
        /// The search query
        query: String,
        /// Which field to search
        #[arg(long, value_enum, default_value = "all")]
        by: SearchField,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Look up a single book by ISBN
    Lookup {
        /// ISBN-10 or ISBN-13, hyphens and spaces allowed
        isbn: String,
    },
    /// Enrich the catalog from external providers
    Enrich {
        /// ISBN to enrich by
        #[arg(long, conflicts_with_all = ["title", "author"])]
        isbn: Option<String>,
        /// Title to enrich by
        #[arg(long, conflicts_with = "author")]
        title: Option<String>,
        /// Author to enrich by
        #[arg(long)]
        author: Option<String>,
        /// Maximum number of results to archive
        #[arg(short, long)]
        limit: Option<usize>,
        /// Database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Refresh an archived book from the providers
    Update {
        /// Database ID of the book to refresh
        id: i64,
        /// Database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List all books in the catalog
    List {
        /// Database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show provider health status
    Health,
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was
/// specified (the caller prints usage).
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let rt = Runtime::new()?;
    let mut config = crate::config::load();
    if cli.google_api_key.is_some() {
        config.credentials.google_books_api_key = cli.google_api_key.clone();
    }

    match &cli.command {
        Some(Commands::Search { query, by, limit }) => {
            cmd_search(&rt, &config, query, *by, *limit)?;
            Ok(true)
        }
        Some(Commands::Lookup { isbn }) => {
            cmd_lookup(&rt, &config, isbn)?;
            Ok(true)
        }
        Some(Commands::Enrich {
            isbn,
            title,
            author,
            limit,
            db,
        }) => {
            cmd_enrich(
                &rt,
                &config,
                isbn.as_deref(),
                title.as_deref(),
                author.as_deref(),
                *limit,
                db.as_deref(),
            )?;
            Ok(true)
        }
        Some(Commands::Update { id, db }) => {
            cmd_update(&rt, &config, *id, db.as_deref())?;
            Ok(true)
        }
        Some(Commands::List { db }) => {
            cmd_list(&rt, &config, db.as_deref())?;
            Ok(true)
        }
        Some(Commands::Health) => {
            cmd_health(&config)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Build the production aggregator from config.
pub(crate) fn build_aggregator(config: &Config) -> Arc<SearchAggregator> {
    Arc::new(
        SearchAggregator::with_default_providers(config.credentials.google_books_api_key.clone())
            .with_timeout(std::time::Duration::from_secs(
                config.search.aggregation_timeout_secs,
            )),
    )
}

/// Resolve the database URL: CLI override, then config, then default.
pub(crate) fn resolve_db_url(config: &Config, cli_db: Option<&std::path::Path>) -> String {
    crate::db::db_url(cli_db.or(config.database.path.as_deref()))
}

/// Effective result limit: CLI flag over the configured default.
pub(crate) fn resolve_limit(config: &Config, cli_limit: Option<usize>) -> usize {
    cli_limit.unwrap_or(config.search.default_limit)
}

/// One-line book summary for terminal output.
pub(crate) fn format_book_line(
    title: &str,
    author: Option<&str>,
    year: Option<i64>,
    isbn: Option<&str>,
) -> String {
    let mut line = title.to_string();
    if let Some(author) = author {
        line.push_str(&format!(" - {}", author));
    }
    if let Some(year) = year {
        line.push_str(&format!(" ({})", year));
    }
    if let Some(isbn) = isbn {
        line.push_str(&format!(" [ISBN {}]", isbn));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_book_line() {
        assert_eq!(
            format_book_line("The Hobbit", Some("J.R.R. Tolkien"), Some(1937), None),
            "The Hobbit - J.R.R. Tolkien (1937)"
        );
        assert_eq!(format_book_line("Untitled Draft", None, None, None), "Untitled Draft");
        assert_eq!(
            format_book_line("Dune", None, None, Some("9780441013593")),
            "Dune [ISBN 9780441013593]"
        );
    }

    #[test]
    fn test_resolve_limit_prefers_cli() {
        let config = Config::default();
        assert_eq!(resolve_limit(&config, Some(3)), 3);
        assert_eq!(resolve_limit(&config, None), config.search.default_limit);
    }

    #[test]
    fn test_resolve_db_url_precedence() {
        let mut config = Config::default();
        config.database.path = Some("/books/archive.db".into());

        let cli_path = std::path::Path::new("/tmp/override.db");
        assert_eq!(resolve_db_url(&config, Some(cli_path)), "sqlite:/tmp/override.db");
        assert_eq!(resolve_db_url(&config, None), "sqlite:/books/archive.db");
        assert_eq!(
            resolve_db_url(&Config::default(), None),
            format!("sqlite:{}", crate::db::DEFAULT_DB_NAME)
        );
    }
}
