//! Catalog enrichment commands.
//!
//! `enrich` pulls provider results into the catalog; `update` refreshes a
//! single archived book in place.

use std::path::Path;
use tokio::runtime::Runtime;

use super::{build_aggregator, format_book_line, resolve_db_url, resolve_limit};
use crate::config::Config;
use crate::enrichment::EnrichmentService;
use crate::{db, model::Book};

pub fn cmd_enrich(
    rt: &Runtime,
    config: &Config,
    isbn: Option<&str>,
    title: Option<&str>,
    author: Option<&str>,
    limit: Option<usize>,
    db_path: Option<&Path>,
) -> anyhow::Result<()> {
    if isbn.is_none() && title.is_none() && author.is_none() {
        anyhow::bail!("specify one of --isbn, --title or --author");
    }

    let db_url = resolve_db_url(config, db_path);
    let limit = resolve_limit(config, limit);
    let aggregator = build_aggregator(config);

    rt.block_on(async {
        let pool = db::init_db(&db_url).await?;
        let service = EnrichmentService::new(pool, aggregator);

        if let Some(isbn) = isbn {
            match service.enrich_by_isbn(isbn).await? {
                Some(book) => {
                    println!("Archived:");
                    print_book(&book);
                }
                None => println!("No provider knows ISBN {}.", isbn),
            }
            return anyhow::Ok(());
        }

        let books = if let Some(title) = title {
            service.enrich_by_title(title, limit).await?
        } else {
            // author is Some by the guard above
            service.enrich_by_author(author.unwrap_or_default(), limit).await?
        };

        if books.is_empty() {
            println!("Nothing found to archive.");
        } else {
            println!("{} book(s) in the catalog for this query:\n", books.len());
            for book in &books {
                print_book(book);
            }
        }
        anyhow::Ok(())
    })?;
    Ok(())
}

pub fn cmd_update(
    rt: &Runtime,
    config: &Config,
    id: i64,
    db_path: Option<&Path>,
) -> anyhow::Result<()> {
    let db_url = resolve_db_url(config, db_path);
    let aggregator = build_aggregator(config);

    rt.block_on(async {
        let pool = db::init_db(&db_url).await?;

        let Some(book) = db::get_book_by_id(&pool, id).await? else {
            anyhow::bail!("no book with id {} in the catalog", id);
        };

        let service = EnrichmentService::new(pool, aggregator);
        match service.update_from_source(&book).await? {
            Some(updated) => {
                println!("Updated:");
                print_book(&updated);
            }
            None => println!("No provider had fresh data for '{}'.", book.title),
        }
        anyhow::Ok(())
    })?;
    Ok(())
}

fn print_book(book: &Book) {
    println!(
        "  [{}] {}",
        book.id,
        format_book_line(
            &book.title,
            book.author.as_deref(),
            book.publication_year,
            book.isbn.as_deref(),
        )
    );
}
