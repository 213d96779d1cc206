//! Search and listing commands.
//!
//! `search` and `lookup` hit the providers directly without writing to the
//! catalog; `list` reads the catalog without any network access.

use std::path::Path;
use tokio::runtime::Runtime;

use super::{SearchField, build_aggregator, format_book_line, resolve_db_url, resolve_limit};
use crate::config::Config;
use crate::search::BookCandidate;
use crate::{db, search::normalize::is_valid_isbn};

pub fn cmd_search(
    rt: &Runtime,
    config: &Config,
    query: &str,
    by: SearchField,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("search query must not be blank");
    }

    let aggregator = build_aggregator(config);
    let limit = resolve_limit(config, limit);

    let candidates = rt.block_on(async {
        match by {
            SearchField::All => aggregator.search_all(query, limit).await,
            SearchField::Title => aggregator.search_by_title(query, limit).await,
            SearchField::Author => aggregator.search_by_author(query, limit).await,
        }
    });

    if candidates.is_empty() {
        println!("No results for '{}'.", query);
        return Ok(());
    }

    println!("{} result(s) for '{}':\n", candidates.len(), query);
    for candidate in &candidates {
        print_candidate(candidate);
    }
    Ok(())
}

pub fn cmd_lookup(rt: &Runtime, config: &Config, isbn: &str) -> anyhow::Result<()> {
    if !is_valid_isbn(isbn) {
        anyhow::bail!("'{}' is not a valid ISBN-10 or ISBN-13", isbn);
    }

    let aggregator = build_aggregator(config);
    let candidates = rt.block_on(aggregator.search_by_isbn(isbn));

    match candidates.first() {
        Some(candidate) => {
            print_candidate(candidate);
            if let Some(description) = candidate.description.as_deref() {
                println!("\n{}", description);
            }
        }
        None => println!("No provider knows ISBN {}.", isbn),
    }
    Ok(())
}

pub fn cmd_list(rt: &Runtime, config: &Config, db_path: Option<&Path>) -> anyhow::Result<()> {
    let db_url = resolve_db_url(config, db_path);

    rt.block_on(async {
        let pool = db::init_db(&db_url).await?;
        let books = db::get_all_books(&pool).await?;

        if books.is_empty() {
            println!("The catalog is empty. Try 'enrich' first.");
            return Ok(());
        }

        println!("{} book(s) in the catalog:\n", books.len());
        for book in &books {
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
        anyhow::Ok(())
    })?;
    Ok(())
}

fn print_candidate(candidate: &BookCandidate) {
    println!(
        "  {} <{}>",
        format_book_line(
            &candidate.title,
            candidate.author.as_deref(),
            candidate.publication_year.map(i64::from),
            candidate.isbn.as_deref(),
        ),
        candidate.source
    );
}
