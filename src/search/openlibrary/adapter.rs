//! Adapter layer: Convert Open Library DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if Open Library changes their response
//! format, only this file and dto.rs need to change.

use super::dto;
use crate::search::domain::{BookCandidate, SearchSource};
use crate::search::normalize::normalize_isbn;

/// Convert a search response into candidates.
///
/// Docs without a usable (non-blank) title are dropped silently - that is
/// data quality, not an error.
pub fn to_candidates(response: dto::SearchResponse) -> Vec<BookCandidate> {
    response.docs.into_iter().filter_map(to_candidate).collect()
}

fn to_candidate(doc: dto::Doc) -> Option<BookCandidate> {
    let title = doc.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let author = if doc.author_name.is_empty() {
        None
    } else {
        Some(doc.author_name.join(", "))
    };

    Some(BookCandidate {
        title: title.to_string(),
        author,
        isbn: pick_isbn(&doc.isbn),
        publication_year: doc.first_publish_year,
        publisher: doc.publisher.into_iter().next(),
        page_count: doc.number_of_pages_median,
        // The search endpoint carries no description; enrichment fills it
        // from the lower-priority provider when available.
        description: None,
        cover_url: doc.cover_i.map(cover_url),
        category: doc.subject.into_iter().next(),
        average_rating: doc.ratings_average,
        rating_count: doc.ratings_count,
        source: SearchSource::OpenLibrary,
    })
}

/// Pick one ISBN from an edition list: prefer the 13-digit form, else the
/// first one that normalizes to something non-empty.
fn pick_isbn(isbns: &[String]) -> Option<String> {
    let normalized: Vec<String> = isbns
        .iter()
        .map(|s| normalize_isbn(s))
        .filter(|s| !s.is_empty())
        .collect();

    normalized
        .iter()
        .find(|s| s.len() == 13)
        .or_else(|| normalized.first())
        .cloned()
}

/// Cover image URL for a cover ID, large size.
fn cover_url(cover_id: i64) -> String {
    format!("https://covers.openlibrary.org/b/id/{}-L.jpg", cover_id)
}
