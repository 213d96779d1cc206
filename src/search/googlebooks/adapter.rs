//! Adapter layer: Convert Google Books DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if Google Books changes their response
//! format, only this file and dto.rs need to change.

use super::dto;
use crate::search::domain::{BookCandidate, SearchSource};
use crate::search::normalize::normalize_isbn;

/// Convert a volumes response into candidates.
///
/// Volumes without usable volumeInfo or without a non-blank title are
/// dropped silently.
pub fn to_candidates(response: dto::VolumesResponse) -> Vec<BookCandidate> {
    response
        .items
        .into_iter()
        .filter_map(|v| v.volume_info)
        .filter_map(to_candidate)
        .collect()
}

fn to_candidate(info: dto::VolumeInfo) -> Option<BookCandidate> {
    let title = info.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let author = if info.authors.is_empty() {
        None
    } else {
        Some(info.authors.join(", "))
    };

    Some(BookCandidate {
        title: title.to_string(),
        author,
        isbn: pick_isbn(&info.industry_identifiers),
        publication_year: info.published_date.as_deref().and_then(parse_year),
        publisher: info.publisher,
        page_count: info.page_count,
        description: info.description,
        cover_url: info.image_links.and_then(cover_url),
        category: info.categories.into_iter().next(),
        average_rating: info.average_rating,
        rating_count: info.ratings_count,
        source: SearchSource::GoogleBooks,
    })
}

/// Pick one ISBN from the identifier list: prefer ISBN_13, else the first
/// identifier that normalizes to something non-empty.
fn pick_isbn(identifiers: &[dto::IndustryIdentifier]) -> Option<String> {
    let normalized: Vec<(Option<&str>, String)> = identifiers
        .iter()
        .filter_map(|id| {
            let value = normalize_isbn(id.identifier.as_deref()?);
            if value.is_empty() {
                None
            } else {
                Some((id.id_type.as_deref(), value))
            }
        })
        .collect();

    normalized
        .iter()
        .find(|(t, _)| *t == Some("ISBN_13"))
        .or_else(|| normalized.first())
        .map(|(_, v)| v.clone())
}

/// Parse the leading year from "YYYY", "YYYY-MM" or "YYYY-MM-DD".
fn parse_year(date: &str) -> Option<i32> {
    date.split('-').next().and_then(|y| y.parse().ok())
}

/// Pick a cover URL, upgraded to https. Google serves image links over
/// plain http.
fn cover_url(links: dto::ImageLinks) -> Option<String> {
    links
        .thumbnail
        .or(links.small_thumbnail)
        .map(|url| url.replacen("http://", "https://", 1))
}
