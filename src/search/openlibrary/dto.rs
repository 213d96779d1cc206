//! Open Library API Data Transfer Objects
//!
//! These types match EXACTLY what the Open Library search API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the openlibrary module - convert to domain types.
//!
//! API Reference: https://openlibrary.org/dev/docs/api/search
//!
//! We use the /search.json endpoint with its dedicated `title`, `author`
//! and `isbn` query parameters. Almost every field on a doc is optional in
//! practice, so everything defensive-defaults.

use serde::{Deserialize, Serialize};

/// Top-level search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Total number of matching documents (not the page size)
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    /// The result page
    #[serde(default)]
    pub docs: Vec<Doc>,
}

/// One work in the search results
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Doc {
    /// Work title; absent or empty docs are unusable and get dropped
    pub title: Option<String>,
    /// Author names (multiple for collaborations)
    #[serde(default)]
    pub author_name: Vec<String>,
    /// Every ISBN of every edition, 10- and 13-digit mixed
    #[serde(default)]
    pub isbn: Vec<String>,
    /// Year of first publication
    pub first_publish_year: Option<i32>,
    /// Publisher names across editions
    #[serde(default)]
    pub publisher: Vec<String>,
    /// Median page count across editions
    pub number_of_pages_median: Option<u32>,
    /// Cover image ID for covers.openlibrary.org
    pub cover_i: Option<i64>,
    /// Subject headings (used as the category hint)
    #[serde(default)]
    pub subject: Vec<String>,
    /// Community rating average
    pub ratings_average: Option<f64>,
    /// Number of community ratings
    pub ratings_count: Option<u32>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
