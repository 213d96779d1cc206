//! Internal domain models for book search and aggregation.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

/// An ephemeral book record produced by one provider search call.
///
/// Candidates are provider-agnostic and never persisted directly; the
/// enrichment service maps a chosen candidate into a catalog `Book`.
#[derive(Debug, Clone)]
pub struct BookCandidate {
    /// Book title (always non-empty; titleless records are dropped in adapters)
    pub title: String,
    /// Author name(s), comma-joined for multiple authors
    pub author: Option<String>,
    /// ISBN, normalized to digits plus trailing X, uppercase
    pub isbn: Option<String>,
    /// Year of first publication
    pub publication_year: Option<i32>,
    /// Publisher name
    pub publisher: Option<String>,
    /// Number of pages
    pub page_count: Option<u32>,
    /// Description / synopsis
    pub description: Option<String>,
    /// Cover image URL, normalized to https
    pub cover_url: Option<String>,
    /// Free-text category label inferred from provider metadata
    pub category: Option<String>,
    /// Provider-supplied average rating
    pub average_rating: Option<f64>,
    /// Number of ratings behind the average
    pub rating_count: Option<u32>,
    /// Which provider produced this candidate
    pub source: SearchSource,
}

impl BookCandidate {
    /// Minimal candidate with only a title, everything else unset.
    pub fn new(title: impl Into<String>, source: SearchSource) -> Self {
        Self {
            title: title.into(),
            author: None,
            isbn: None,
            publication_year: None,
            publisher: None,
            page_count: None,
            description: None,
            cover_url: None,
            category: None,
            average_rating: None,
            rating_count: None,
            source,
        }
    }
}

/// External book-metadata provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchSource {
    OpenLibrary,
    GoogleBooks,
}

impl SearchSource {
    /// Human-readable provider name for logs and health output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::OpenLibrary => "Open Library",
            SearchSource::GoogleBooks => "Google Books",
        }
    }
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while talking to a provider.
///
/// These stay inside the search layer: the resilience policy retries the
/// transient ones, the circuit breaker absorbs the rest, and callers of the
/// provider trait only ever see empty result lists.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("Circuit breaker open for {0}")]
    CircuitOpen(&'static str),
}

impl SearchError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Parse failures and remote 4xx-style errors are not retried; a second
    /// identical request would fail identically.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::Network(_) | SearchError::Timeout | SearchError::RateLimited
        )
    }
}
