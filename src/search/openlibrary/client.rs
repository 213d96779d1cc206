//! Open Library HTTP client
//!
//! Handles communication with the Open Library search API.
//! See: https://openlibrary.org/dev/docs/api/search
//!
//! Open Library exposes dedicated `title=`, `author=` and `isbn=` query
//! parameters on /search.json, so requests go through reqwest's normal
//! query encoding. Results are public data; no API key is required.

use std::time::Duration;

use super::{adapter, dto};
use crate::search::domain::{BookCandidate, SearchError};
use crate::search::normalize::normalize_isbn;
use crate::search::resilience::{CircuitBreaker, Resilience};

/// Largest page the API will serve; caller limits are capped to this.
pub const MAX_PAGE_SIZE: usize = 100;

/// Per-request timeout, bounding one HTTP round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// User agent string - Open Library asks API consumers to identify themselves
const USER_AGENT: &str = concat!(
    "HomeArchive/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/home-archive)"
);

/// Open Library API client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    base_url: String,
    resilience: Resilience,
}

impl OpenLibraryClient {
    /// Create a new client with the default resilience policy.
    pub fn new() -> Self {
        Self::with_resilience(Resilience::new("Open Library"))
    }

    /// Create a client with a custom resilience policy.
    pub fn with_resilience(resilience: Resilience) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: "https://openlibrary.org".to_string(),
            resilience,
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut client = Self::new();
        client.base_url = base_url.into();
        client
    }

    /// Circuit breaker, for health reporting.
    pub fn breaker(&self) -> &CircuitBreaker {
        self.resilience.breaker()
    }

    /// General keyword search.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.guarded(&[
            ("q", query.trim().to_string()),
            ("limit", page_limit(limit).to_string()),
        ])
        .await
    }

    /// Search by ISBN.
    pub async fn search_by_isbn(&self, isbn: &str) -> Vec<BookCandidate> {
        let isbn = normalize_isbn(isbn);
        if isbn.is_empty() {
            return Vec::new();
        }
        self.guarded(&[("isbn", isbn), ("limit", page_limit(1).to_string())])
            .await
    }

    /// Search by title.
    pub async fn search_by_title(&self, title: &str, limit: usize) -> Vec<BookCandidate> {
        if title.trim().is_empty() {
            return Vec::new();
        }
        self.guarded(&[
            ("title", title.trim().to_string()),
            ("limit", page_limit(limit).to_string()),
        ])
        .await
    }

    /// Search by author.
    pub async fn search_by_author(&self, author: &str, limit: usize) -> Vec<BookCandidate> {
        if author.trim().is_empty() {
            return Vec::new();
        }
        self.guarded(&[
            ("author", author.trim().to_string()),
            ("limit", page_limit(limit).to_string()),
        ])
        .await
    }

    /// Run one search under the resilience policy, degrading to an empty
    /// result list when the policy is exhausted. Failures never escape the
    /// client.
    async fn guarded(&self, params: &[(&str, String)]) -> Vec<BookCandidate> {
        match self
            .resilience
            .run(|| self.send_search_request(params))
            .await
        {
            Ok(response) => adapter::to_candidates(response),
            Err(e) => {
                tracing::warn!("Open Library search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Send the HTTP request and parse the response
    async fn send_search_request(
        &self,
        params: &[(&str, String)],
    ) -> Result<dto::SearchResponse, SearchError> {
        let url = format!("{}/search.json", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }

        if !status.is_success() {
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::SearchResponse>()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Cap a caller-requested limit to the provider's page-size maximum.
fn page_limit(requested: usize) -> usize {
    requested.clamp(1, MAX_PAGE_SIZE)
}
