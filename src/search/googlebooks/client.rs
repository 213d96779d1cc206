//! Google Books HTTP client
//!
//! Handles communication with the Google Books volumes API.
//! See: https://developers.google.com/books/docs/v1/using
//!
//! ## API Quirks & Best Practices
//!
//! ### Search Operators
//! Field-scoped searches use operators inside the `q` parameter
//! (`isbn:`, `intitle:`, `inauthor:`). The operator prefix must reach the
//! API verbatim while the search term itself is percent-encoded, so the URL
//! is assembled manually rather than through reqwest's `.query()`.
//!
//! ### API Key
//! Anonymous requests work but are aggressively quota-limited per IP.
//! When a key is configured it is appended as the `key` parameter.

use std::time::Duration;

use super::{adapter, dto};
use crate::search::domain::{BookCandidate, SearchError};
use crate::search::normalize::normalize_isbn;
use crate::search::resilience::{CircuitBreaker, Resilience};

/// Largest page the API will serve; caller limits are capped to this.
pub const MAX_PAGE_SIZE: usize = 40;

/// Per-request timeout, bounding one HTTP round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Google Books API client
pub struct GoogleBooksClient {
    api_key: Option<String>,
    http_client: reqwest::Client,
    base_url: String,
    resilience: Resilience,
}

impl GoogleBooksClient {
    /// Create a new client with the default resilience policy.
    ///
    /// `api_key` is optional; anonymous access works with a lower quota.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_resilience(api_key, Resilience::new("Google Books"))
    }

    /// Create a client with a custom resilience policy.
    pub fn with_resilience(api_key: Option<String>, resilience: Resilience) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_key,
            http_client,
            base_url: "https://www.googleapis.com/books/v1/volumes".to_string(),
            resilience,
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let mut client = Self::new(api_key);
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
        let q = urlencoding::encode(query.trim()).into_owned();
        self.guarded(&q, page_limit(limit)).await
    }

    /// Search by ISBN using the `isbn:` operator.
    pub async fn search_by_isbn(&self, isbn: &str) -> Vec<BookCandidate> {
        let isbn = normalize_isbn(isbn);
        if isbn.is_empty() {
            return Vec::new();
        }
        let q = format!("isbn:{}", isbn);
        self.guarded(&q, page_limit(1)).await
    }

    /// Search by title using the `intitle:` operator.
    pub async fn search_by_title(&self, title: &str, limit: usize) -> Vec<BookCandidate> {
        if title.trim().is_empty() {
            return Vec::new();
        }
        let q = format!("intitle:{}", urlencoding::encode(title.trim()));
        self.guarded(&q, page_limit(limit)).await
    }

    /// Search by author using the `inauthor:` operator.
    pub async fn search_by_author(&self, author: &str, limit: usize) -> Vec<BookCandidate> {
        if author.trim().is_empty() {
            return Vec::new();
        }
        let q = format!("inauthor:{}", urlencoding::encode(author.trim()));
        self.guarded(&q, page_limit(limit)).await
    }

    /// Run one search under the resilience policy, degrading to an empty
    /// result list when the policy is exhausted.
    async fn guarded(&self, q: &str, limit: usize) -> Vec<BookCandidate> {
        match self.resilience.run(|| self.send_volumes_request(q, limit)).await {
            Ok(response) => adapter::to_candidates(response),
            Err(e) => {
                tracing::warn!("Google Books search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Build the request URL. The operator prefix in `q` (e.g. `isbn:`)
    /// must not be percent-encoded; the caller pre-encodes only the term.
    fn request_url(&self, q: &str, limit: usize) -> String {
        let mut url = format!("{}?q={}&maxResults={}", self.base_url, q, limit);
        if let Some(ref key) = self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }

    /// Send the HTTP request and parse the response
    async fn send_volumes_request(
        &self,
        q: &str,
        limit: usize,
    ) -> Result<dto::VolumesResponse, SearchError> {
        let url = self.request_url(q, limit);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
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
            .json::<dto::VolumesResponse>()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))
    }
}

/// Cap a caller-requested limit to the provider's page-size maximum.
fn page_limit(requested: usize) -> usize {
    requested.clamp(1, MAX_PAGE_SIZE)
}
