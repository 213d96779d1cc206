//! Trait definitions for external book-search providers.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.
//!
//! Provider methods return plain candidate lists, never errors: transport
//! failures are retried and circuit-broken inside each client and surface
//! only as empty results plus a degraded health report.

use async_trait::async_trait;

use super::domain::{BookCandidate, SearchSource};
use super::googlebooks::GoogleBooksClient;
use super::openlibrary::OpenLibraryClient;

/// Health snapshot for one provider, derived from its circuit breaker.
#[derive(Debug, Clone)]
pub struct ProviderHealth {
    /// Which provider this describes
    pub source: SearchSource,
    /// False while the provider's circuit is open
    pub healthy: bool,
    /// Human-readable status line
    pub message: String,
}

/// One external book-search provider.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait BookProvider: Send + Sync {
    /// Which provider this is; also determines merge priority via the
    /// aggregator's registration order.
    fn source(&self) -> SearchSource;

    /// General keyword search.
    async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate>;

    /// Search by ISBN.
    async fn search_by_isbn(&self, isbn: &str) -> Vec<BookCandidate>;

    /// Search by title.
    async fn search_by_title(&self, title: &str, limit: usize) -> Vec<BookCandidate>;

    /// Search by author.
    async fn search_by_author(&self, author: &str, limit: usize) -> Vec<BookCandidate>;

    /// Current health, derived from resilience state.
    fn health(&self) -> ProviderHealth;
}

// Implement the trait for real clients

#[async_trait]
impl BookProvider for OpenLibraryClient {
    fn source(&self) -> SearchSource {
        SearchSource::OpenLibrary
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate> {
        self.search(query, limit).await
    }

    async fn search_by_isbn(&self, isbn: &str) -> Vec<BookCandidate> {
        self.search_by_isbn(isbn).await
    }

    async fn search_by_title(&self, title: &str, limit: usize) -> Vec<BookCandidate> {
        self.search_by_title(title, limit).await
    }

    async fn search_by_author(&self, author: &str, limit: usize) -> Vec<BookCandidate> {
        self.search_by_author(author, limit).await
    }

    fn health(&self) -> ProviderHealth {
        breaker_health(SearchSource::OpenLibrary, self.breaker())
    }
}

#[async_trait]
impl BookProvider for GoogleBooksClient {
    fn source(&self) -> SearchSource {
        SearchSource::GoogleBooks
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<BookCandidate> {
        self.search(query, limit).await
    }

    async fn search_by_isbn(&self, isbn: &str) -> Vec<BookCandidate> {
        self.search_by_isbn(isbn).await
    }

    async fn search_by_title(&self, title: &str, limit: usize) -> Vec<BookCandidate> {
        self.search_by_title(title, limit).await
    }

    async fn search_by_author(&self, author: &str, limit: usize) -> Vec<BookCandidate> {
        self.search_by_author(author, limit).await
    }

    fn health(&self) -> ProviderHealth {
        breaker_health(SearchSource::GoogleBooks, self.breaker())
    }
}

fn breaker_health(
    source: SearchSource,
    breaker: &super::resilience::CircuitBreaker,
) -> ProviderHealth {
    use super::resilience::CircuitState;

    let (healthy, message) = match breaker.state() {
        CircuitState::Closed => (true, "available".to_string()),
        CircuitState::HalfOpen => (true, "recovering (probing)".to_string()),
        CircuitState::Open => (false, "unavailable (circuit open)".to_string()),
    };

    ProviderHealth {
        source,
        healthy,
        message,
    }
}
