//! Search aggregation - concurrent fan-out across all providers.
//!
//! The aggregator issues one logical query to every registered provider in
//! parallel, joins with an overall deadline, merges the per-provider lists
//! in priority order and truncates last. A provider that fails, panics or
//! misses the deadline contributes an empty list; aggregation itself never
//! fails.
//!
//! Provider priority is the registration order of the `providers` vector:
//! Open Library first, Google Books second. The merge consumes lists in
//! that order regardless of which provider answered first.

use std::sync::Arc;
use std::time::Duration;

use super::domain::{BookCandidate, SearchSource};
use super::googlebooks::GoogleBooksClient;
use super::merge::merge_candidates;
use super::normalize::normalize_isbn;
use super::openlibrary::OpenLibraryClient;
use super::traits::{BookProvider, ProviderHealth};

/// Overall deadline for one aggregation fan-out.
pub const AGGREGATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Aggregated health across all providers.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Per-provider health, in priority order
    pub providers: Vec<ProviderHealth>,
    /// At least one provider can serve searches
    pub any_healthy: bool,
    /// Every provider can serve searches
    pub all_healthy: bool,
}

/// One logical query, shipped into each provider task.
#[derive(Debug, Clone)]
enum Query {
    General(String),
    Title(String),
    Author(String),
}

impl Query {
    fn text(&self) -> &str {
        match self {
            Query::General(s) | Query::Title(s) | Query::Author(s) => s,
        }
    }

    async fn run(&self, provider: &dyn BookProvider, limit: usize) -> Vec<BookCandidate> {
        match self {
            Query::General(q) => provider.search(q, limit).await,
            Query::Title(t) => provider.search_by_title(t, limit).await,
            Query::Author(a) => provider.search_by_author(a, limit).await,
        }
    }
}

/// Fans one search out to every provider and merges the results.
pub struct SearchAggregator {
    providers: Vec<Arc<dyn BookProvider>>,
    timeout: Duration,
}

impl SearchAggregator {
    /// Create an aggregator over an explicit provider list.
    ///
    /// The list order IS the merge priority order.
    pub fn new(providers: Vec<Arc<dyn BookProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Standard production setup: Open Library (priority) then Google Books.
    pub fn with_default_providers(google_api_key: Option<String>) -> Self {
        Self::new(
            vec![
                Arc::new(OpenLibraryClient::new()),
                Arc::new(GoogleBooksClient::new(google_api_key)),
            ],
            AGGREGATION_TIMEOUT,
        )
    }

    /// Override the aggregation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// General search across all providers, merged and truncated to `limit`.
    pub async fn search_all(&self, query: &str, limit: usize) -> Vec<BookCandidate> {
        self.fan_out(Query::General(query.trim().to_string()), limit)
            .await
    }

    /// Title search across all providers.
    pub async fn search_by_title(&self, title: &str, limit: usize) -> Vec<BookCandidate> {
        self.fan_out(Query::Title(title.trim().to_string()), limit)
            .await
    }

    /// Author search across all providers.
    pub async fn search_by_author(&self, author: &str, limit: usize) -> Vec<BookCandidate> {
        self.fan_out(Query::Author(author.trim().to_string()), limit)
            .await
    }

    /// ISBN search with short-circuit ordering.
    ///
    /// An ISBN identifies one book, so unlike the general fan-out this
    /// tries providers sequentially in priority order and returns the first
    /// non-empty answer.
    pub async fn search_by_isbn(&self, isbn: &str) -> Vec<BookCandidate> {
        let isbn = normalize_isbn(isbn);
        if isbn.is_empty() {
            return Vec::new();
        }

        for provider in &self.providers {
            let results = provider.search_by_isbn(&isbn).await;
            if !results.is_empty() {
                return merge_candidates(vec![results]);
            }
            tracing::debug!(
                provider = provider.source().as_str(),
                isbn,
                "no ISBN match, trying next provider"
            );
        }
        Vec::new()
    }

    /// Per-provider health plus derived flags, so callers can distinguish
    /// "no results" from "providers down".
    pub fn health_status(&self) -> HealthReport {
        let providers: Vec<ProviderHealth> =
            self.providers.iter().map(|p| p.health()).collect();
        let any_healthy = providers.iter().any(|h| h.healthy);
        let all_healthy = !providers.is_empty() && providers.iter().all(|h| h.healthy);

        HealthReport {
            providers,
            any_healthy,
            all_healthy,
        }
    }

    /// Dispatch `query` to every provider concurrently, join with the
    /// overall deadline, merge in priority order, truncate last.
    async fn fan_out(&self, query: Query, limit: usize) -> Vec<BookCandidate> {
        if query.text().is_empty() {
            return Vec::new();
        }

        let deadline = tokio::time::Instant::now() + self.timeout;

        let handles: Vec<_> = self
            .providers
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let query = query.clone();
                tokio::spawn(async move { query.run(provider.as_ref(), limit).await })
            })
            .collect();

        let joined = futures::future::join_all(
            handles
                .into_iter()
                .map(|handle| tokio::time::timeout_at(deadline, handle)),
        )
        .await;

        // join_all preserves spawn order, which is provider priority order.
        let lists: Vec<Vec<BookCandidate>> = joined
            .into_iter()
            .zip(self.providers.iter())
            .map(|(result, provider)| match result {
                Ok(Ok(list)) => list,
                Ok(Err(join_err)) => {
                    tracing::warn!(
                        provider = provider.source().as_str(),
                        "provider task failed: {}",
                        join_err
                    );
                    Vec::new()
                }
                Err(_) => {
                    tracing::warn!(
                        provider = provider.source().as_str(),
                        "provider missed the {:?} aggregation deadline",
                        self.timeout
                    );
                    Vec::new()
                }
            })
            .collect();

        let mut merged = merge_candidates(lists);
        merged.truncate(limit);
        merged
    }
}
