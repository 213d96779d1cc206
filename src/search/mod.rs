//! Multi-source book search - queries external providers and merges results.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`openlibrary/dto.rs`, `googlebooks/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Resilience** - Retry and circuit-breaker policy around every provider call
//! - **Aggregator** - Concurrent fan-out, deadline join, merge, health reporting
//!
//! This decoupling means:
//! 1. API changes don't ripple through our codebase
//! 2. We can test API contracts independently
//! 3. We can add providers without changing business logic
//!
//! # Usage
//!
//! ```ignore
//! use home_archive::search::SearchAggregator;
//!
//! let aggregator = SearchAggregator::with_default_providers(None);
//! let candidates = aggregator.search_all("tolkien", 5).await;
//! ```

pub mod aggregator;
pub mod domain;
pub mod googlebooks;
pub mod merge;
pub mod normalize;
pub mod openlibrary;
pub mod resilience;
pub mod traits;

pub use aggregator::{HealthReport, SearchAggregator, AGGREGATION_TIMEOUT};
pub use domain::{BookCandidate, SearchError, SearchSource};
pub use merge::merge_candidates;
pub use traits::{BookProvider, ProviderHealth};
