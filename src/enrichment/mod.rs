//! Book enrichment - turns provider search results into catalog records.
//!
//! The enrichment service sits between the search aggregator and the
//! database:
//! 1. Check the catalog first - an archived book never costs a network call
//! 2. Aggregate provider results for anything missing
//! 3. Map the chosen candidate onto a canonical `Book`
//! 4. Resolve or create its `Category` (slug generation, collision handling)
//! 5. Persist, recovering from concurrent-insert races by re-querying
//!
//! Failures enriching one candidate are logged and skipped; they never
//! abort the rest of a batch.

pub mod category;
pub mod service;

pub use category::{resolve_category, slugify, DEFAULT_CATEGORY, FALLBACK_CATEGORY};
pub use service::EnrichmentService;
