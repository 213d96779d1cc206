//! Test utilities and fixtures for home-archive tests.
//!
//! This module provides common test helpers, candidate fixtures, and
//! database utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use home_archive::test_utils::{temp_db, sample_candidate};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let candidate = sample_candidate("The Hobbit", Some("9780261103344"));
//!     // ... test logic
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::search::domain::{BookCandidate, SearchSource};

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// # Returns
///
/// A tuple of (connection pool, temp directory handle).
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Creates a search candidate with sensible defaults.
///
/// Customize further fields directly on the returned value:
///
/// ```ignore
/// let mut candidate = sample_candidate("Dune", Some("9780441013593"));
/// candidate.publication_year = Some(1965);
/// ```
pub fn sample_candidate(title: &str, isbn: Option<&str>) -> BookCandidate {
    BookCandidate {
        author: Some("Test Author".to_string()),
        isbn: isbn.map(String::from),
        ..BookCandidate::new(title.to_string(), SearchSource::OpenLibrary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        // Should be able to query
        let books = crate::db::get_all_books(&pool).await.unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn test_sample_candidate_defaults() {
        let candidate = sample_candidate("The Hobbit", Some("9780261103344"));
        assert_eq!(candidate.title, "The Hobbit");
        assert_eq!(candidate.author.as_deref(), Some("Test Author"));
        assert_eq!(candidate.isbn.as_deref(), Some("9780261103344"));
        assert_eq!(candidate.source, SearchSource::OpenLibrary);
        assert!(candidate.category.is_none());
    }
}
