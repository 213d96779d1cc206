//! Core data models for the book catalog.
//!
//! Defines the persisted entities: [`Book`] and [`Category`].
//! These are derived from SQLx for database mapping.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `categories` - Category records with case-insensitively unique names
//!   and unique slugs
//! - `books` - Canonical book records; ISBN unique when present, and the
//!   (title, author) pair unique
//!
//! Ephemeral search results never touch these types directly - they arrive
//! as [`crate::search::BookCandidate`] and are mapped by the enrichment
//! service.

use sqlx::FromRow;

/// A canonical book in the catalog.
#[derive(Debug, Clone, FromRow)]
pub struct Book {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Book title
    pub title: String,
    /// Author name(s), comma-joined for multiple authors
    pub author: Option<String>,
    /// Normalized ISBN (digits plus trailing X, uppercase)
    pub isbn: Option<String>,
    /// Year of first publication
    pub publication_year: Option<i64>,
    /// Publisher name
    pub publisher: Option<String>,
    /// Number of pages
    pub page_count: Option<i64>,
    /// Description / synopsis
    pub description: Option<String>,
    /// Cover image URL (https)
    pub cover_url: Option<String>,
    /// Category reference
    pub category_id: Option<i64>,
    /// Provider-supplied average rating (0.0 - 5.0)
    pub average_rating: Option<f64>,
    /// Number of ratings behind the average
    pub rating_count: Option<i64>,
}

/// A book category.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Display name (unique, case-insensitive)
    pub name: String,
    /// URL-safe identifier derived from the name (unique)
    pub slug: String,
}
