//! Google Books volumes API integration
//!
//! Google Books search works without credentials for modest volumes; an
//! optional API key raises the quota.
//! API docs: https://developers.google.com/books/docs/v1/using

mod adapter;
mod client;
pub mod dto;

pub use adapter::to_candidates;
pub use client::{GoogleBooksClient, MAX_PAGE_SIZE};
