//! Open Library search API integration
//!
//! Open Library is a free, open book catalog run by the Internet Archive.
//! API docs: https://openlibrary.org/dev/docs/api/search

mod adapter;
mod client;
pub mod dto;

pub use adapter::to_candidates;
pub use client::{OpenLibraryClient, MAX_PAGE_SIZE};
