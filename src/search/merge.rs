//! Deduplicating merge of per-provider result lists.
//!
//! The aggregator hands this module one list per provider, ordered by
//! provider priority (Open Library before Google Books - Open Library is
//! authoritative for consistency). The merge is a single deterministic,
//! order-preserving pass with hash-set lookups.

use std::collections::HashSet;

use super::domain::BookCandidate;
use super::normalize::{normalize_isbn, normalize_title};

/// Merge per-provider candidate lists into one deduplicated list.
///
/// `lists` must be ordered by provider priority; within each list the
/// provider's original response order is preserved. A candidate is dropped
/// when its non-empty normalized ISBN *or* its non-empty normalized title
/// has already been seen. First-seen candidates keep their relative order.
///
/// Title-only matching is intentionally aggressive: the same normalized
/// title from two providers is treated as the same book even when the ISBNs
/// differ. That trades occasional false merges of same-titled books for far
/// fewer duplicates in the common case.
pub fn merge_candidates(lists: Vec<Vec<BookCandidate>>) -> Vec<BookCandidate> {
    let mut seen_isbn: HashSet<String> = HashSet::new();
    let mut seen_title: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for list in lists {
        for candidate in list {
            let isbn_key = candidate
                .isbn
                .as_deref()
                .map(normalize_isbn)
                .unwrap_or_default();
            let title_key = normalize_title(&candidate.title);

            let duplicate = (!isbn_key.is_empty() && seen_isbn.contains(&isbn_key))
                || (!title_key.is_empty() && seen_title.contains(&title_key));
            if duplicate {
                continue;
            }

            if !isbn_key.is_empty() {
                seen_isbn.insert(isbn_key);
            }
            if !title_key.is_empty() {
                seen_title.insert(title_key);
            }
            merged.push(candidate);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::domain::SearchSource;

    fn candidate(title: &str, isbn: Option<&str>, source: SearchSource) -> BookCandidate {
        BookCandidate {
            isbn: isbn.map(String::from),
            ..BookCandidate::new(title, source)
        }
    }

    #[test]
    fn test_equal_isbn_keeps_first_encountered() {
        let a = candidate("The Hobbit", Some("9780261103344"), SearchSource::OpenLibrary);
        let b = candidate(
            "The Hobbit: 75th Anniversary",
            Some("978-0-261-10334-4"),
            SearchSource::GoogleBooks,
        );

        let merged = merge_candidates(vec![vec![a], vec![b]]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, SearchSource::OpenLibrary);
    }

    #[test]
    fn test_equal_title_no_isbn_keeps_first() {
        let a = candidate("Legacy", None, SearchSource::OpenLibrary);
        let b = candidate("legacy!", None, SearchSource::GoogleBooks);

        let merged = merge_candidates(vec![vec![a], vec![b]]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, SearchSource::OpenLibrary);
    }

    #[test]
    fn test_title_match_wins_over_differing_isbn() {
        // Priority provider has ISBN 111, lower-priority has 222 but the
        // same title: title match wins, only the priority record survives.
        let a = candidate("X", Some("1111111111"), SearchSource::OpenLibrary);
        let b = candidate("X", Some("2222222222"), SearchSource::GoogleBooks);

        let merged = merge_candidates(vec![vec![a], vec![b]]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].isbn.as_deref(), Some("1111111111"));
    }

    #[test]
    fn test_preserves_relative_order() {
        let ol = vec![
            candidate("Alpha", None, SearchSource::OpenLibrary),
            candidate("Beta", None, SearchSource::OpenLibrary),
        ];
        let gb = vec![
            candidate("Gamma", None, SearchSource::GoogleBooks),
            candidate("Beta", None, SearchSource::GoogleBooks), // dup
            candidate("Delta", None, SearchSource::GoogleBooks),
        ];

        let merged = merge_candidates(vec![ol, gb]);

        let titles: Vec<&str> = merged.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma", "Delta"]);
    }

    #[test]
    fn test_priority_order_not_completion_order() {
        // Lists arrive in priority order regardless of which provider
        // answered first; the second list's duplicates always lose.
        let gb = vec![candidate("Dune", Some("9780441013593"), SearchSource::GoogleBooks)];
        let ol = vec![candidate("Dune", Some("9780441013593"), SearchSource::OpenLibrary)];

        let merged = merge_candidates(vec![ol, gb]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, SearchSource::OpenLibrary);
    }

    #[test]
    fn test_empty_keys_never_collide() {
        // Candidates with no ISBN don't collide on the empty ISBN key.
        let a = candidate("One Title", None, SearchSource::OpenLibrary);
        let b = candidate("Another Title", None, SearchSource::OpenLibrary);

        let merged = merge_candidates(vec![vec![a, b]]);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_overlap_scenario() {
        // 4 unique from Open Library + 4 from Google Books with 2 title
        // overlaps -> 6 merged candidates.
        let ol: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .map(|t| candidate(t, None, SearchSource::OpenLibrary))
            .collect();
        let gb: Vec<_> = ["C", "D", "E", "F"]
            .iter()
            .map(|t| candidate(t, None, SearchSource::GoogleBooks))
            .collect();

        let merged = merge_candidates(vec![ol, gb]);

        assert_eq!(merged.len(), 6);
    }
}
