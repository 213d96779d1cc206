//! Deterministic normalization of ISBN and title strings into comparison keys.
//!
//! These keys drive deduplication across providers, so the rules are fixed:
//! - ISBN: strip everything except digits and `X`, uppercase
//! - Title: lowercase, strip non-alphanumeric/space, collapse whitespace, trim
//!
//! `"978-0-14-303943-3"` and `"9780143039433"` normalize to the same key,
//! as do `"The Great   Gatsby!"` and `"the great gatsby"`.

/// Normalize an ISBN for comparison: keep `[0-9Xx]`, uppercase.
///
/// Returns an empty string when nothing usable remains.
pub fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalize a title for comparison: lowercase, alphanumeric and spaces
/// only, whitespace collapsed and trimmed.
pub fn normalize_title(raw: &str) -> String {
    let stripped: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate an ISBN after normalization.
///
/// Accepts 10- or 13-character normalized forms. `X` (the ISBN-10 check
/// character) is only valid as the final character of a 10-character ISBN.
/// Checksum verification is deliberately not performed - providers index
/// some books under technically invalid ISBNs.
pub fn is_valid_isbn(raw: &str) -> bool {
    let normalized = normalize_isbn(raw);
    match normalized.len() {
        10 => {
            let (body, check) = normalized.split_at(9);
            body.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X')
        }
        13 => normalized.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}
