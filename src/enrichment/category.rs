//! Category resolution and slug generation.
//!
//! Categories are auto-created by the enrichment flow when a candidate
//! names one the catalog doesn't know yet. Names are unique
//! case-insensitively; slugs are derived from the name with numeric-suffix
//! collision resolution.

use sqlx::sqlite::SqlitePool;

use crate::error::{Error, Result};
use crate::model::Category;
use crate::{db, search::normalize::normalize_title};

/// Category assigned when a candidate names none.
pub const DEFAULT_CATEGORY: &str = "Fiction";

/// Category assigned when the supplied name is blank.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

/// Suffixes tried before giving up and using a timestamp.
const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Derive a slug from a category name: lowercase, non-alphanumeric
/// stripped, spaces to hyphens, runs collapsed, trimmed of leading and
/// trailing hyphens.
pub fn slugify(name: &str) -> String {
    // normalize_title already lowercases, strips punctuation and collapses
    // whitespace; spaces become hyphens from there.
    normalize_title(name).replace(' ', "-")
}

/// Look up a category by name (case-insensitive), creating it if absent.
///
/// `requested` handling:
/// - `None` (candidate named no category) resolves to "Fiction"
/// - blank resolves to "Uncategorized"
///
/// Slug collisions get `-1`, `-2`, ... suffixes; after 100 attempts a
/// timestamp suffix guarantees uniqueness. A concurrent-creation race
/// (unique violation on insert) is recovered by re-querying by name.
pub async fn resolve_category(pool: &SqlitePool, requested: Option<&str>) -> Result<Category> {
    let name = match requested.map(str::trim) {
        None => DEFAULT_CATEGORY,
        Some("") => FALLBACK_CATEGORY,
        Some(name) => name,
    };

    if let Some(existing) = db::find_category_by_name(pool, name).await? {
        return Ok(existing);
    }

    let slug = free_slug(pool, name).await?;
    match db::insert_category(pool, name, &slug).await {
        Ok(category) => {
            tracing::info!(name, slug, "created category");
            Ok(category)
        }
        Err(e) => {
            // Lost a creation race: another writer inserted this name (or
            // took the slug) between our checks. The name re-query settles it.
            if let Some(existing) = db::find_category_by_name(pool, name).await? {
                return Ok(existing);
            }
            Err(Error::Database(e).context(format!("creating category '{}'", name)))
        }
    }
}

/// Find an unused slug for `name`.
async fn free_slug(pool: &SqlitePool, name: &str) -> Result<String> {
    let base = match slugify(name) {
        s if s.is_empty() => "category".to_string(),
        s => s,
    };

    if !db::category_slug_exists(pool, &base).await? {
        return Ok(base);
    }
    for n in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{}-{}", base, n);
        if !db::category_slug_exists(pool, &candidate).await? {
            return Ok(candidate);
        }
    }

    Ok(format!("{}-{}", base, chrono::Utc::now().timestamp()))
}
