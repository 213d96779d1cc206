//! Enrichment service - orchestrates search aggregation and persistence.
//!
//! This is the high-level API for growing the catalog:
//! 1. Check the catalog for an existing record (no network when archived)
//! 2. Aggregate provider results for the query
//! 3. Map candidates to canonical books, resolve categories, persist
//!
//! Enrichment is safe to repeat: ISBN and (title, author) existence checks
//! run before every insert, and unique-constraint races are recovered by
//! re-querying.

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use crate::db::{self, BookRecord};
use crate::enrichment::category::resolve_category;
use crate::error::{Error, Result};
use crate::model::Book;
use crate::search::normalize::{is_valid_isbn, normalize_isbn};
use crate::search::{BookCandidate, SearchAggregator};

/// Service for enriching the catalog from external sources.
pub struct EnrichmentService {
    pool: SqlitePool,
    aggregator: Arc<SearchAggregator>,
}

impl EnrichmentService {
    /// Create a new enrichment service over a catalog pool and aggregator.
    pub fn new(pool: SqlitePool, aggregator: Arc<SearchAggregator>) -> Self {
        Self { pool, aggregator }
    }

    /// Enrich by ISBN.
    ///
    /// A malformed ISBN is rejected synchronously. An archived book with
    /// this ISBN is returned as-is without any provider call; otherwise the
    /// first aggregated candidate is archived and returned. `None` means
    /// no provider knew the ISBN.
    pub async fn enrich_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        if !is_valid_isbn(isbn) {
            return Err(Error::invalid_isbn(isbn));
        }
        let isbn = normalize_isbn(isbn);

        if let Some(existing) = db::find_book_by_isbn(&self.pool, &isbn).await? {
            tracing::debug!(isbn, "already archived, skipping provider search");
            return Ok(Some(existing));
        }

        let mut candidates = self.aggregator.search_by_isbn(&isbn).await;
        if candidates.is_empty() {
            return Ok(None);
        }
        let candidate = candidates.remove(0);
        let book = self.persist_candidate(&candidate).await?;
        Ok(Some(book))
    }

    /// Enrich by title: archived matches plus newly archived provider results.
    pub async fn enrich_by_title(&self, title: &str, limit: usize) -> Result<Vec<Book>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::BlankQuery);
        }
        let seed = db::find_books_by_title(&self.pool, title).await?;
        let candidates = self.aggregator.search_by_title(title, limit).await;
        Ok(self.absorb_candidates(seed, candidates).await)
    }

    /// Enrich by author: archived matches plus newly archived provider results.
    pub async fn enrich_by_author(&self, author: &str, limit: usize) -> Result<Vec<Book>> {
        let author = author.trim();
        if author.is_empty() {
            return Err(Error::BlankQuery);
        }
        let seed = db::find_books_by_author(&self.pool, author).await?;
        let candidates = self.aggregator.search_by_author(author, limit).await;
        Ok(self.absorb_candidates(seed, candidates).await)
    }

    /// Refresh an archived book from the providers.
    ///
    /// Queries by ISBN when the book has one, else by title. Fields are
    /// only overwritten where the candidate supplies a non-blank value;
    /// a provider that has lost a field never nulls it out locally.
    /// `None` means no provider had anything to offer.
    pub async fn update_from_source(&self, book: &Book) -> Result<Option<Book>> {
        let candidates = match book.isbn.as_deref() {
            Some(isbn) => self.aggregator.search_by_isbn(isbn).await,
            None => self.aggregator.search_by_title(&book.title, 1).await,
        };
        let Some(candidate) = candidates.first() else {
            return Ok(None);
        };

        let mut updated = book.clone();
        apply_candidate(&mut updated, candidate);
        if let Some(name) = candidate.category.as_deref()
            && !name.trim().is_empty()
        {
            let category = resolve_category(&self.pool, Some(name)).await?;
            updated.category_id = Some(category.id);
        }

        db::update_book(&self.pool, &updated).await?;
        Ok(Some(updated))
    }

    /// Fold provider candidates into a seed set of archived books.
    ///
    /// A candidate already represented in the running set (by normalized
    /// ISBN, or by exact case-insensitive title + author) is skipped. One
    /// candidate failing to persist is logged and skipped; the rest of the
    /// batch continues.
    async fn absorb_candidates(
        &self,
        mut books: Vec<Book>,
        candidates: Vec<BookCandidate>,
    ) -> Vec<Book> {
        for candidate in candidates {
            if known(&books, &candidate) {
                continue;
            }
            match self.persist_candidate(&candidate).await {
                Ok(book) => books.push(book),
                Err(e) => {
                    tracing::warn!(title = %candidate.title, "could not archive candidate: {}", e);
                }
            }
        }
        books
    }

    /// Map a candidate to a book record and insert it, resolving its
    /// category first and recovering from duplicate races by re-querying.
    async fn persist_candidate(&self, candidate: &BookCandidate) -> Result<Book> {
        let isbn = candidate
            .isbn
            .as_deref()
            .map(normalize_isbn)
            .filter(|s| !s.is_empty());

        if let Some(ref isbn) = isbn
            && let Some(existing) = db::find_book_by_isbn(&self.pool, isbn).await?
        {
            return Ok(existing);
        }

        let category = resolve_category(&self.pool, candidate.category.as_deref()).await?;
        let record = BookRecord {
            title: candidate.title.clone(),
            author: candidate.author.clone(),
            isbn: isbn.clone(),
            publication_year: candidate.publication_year.map(i64::from),
            publisher: candidate.publisher.clone(),
            page_count: candidate.page_count.map(i64::from),
            description: candidate.description.clone(),
            cover_url: candidate.cover_url.clone(),
            category_id: Some(category.id),
            average_rating: candidate.average_rating,
            rating_count: candidate.rating_count.map(i64::from),
        };

        match db::insert_book(&self.pool, &record).await {
            Ok(book) => {
                tracing::info!(title = %book.title, id = book.id, "archived book");
                Ok(book)
            }
            Err(e) => {
                // Unique-constraint race: someone archived this book between
                // our existence check and the insert. Re-query both keys.
                if let Some(ref isbn) = isbn
                    && let Some(existing) = db::find_book_by_isbn(&self.pool, isbn).await?
                {
                    return Ok(existing);
                }
                if let Some(existing) = db::find_book_by_title_and_author(
                    &self.pool,
                    &candidate.title,
                    candidate.author.as_deref(),
                )
                .await?
                {
                    return Ok(existing);
                }
                Err(Error::Database(e).context(format!("archiving '{}'", candidate.title)))
            }
        }
    }
}

/// Is this candidate already represented in the running result set?
fn known(books: &[Book], candidate: &BookCandidate) -> bool {
    let candidate_isbn = candidate
        .isbn
        .as_deref()
        .map(normalize_isbn)
        .filter(|s| !s.is_empty());

    books.iter().any(|book| {
        if let (Some(ci), Some(bi)) = (candidate_isbn.as_deref(), book.isbn.as_deref())
            && ci == normalize_isbn(bi)
        {
            return true;
        }
        book.title.eq_ignore_ascii_case(&candidate.title)
            && match (book.author.as_deref(), candidate.author.as_deref()) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                (None, None) => true,
                _ => false,
            }
    })
}

/// Overwrite a book's fields with values the candidate actually supplies;
/// absent or blank candidate fields leave the book untouched.
fn apply_candidate(book: &mut Book, candidate: &BookCandidate) {
    fn non_blank(s: &Option<String>) -> Option<String> {
        s.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    if !candidate.title.trim().is_empty() {
        book.title = candidate.title.trim().to_string();
    }
    if let Some(author) = non_blank(&candidate.author) {
        book.author = Some(author);
    }
    if let Some(isbn) = non_blank(&candidate.isbn) {
        book.isbn = Some(normalize_isbn(&isbn));
    }
    if let Some(publisher) = non_blank(&candidate.publisher) {
        book.publisher = Some(publisher);
    }
    if let Some(description) = non_blank(&candidate.description) {
        book.description = Some(description);
    }
    if let Some(cover_url) = non_blank(&candidate.cover_url) {
        book.cover_url = Some(cover_url);
    }
    if let Some(year) = candidate.publication_year {
        book.publication_year = Some(i64::from(year));
    }
    if let Some(pages) = candidate.page_count {
        book.page_count = Some(i64::from(pages));
    }
    if let Some(rating) = candidate.average_rating {
        book.average_rating = Some(rating);
    }
    if let Some(count) = candidate.rating_count {
        book.rating_count = Some(i64::from(count));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::search::domain::SearchSource;
    use crate::search::traits::mocks::MockProvider;
    use crate::search::BookProvider;
    use crate::test_utils::{sample_candidate, temp_db};

    fn service_with(
        pool: SqlitePool,
        providers: Vec<Arc<dyn BookProvider>>,
    ) -> EnrichmentService {
        let aggregator = Arc::new(SearchAggregator::new(providers, Duration::from_secs(2)));
        EnrichmentService::new(pool, aggregator)
    }

    #[tokio::test]
    async fn test_enrich_by_isbn_rejects_malformed() {
        let (pool, _dir) = temp_db().await;
        let service = service_with(pool, vec![]);

        let result = service.enrich_by_isbn("not-an-isbn").await;
        assert!(matches!(result, Err(Error::InvalidIsbn(_))));
    }

    #[tokio::test]
    async fn test_enrich_by_isbn_archives_first_candidate() {
        let (pool, _dir) = temp_db().await;
        let candidate = sample_candidate("The Hobbit", Some("9780261103344"));
        let provider = Arc::new(MockProvider::with_results(
            SearchSource::OpenLibrary,
            vec![candidate],
        ));
        let service = service_with(pool.clone(), vec![provider]);

        let book = service
            .enrich_by_isbn("978-0-261-10334-4")
            .await
            .unwrap()
            .expect("should archive a book");

        assert_eq!(book.title, "The Hobbit");
        assert_eq!(book.isbn.as_deref(), Some("9780261103344"));
        assert!(book.category_id.is_some());

        let archived = db::find_book_by_isbn(&pool, "9780261103344")
            .await
            .unwrap();
        assert!(archived.is_some());
    }

    #[tokio::test]
    async fn test_enrich_by_isbn_second_call_skips_network() {
        let (pool, _dir) = temp_db().await;
        let provider = Arc::new(MockProvider::with_results(
            SearchSource::OpenLibrary,
            vec![sample_candidate("The Hobbit", Some("9780261103344"))],
        ));
        let service = service_with(pool, vec![provider.clone()]);

        let first = service.enrich_by_isbn("9780261103344").await.unwrap();
        let second = service.enrich_by_isbn("9780261103344").await.unwrap();

        assert_eq!(first.unwrap().id, second.unwrap().id);
        // Exactly one provider call total: the second enrich hit the catalog.
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_enrich_by_isbn_no_match() {
        let (pool, _dir) = temp_db().await;
        let provider = Arc::new(MockProvider::empty(SearchSource::OpenLibrary));
        let service = service_with(pool, vec![provider]);

        let result = service.enrich_by_isbn("9780261103344").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_enrich_by_title_merges_archived_and_new() {
        let (pool, _dir) = temp_db().await;

        // One book already archived.
        db::insert_book(
            &pool,
            &crate::db::BookRecord {
                title: "The Fellowship of the Ring".to_string(),
                author: Some("J.R.R. Tolkien".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Provider offers the archived book again plus a new one.
        let mut already_archived = sample_candidate("The Fellowship of the Ring", None);
        already_archived.author = Some("J.R.R. Tolkien".to_string());
        let provider = Arc::new(MockProvider::with_results(
            SearchSource::OpenLibrary,
            vec![
                already_archived,
                sample_candidate("The Two Towers", Some("9780261102361")),
            ],
        ));
        let service = service_with(pool.clone(), vec![provider]);

        let books = service
            .enrich_by_title("the fellowship", 10)
            .await
            .unwrap();

        // Seeded archived book + one genuinely new candidate.
        assert_eq!(books.len(), 2);
        assert!(books.iter().any(|b| b.title == "The Two Towers"));
    }

    #[tokio::test]
    async fn test_enrich_by_title_rejects_blank() {
        let (pool, _dir) = temp_db().await;
        let service = service_with(pool, vec![]);

        assert!(matches!(
            service.enrich_by_title("   ", 10).await,
            Err(Error::BlankQuery)
        ));
    }

    #[tokio::test]
    async fn test_candidate_category_resolved_with_default() {
        let (pool, _dir) = temp_db().await;

        let mut fantasy = sample_candidate("The Hobbit", Some("9780261103344"));
        fantasy.category = Some("Fantasy".to_string());
        let uncategorized = sample_candidate("Mystery Pamphlet", Some("9999999999999"));

        let provider = Arc::new(MockProvider::with_results(
            SearchSource::OpenLibrary,
            vec![fantasy, uncategorized],
        ));
        let service = service_with(pool.clone(), vec![provider]);

        let books = service.enrich_by_title("anything", 10).await.unwrap();
        assert_eq!(books.len(), 2);

        let fantasy_cat = db::find_category_by_name(&pool, "Fantasy")
            .await
            .unwrap()
            .expect("Fantasy category created");
        assert_eq!(fantasy_cat.slug, "fantasy");

        // Candidate without a category landed in the default.
        assert!(
            db::find_category_by_name(&pool, crate::enrichment::DEFAULT_CATEGORY)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_update_from_source_never_nulls_fields() {
        let (pool, _dir) = temp_db().await;

        let book = db::insert_book(
            &pool,
            &crate::db::BookRecord {
                title: "Dune".to_string(),
                author: Some("Frank Herbert".to_string()),
                isbn: Some("9780441013593".to_string()),
                description: Some("A desert planet epic.".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Candidate supplies a year but no description.
        let mut candidate = sample_candidate("Dune", Some("9780441013593"));
        candidate.publication_year = Some(1965);
        let provider = Arc::new(MockProvider::with_results(
            SearchSource::OpenLibrary,
            vec![candidate],
        ));
        let service = service_with(pool.clone(), vec![provider]);

        let updated = service.update_from_source(&book).await.unwrap().unwrap();

        assert_eq!(updated.publication_year, Some(1965));
        // Existing description survived the provider's missing field.
        assert_eq!(updated.description.as_deref(), Some("A desert planet epic."));

        let reloaded = db::get_book_by_id(&pool, book.id).await.unwrap().unwrap();
        assert_eq!(reloaded.publication_year, Some(1965));
    }

    #[tokio::test]
    async fn test_update_from_source_no_candidates() {
        let (pool, _dir) = temp_db().await;

        let book = db::insert_book(
            &pool,
            &crate::db::BookRecord {
                title: "Obscure Title".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let provider = Arc::new(MockProvider::empty(SearchSource::OpenLibrary));
        let service = service_with(pool, vec![provider]);

        assert!(service.update_from_source(&book).await.unwrap().is_none());
    }

    #[test]
    fn test_known_matches_by_isbn_and_title_author() {
        let book = Book {
            id: 1,
            title: "The Hobbit".to_string(),
            author: Some("J.R.R. Tolkien".to_string()),
            isbn: Some("9780261103344".to_string()),
            publication_year: None,
            publisher: None,
            page_count: None,
            description: None,
            cover_url: None,
            category_id: None,
            average_rating: None,
            rating_count: None,
        };

        let by_isbn = sample_candidate("Different Title", Some("978-0-261-10334-4"));
        assert!(known(&[book.clone()], &by_isbn));

        let mut by_pair = sample_candidate("the hobbit", None);
        by_pair.author = Some("j.r.r. tolkien".to_string());
        assert!(known(&[book.clone()], &by_pair));

        let fresh = sample_candidate("The Silmarillion", Some("9780261102736"));
        assert!(!known(&[book], &fresh));
    }
}
