//! Database module for book and category persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Book lookup, insert and update
//! - Category lookup and creation
//! - The existence checks the enrichment flow relies on
//!
//! # Example
//!
//! ```ignore
//! use home_archive::db::{init_db, find_book_by_isbn};
//!
//! let pool = init_db("sqlite:archive.db").await?;
//! let book = find_book_by_isbn(&pool, "9780261103344").await?;
//! ```

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::{Book, Category};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "home_archive.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

const BOOK_COLUMNS: &str = "id, title, author, isbn, publication_year, publisher, page_count, \
     description, cover_url, category_id, average_rating, rating_count";

/// Find a book by its normalized ISBN.
pub async fn find_book_by_isbn(pool: &SqlitePool, isbn: &str) -> sqlx::Result<Option<Book>> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?"
    ))
    .bind(isbn)
    .fetch_optional(pool)
    .await
}

/// Find books whose title contains the query, case-insensitively.
pub async fn find_books_by_title(pool: &SqlitePool, title: &str) -> sqlx::Result<Vec<Book>> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE title LIKE ? COLLATE NOCASE ORDER BY id"
    ))
    .bind(format!("%{}%", title))
    .fetch_all(pool)
    .await
}

/// Find books whose author contains the query, case-insensitively.
pub async fn find_books_by_author(pool: &SqlitePool, author: &str) -> sqlx::Result<Vec<Book>> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE author LIKE ? COLLATE NOCASE ORDER BY id"
    ))
    .bind(format!("%{}%", author))
    .fetch_all(pool)
    .await
}

/// Check whether a book with this exact (title, author) pair exists,
/// case-insensitively. NULL authors only match NULL.
pub async fn exists_by_title_and_author(
    pool: &SqlitePool,
    title: &str,
    author: Option<&str>,
) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM books WHERE title = ?1 COLLATE NOCASE \
         AND ((?2 IS NULL AND author IS NULL) OR author = ?2 COLLATE NOCASE)",
    )
    .bind(title)
    .bind(author)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Find the book with this exact (title, author) pair, case-insensitively.
/// NULL authors only match NULL.
pub async fn find_book_by_title_and_author(
    pool: &SqlitePool,
    title: &str,
    author: Option<&str>,
) -> sqlx::Result<Option<Book>> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE title = ?1 COLLATE NOCASE \
         AND ((?2 IS NULL AND author IS NULL) OR author = ?2 COLLATE NOCASE)"
    ))
    .bind(title)
    .bind(author)
    .fetch_optional(pool)
    .await
}

/// Fields for a new or updated book record.
///
/// Identity (`id`) is assigned by the database on insert.
#[derive(Debug, Clone, Default)]
pub struct BookRecord {
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i64>,
    pub publisher: Option<String>,
    pub page_count: Option<i64>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub category_id: Option<i64>,
    pub average_rating: Option<f64>,
    pub rating_count: Option<i64>,
}

/// Insert a new book and return it with its assigned ID.
pub async fn insert_book(pool: &SqlitePool, record: &BookRecord) -> sqlx::Result<Book> {
    sqlx::query_as::<_, Book>(&format!(
        r#"
        INSERT INTO books (title, author, isbn, publication_year, publisher, page_count,
                           description, cover_url, category_id, average_rating, rating_count)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {BOOK_COLUMNS}
        "#
    ))
    .bind(&record.title)
    .bind(&record.author)
    .bind(&record.isbn)
    .bind(record.publication_year)
    .bind(&record.publisher)
    .bind(record.page_count)
    .bind(&record.description)
    .bind(&record.cover_url)
    .bind(record.category_id)
    .bind(record.average_rating)
    .bind(record.rating_count)
    .fetch_one(pool)
    .await
}

/// Update every field of an existing book.
pub async fn update_book(pool: &SqlitePool, book: &Book) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE books SET title = ?, author = ?, isbn = ?, publication_year = ?, publisher = ?,
                         page_count = ?, description = ?, cover_url = ?, category_id = ?,
                         average_rating = ?, rating_count = ?
        WHERE id = ?
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.isbn)
    .bind(book.publication_year)
    .bind(&book.publisher)
    .bind(book.page_count)
    .bind(&book.description)
    .bind(&book.cover_url)
    .bind(book.category_id)
    .bind(book.average_rating)
    .bind(book.rating_count)
    .bind(book.id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Get all books, ordered by title.
pub async fn get_all_books(pool: &SqlitePool) -> sqlx::Result<Vec<Book>> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books ORDER BY title COLLATE NOCASE"
    ))
    .fetch_all(pool)
    .await
}

/// Get a book by its database ID.
pub async fn get_book_by_id(pool: &SqlitePool, book_id: i64) -> sqlx::Result<Option<Book>> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"
    ))
    .bind(book_id)
    .fetch_optional(pool)
    .await
}

/// Find a category by name, case-insensitively.
pub async fn find_category_by_name(
    pool: &SqlitePool,
    name: &str,
) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, slug FROM categories WHERE name = ? COLLATE NOCASE",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Get a category by its database ID.
pub async fn get_category_by_id(
    pool: &SqlitePool,
    category_id: i64,
) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await
}

/// Check whether a category slug is already taken.
pub async fn category_slug_exists(pool: &SqlitePool, slug: &str) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Insert a new category and return it with its assigned ID.
///
/// Fails with a database error on name or slug collision; the enrichment
/// flow treats that as a concurrent-creation race and re-queries.
pub async fn insert_category(pool: &SqlitePool, name: &str, slug: &str) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, slug) VALUES (?, ?) RETURNING id, name, slug",
    )
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_db;

    fn record(title: &str, author: Option<&str>, isbn: Option<&str>) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            author: author.map(String::from),
            isbn: isbn.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_init_db_creates_database() {
        let (pool, _dir) = temp_db().await;
        let books = get_all_books(&pool).await.expect("Failed to query books");
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_find_by_isbn() {
        let (pool, _dir) = temp_db().await;

        let book = insert_book(
            &pool,
            &record("The Hobbit", Some("J.R.R. Tolkien"), Some("9780261103344")),
        )
        .await
        .unwrap();
        assert!(book.id > 0);

        let found = find_book_by_isbn(&pool, "9780261103344").await.unwrap();
        assert_eq!(found.unwrap().title, "The Hobbit");

        let missing = find_book_by_isbn(&pool, "9999999999999").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_isbn_unique_constraint() {
        let (pool, _dir) = temp_db().await;

        insert_book(&pool, &record("One", Some("A"), Some("9780261103344")))
            .await
            .unwrap();
        let dup = insert_book(&pool, &record("Two", Some("B"), Some("9780261103344"))).await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn test_title_author_unique_constraint() {
        let (pool, _dir) = temp_db().await;

        insert_book(&pool, &record("Legacy", Some("Someone"), None))
            .await
            .unwrap();
        let dup = insert_book(&pool, &record("Legacy", Some("Someone"), None)).await;
        assert!(dup.is_err());

        // Same title by a different author is a different book.
        insert_book(&pool, &record("Legacy", Some("Someone Else"), None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_exists_by_title_and_author_case_insensitive() {
        let (pool, _dir) = temp_db().await;

        insert_book(&pool, &record("The Hobbit", Some("J.R.R. Tolkien"), None))
            .await
            .unwrap();

        assert!(
            exists_by_title_and_author(&pool, "the hobbit", Some("j.r.r. tolkien"))
                .await
                .unwrap()
        );
        assert!(
            !exists_by_title_and_author(&pool, "The Hobbit", Some("Someone Else"))
                .await
                .unwrap()
        );
        assert!(
            !exists_by_title_and_author(&pool, "The Hobbit", None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_find_books_by_title_substring() {
        let (pool, _dir) = temp_db().await;

        insert_book(&pool, &record("The Fellowship of the Ring", Some("Tolkien"), None))
            .await
            .unwrap();
        insert_book(&pool, &record("The Two Towers", Some("Tolkien"), None))
            .await
            .unwrap();

        let hits = find_books_by_title(&pool, "fellowship").await.unwrap();
        assert_eq!(hits.len(), 1);

        let author_hits = find_books_by_author(&pool, "tolkien").await.unwrap();
        assert_eq!(author_hits.len(), 2);
    }

    #[tokio::test]
    async fn test_update_book() {
        let (pool, _dir) = temp_db().await;

        let mut book = insert_book(&pool, &record("Dune", Some("Frank Herbert"), None))
            .await
            .unwrap();

        book.publication_year = Some(1965);
        book.publisher = Some("Chilton Books".to_string());
        update_book(&pool, &book).await.unwrap();

        let reloaded = get_book_by_id(&pool, book.id).await.unwrap().unwrap();
        assert_eq!(reloaded.publication_year, Some(1965));
        assert_eq!(reloaded.publisher.as_deref(), Some("Chilton Books"));
    }

    #[tokio::test]
    async fn test_category_roundtrip() {
        let (pool, _dir) = temp_db().await;

        let cat = insert_category(&pool, "Science Fiction", "science-fiction")
            .await
            .unwrap();
        assert!(cat.id > 0);

        // Case-insensitive name lookup
        let found = find_category_by_name(&pool, "SCIENCE FICTION")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, cat.id);

        assert!(category_slug_exists(&pool, "science-fiction").await.unwrap());
        assert!(!category_slug_exists(&pool, "fantasy").await.unwrap());

        // Name collision (case-insensitive) rejected by the database
        let dup = insert_category(&pool, "science fiction", "science-fiction-1").await;
        assert!(dup.is_err());
    }
}
