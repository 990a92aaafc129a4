use crate::DbError;
use core_types::{Author, Book, CatalogEntry, NewAuthor, NewBook, SortBy};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use tracing::instrument;

/// Columns of a catalog row: the book plus its author's name.
const CATALOG_SELECT: &str = r#"
    SELECT b.id, b.isbn, b.title, b.publication_year, b.author_id, a.name AS author_name
    FROM books AS b
    JOIN authors AS a ON a.id = b.author_id
"#;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

// A book joined with the name of its author.
#[derive(FromRow)]
struct CatalogRow {
    #[sqlx(flatten)]
    book: Book,
    author_name: String,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        CatalogEntry::new(row.book, row.author_name)
    }
}

/// The outcome of a successful delete-book operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedBook {
    pub book: Book,
    /// `true` when the book was its author's last one and the author was
    /// removed in the same transaction.
    pub author_removed: bool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Authors
    // =========================================================================

    /// Persists a new author and returns it with its assigned id.
    #[instrument(skip_all, fields(name = %author.name))]
    pub async fn create_author(&self, author: &NewAuthor) -> Result<Author, DbError> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, birth_date, date_of_death)
            VALUES (?, ?, ?)
            RETURNING id, name, birth_date, date_of_death
            "#,
        )
        .bind(&author.name)
        .bind(author.birth_date)
        .bind(author.date_of_death)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::classify)?;
        tx.commit().await?;

        tracing::info!(author_id = created.id, "Author created.");
        Ok(created)
    }

    /// Fetches every author, ordered by name for selection lists.
    pub async fn get_all_authors(&self) -> Result<Vec<Author>, DbError> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, birth_date, date_of_death FROM authors ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    /// Fetches a single author by id.
    pub async fn get_author(&self, author_id: i64) -> Result<Author, DbError> {
        sqlx::query_as::<_, Author>(
            "SELECT id, name, birth_date, date_of_death FROM authors WHERE id = ?",
        )
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Persists a new book.
    ///
    /// Fails with [`DbError::UniqueViolation`] when the ISBN is already taken
    /// and with [`DbError::ForeignKeyViolation`] when the author does not exist.
    /// Nothing is written in either case.
    #[instrument(skip_all, fields(isbn = %book.isbn, author_id = book.author_id))]
    pub async fn create_book(&self, book: &NewBook) -> Result<Book, DbError> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, publication_year, author_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, isbn, title, publication_year, author_id
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(book.publication_year)
        .bind(book.author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::classify)?;
        tx.commit().await?;

        tracing::info!(book_id = created.id, "Book created.");
        Ok(created)
    }

    /// Fetches a single book by id.
    pub async fn get_book(&self, book_id: i64) -> Result<Book, DbError> {
        sqlx::query_as::<_, Book>(
            "SELECT id, isbn, title, publication_year, author_id FROM books WHERE id = ?",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    pub async fn count_books(&self) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a book and, when it was the last book of its author, the author
    /// as well. Both deletions commit together or not at all.
    ///
    /// Returns [`DbError::NotFound`] without modifying anything when no book
    /// has the given id.
    #[instrument(skip(self))]
    pub async fn delete_book(&self, book_id: i64) -> Result<DeletedBook, DbError> {
        // Dropping `tx` on an early return rolls back.
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT id, isbn, title, publication_year, author_id FROM books WHERE id = ?",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book.id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::classify)?;

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(book.author_id)
            .fetch_one(&mut *tx)
            .await?;

        let author_removed = remaining == 0;
        if author_removed {
            sqlx::query("DELETE FROM authors WHERE id = ?")
                .bind(book.author_id)
                .execute(&mut *tx)
                .await
                .map_err(DbError::classify)?;
        }

        tx.commit().await?;

        tracing::info!(author_id = book.author_id, author_removed, "Book deleted.");
        Ok(DeletedBook { book, author_removed })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetches every book with its author's name, ordered by title or by
    /// author name.
    pub async fn get_catalog(&self, sort_by: SortBy) -> Result<Vec<CatalogEntry>, DbError> {
        let order = match sort_by {
            SortBy::Title => "ORDER BY b.title ASC, b.id ASC",
            SortBy::Author => "ORDER BY a.name ASC, b.title ASC, b.id ASC",
        };
        let rows = sqlx::query_as::<_, CatalogRow>(&format!("{CATALOG_SELECT} {order}"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    /// Fetches every book whose title or author name contains `query`,
    /// ignoring case. Results come back in storage order.
    ///
    /// SQLite's `LIKE` folds ASCII letters only, so the filter runs on the
    /// fetched rows.
    #[instrument(skip(self))]
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<CatalogEntry>, DbError> {
        let needle = query.to_lowercase();
        let rows = sqlx::query_as::<_, CatalogRow>(&format!("{CATALOG_SELECT} ORDER BY b.id ASC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter(|row| {
                row.book.title.to_lowercase().contains(&needle)
                    || row.author_name.to_lowercase().contains(&needle)
            })
            .map(CatalogEntry::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;
    use rstest::rstest;

    async fn repo() -> DbRepository {
        DbRepository::new(connect_in_memory().await.unwrap())
    }

    async fn author(repo: &DbRepository, name: &str) -> Author {
        let new = NewAuthor::parse(name, "1900-01-01", "").unwrap();
        repo.create_author(&new).await.unwrap()
    }

    async fn book(repo: &DbRepository, title: &str, isbn: &str, author: &Author) -> Book {
        let new = NewBook::parse(title, isbn, "1950", &author.id.to_string()).unwrap();
        repo.create_book(&new).await.unwrap()
    }

    fn titles(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[tokio::test]
    async fn creates_author_with_submitted_fields() {
        let repo = repo().await;
        let new = NewAuthor::parse("Jane Austen", "1775-12-16", "1817-07-18").unwrap();
        let created = repo.create_author(&new).await.unwrap();

        let authors = repo.get_all_authors().await.unwrap();
        assert_eq!(authors, vec![created.clone()]);
        assert_eq!(created.name, new.name);
        assert_eq!(created.birth_date, new.birth_date);
        assert_eq!(created.date_of_death, new.date_of_death);
        assert_eq!(repo.get_author(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn author_ids_increase() {
        let repo = repo().await;
        let first = author(&repo, "A").await;
        let second = author(&repo, "A").await;
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected_and_rolled_back() {
        let repo = repo().await;
        let jane = author(&repo, "Jane Austen").await;
        book(&repo, "Pride and Prejudice", "9780141439518", &jane).await;

        let duplicate = NewBook::parse("Emma", "9780141439518", "1815", &jane.id.to_string()).unwrap();
        let err = repo.create_book(&duplicate).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)), "got {err:?}");
        assert_eq!(repo.count_books().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_author_is_rejected() {
        let repo = repo().await;
        let orphan = NewBook::parse("Emma", "9780141439587", "1815", "42").unwrap();
        let err = repo.create_book(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation(_)), "got {err:?}");
        assert_eq!(repo.count_books().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_last_book_removes_author() {
        let repo = repo().await;
        let jane = author(&repo, "Jane Austen").await;
        let pride = book(&repo, "Pride and Prejudice", "9780141439518", &jane).await;

        let deleted = repo.delete_book(pride.id).await.unwrap();
        assert_eq!(deleted, DeletedBook { book: pride, author_removed: true });
        assert_eq!(repo.count_books().await.unwrap(), 0);
        assert!(matches!(repo.get_author(jane.id).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn deleting_one_of_several_books_keeps_author() {
        let repo = repo().await;
        let jane = author(&repo, "Jane Austen").await;
        let pride = book(&repo, "Pride and Prejudice", "9780141439518", &jane).await;
        let emma = book(&repo, "Emma", "9780141439587", &jane).await;

        let deleted = repo.delete_book(pride.id).await.unwrap();
        assert!(!deleted.author_removed);
        assert_eq!(repo.get_author(jane.id).await.unwrap(), jane);
        assert_eq!(repo.get_book(emma.id).await.unwrap(), emma);
        assert!(matches!(repo.get_book(pride.id).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn deleting_missing_book_changes_nothing() {
        let repo = repo().await;
        let jane = author(&repo, "Jane Austen").await;
        book(&repo, "Pride and Prejudice", "9780141439518", &jane).await;

        let err = repo.delete_book(999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound), "got {err:?}");
        assert_eq!(repo.count_books().await.unwrap(), 1);
        assert_eq!(repo.get_all_authors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn catalog_sorts_by_title_or_author() {
        let repo = repo().await;
        let austen = author(&repo, "Jane Austen").await;
        let bronte = author(&repo, "Charlotte Bronte").await;
        book(&repo, "Persuasion", "1", &austen).await;
        book(&repo, "Jane Eyre", "2", &bronte).await;
        book(&repo, "Emma", "3", &austen).await;

        let by_title = repo.get_catalog(SortBy::Title).await.unwrap();
        assert_eq!(titles(&by_title), vec!["Emma", "Jane Eyre", "Persuasion"]);

        let by_author = repo.get_catalog(SortBy::Author).await.unwrap();
        assert_eq!(titles(&by_author), vec!["Jane Eyre", "Emma", "Persuasion"]);
        assert_eq!(by_author[0].author_name, "Charlotte Bronte");
    }

    #[tokio::test]
    async fn search_matches_author_name_and_title() {
        let repo = repo().await;
        let austen = author(&repo, "Jane Austen").await;
        let bronte = author(&repo, "Charlotte Bronte").await;
        book(&repo, "Pride and Prejudice", "978-0141439518", &austen).await;
        book(&repo, "Jane Eyre", "2", &bronte).await;
        book(&repo, "Emma", "3", &austen).await;

        let by_author = repo.search_catalog("austen").await.unwrap();
        assert_eq!(titles(&by_author), vec!["Pride and Prejudice", "Emma"]);
        assert_eq!(by_author[0].clean_isbn, "9780141439518");

        // "Jane" is in one author's name and another book's title.
        let both = repo.search_catalog("JANE").await.unwrap();
        assert_eq!(titles(&both), vec!["Pride and Prejudice", "Jane Eyre", "Emma"]);

        assert!(repo.search_catalog("Tolstoy").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let repo = repo().await;
        let author = author(&repo, "Anon").await;
        book(&repo, "100% Cotton", "1", &author).await;
        book(&repo, "Plain", "2", &author).await;

        assert_eq!(titles(&repo.search_catalog("%").await.unwrap()), vec!["100% Cotton"]);
        assert!(repo.search_catalog("_").await.unwrap().is_empty());
    }

    #[rstest]
    #[case("émile")]
    #[case("ÉMILE ZOLA")]
    #[case("germinal")]
    #[case("MISÉRABLES")]
    #[tokio::test]
    async fn search_folds_non_ascii_case(#[case] query: &str) {
        let repo = repo().await;
        let zola = author(&repo, "Émile Zola").await;
        let hugo = author(&repo, "Victor Hugo").await;
        book(&repo, "Germinal", "1", &zola).await;
        book(&repo, "Les Misérables", "2", &hugo).await;

        let found = repo.search_catalog(query).await.unwrap();
        assert_eq!(found.len(), 1, "{query}");
    }

    #[tokio::test]
    async fn failed_author_cleanup_rolls_back_book_delete() {
        let repo = repo().await;
        let jane = author(&repo, "Jane Austen").await;
        let pride = book(&repo, "Pride and Prejudice", "9780141439518", &jane).await;
        sqlx::query(
            "CREATE TRIGGER authors_are_permanent BEFORE DELETE ON authors \
             BEGIN SELECT RAISE(ABORT, 'authors are permanent'); END",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let err = repo.delete_book(pride.id).await.unwrap_err();
        assert!(matches!(err, DbError::QueryError(_)), "got {err:?}");
        assert_eq!(repo.get_book(pride.id).await.unwrap(), pride);
        assert_eq!(repo.get_author(jane.id).await.unwrap(), jane);
    }
}
