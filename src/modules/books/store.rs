//! All SQL touching the `books` table.

use std::future::Future;
use std::time::Duration;

use sqlx::SqlitePool;
use thiserror::Error;

use super::models::{Book, BookRow};

const SELECT_ALL: &str = "SELECT id, title, author, year FROM books ORDER BY id";
const SELECT_ONE: &str = "SELECT id, title, author, year FROM books WHERE id = ?";
const INSERT: &str = "INSERT INTO books (title, author, year) VALUES (?, ?, ?)";
const UPDATE: &str = "UPDATE books SET title = ?, author = ?, year = ? WHERE id = ?";

/// Default per-call deadline.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matches the requested id
    #[error("no such book")]
    NotFound,

    #[error("query exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Data access for books over the shared single-connection pool.
#[derive(Debug, Clone)]
pub struct BookStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every book, ascending by id.
    pub async fn get_all(&self) -> StoreResult<Vec<Book>> {
        let rows = self
            .deadline(sqlx::query_as::<_, BookRow>(SELECT_ALL).fetch_all(&self.pool))
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Ids below 1 can never exist and are rejected without a query.
    pub async fn get(&self, id: i64) -> StoreResult<Book> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        self.deadline(
            sqlx::query_as::<_, BookRow>(SELECT_ONE)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .map(Book::from)
        .ok_or(StoreError::NotFound)
    }

    /// Persist `book` and return it carrying the assigned id; the input id is ignored.
    pub async fn insert(&self, book: Book) -> StoreResult<Book> {
        let result = self
            .deadline(
                sqlx::query(INSERT)
                    .bind(&book.title)
                    .bind(&book.author)
                    .bind(book.year)
                    .execute(&self.pool),
            )
            .await?;

        let inserted = Book {
            id: result.last_insert_rowid(),
            ..book
        };
        tracing::info!(book_id = inserted.id, title = %inserted.title, "inserted book");

        Ok(inserted)
    }

    /// Overwrite title, author and year of the row `book.id`, then re-read it.
    ///
    /// Zero affected rows means the id does not exist.
    pub async fn update(&self, book: Book) -> StoreResult<Book> {
        let result = self
            .deadline(
                sqlx::query(UPDATE)
                    .bind(&book.title)
                    .bind(&book.author)
                    .bind(book.year)
                    .bind(book.id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::info!(book_id = book.id, "updated book");

        self.get(book.id).await
    }

    async fn deadline<T, F>(&self, query: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(StoreError::from)
    }
}
