//! Schema and demo data for the `books` table.

use anyhow::Context;
use bookshelf_kernel::Migration;
use sqlx::SqlitePool;

pub const CREATE_BOOKS: Migration = Migration {
    id: "001_create_books",
    up: r#"
CREATE TABLE IF NOT EXISTS books (
  id     INTEGER PRIMARY KEY AUTOINCREMENT,
  title  TEXT NOT NULL,
  author TEXT,
  year   INTEGER
);"#,
};

const DEMO_BOOKS: [(&str, &str, i64); 2] = [
    ("The Go Programming Language", "Alan Donovan", 2015),
    (
        "Designing Data-Intensive Applications",
        "Martin Kleppmann",
        2017,
    ),
];

/// Insert the demo rows when the table holds nothing; returns how many were added.
pub async fn seed_if_empty(pool: &SqlitePool) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await.context("failed to begin seed transaction")?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&mut *tx)
        .await
        .context("failed to count books")?;

    if count > 0 {
        tracing::debug!(existing = count, "books table already populated, skipping seed");
        return Ok(0);
    }

    for (title, author, year) in DEMO_BOOKS {
        sqlx::query("INSERT INTO books (title, author, year) VALUES (?, ?, ?)")
            .bind(title)
            .bind(author)
            .bind(year)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed '{}'", title))?;
    }

    tx.commit().await.context("failed to commit seed")?;

    tracing::info!(rows = DEMO_BOOKS.len(), "seeded demo books");
    Ok(DEMO_BOOKS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn migrated_pool() -> SqlitePool {
        let pool = bookshelf_db::connect_in_memory().await.unwrap();
        bookshelf_db::run_migrations(&pool, &[("books".to_string(), CREATE_BOOKS)])
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn seeds_once() {
        let pool = migrated_pool().await;

        assert_eq!(seed_if_empty(&pool).await.unwrap(), 2);
        assert_eq!(seed_if_empty(&pool).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn leaves_populated_table_alone() {
        let pool = migrated_pool().await;
        sqlx::query("INSERT INTO books (title, author, year) VALUES ('Mine', 'Me', 2020)")
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(seed_if_empty(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fails_without_schema() {
        let pool = bookshelf_db::connect_in_memory().await.unwrap();
        assert!(seed_if_empty(&pool).await.is_err());
    }

    #[tokio::test]
    async fn schema_rejects_null_title() {
        let pool = migrated_pool().await;
        let result = sqlx::query("INSERT INTO books (title, author, year) VALUES (NULL, 'x', 1)")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
