//! SQLite connection pool factory and migration runner.
//!
//! SQLite permits one writer at a time, so every pool holds exactly one
//! connection that is never recycled by age or idleness. That also keeps an
//! in-memory database alive for the whole lifetime of the pool.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Connection, SqlitePool};

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;

/// Fixed pool size; not configurable.
pub const MAX_CONNECTIONS: u32 = 1;

/// Open the pool described by `settings` and verify it answers a ping.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true)
        .busy_timeout(settings.busy_timeout());

    tracing::info!(
        target: "bookshelf-db",
        url = %settings.url,
        max_connections = MAX_CONNECTIONS,
        "opening database"
    );

    let pool = pool_options(settings.query_timeout())
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database '{}'", settings.url))?;

    if let Err(err) = ping(&pool, settings.query_timeout()).await {
        pool.close().await;
        return Err(err);
    }

    Ok(pool)
}

/// Single-connection in-memory database, used by tests and throwaway runs.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let settings = DatabaseSettings::default();
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .context("invalid in-memory database url")?
        .busy_timeout(settings.busy_timeout());

    pool_options(settings.query_timeout())
        .connect_with(options)
        .await
        .context("failed to open in-memory database")
}

fn pool_options(acquire_timeout: Duration) -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(MAX_CONNECTIONS)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
}

/// Acquire a connection and ping it, bounded by `timeout`.
pub async fn ping(pool: &SqlitePool, timeout: Duration) -> anyhow::Result<()> {
    tokio::time::timeout(timeout, async {
        let mut conn = pool.acquire().await?;
        conn.ping().await?;
        Ok::<_, sqlx::Error>(())
    })
    .await
    .map_err(|_| anyhow!("database ping timed out after {:?}", timeout))?
    .context("database ping failed")
}

/// Execute module migrations in the given order.
///
/// Every statement must be idempotent (`CREATE ... IF NOT EXISTS`); they run
/// on each startup and no ledger of applied ids is kept.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<()> {
    for (module, migration) in migrations {
        tracing::info!(
            target: "bookshelf-db",
            module = %module,
            migration = migration.id,
            "applying migration"
        );

        sqlx::raw_sql(migration.up)
            .execute(pool)
            .await
            .with_context(|| format!("migration '{}/{}' failed", module, migration.id))?;
    }

    Ok(())
}
