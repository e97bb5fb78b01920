//! Bookshelf application library
//!
//! Application modules plus the startup sequence shared by the binary and
//! the end-to-end tests.

pub mod modules;

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

/// Registry with every application module registered
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Run module init, migrations and start hooks against `pool`
pub async fn prepare(
    registry: &ModuleRegistry,
    settings: &Settings,
    pool: &SqlitePool,
) -> anyhow::Result<()> {
    let ctx = InitCtx {
        settings,
        db: pool,
    };

    registry.init_all(&ctx).await?;
    bookshelf_db::run_migrations(pool, &registry.collect_migrations())
        .await
        .context("failed to migrate database")?;
    registry.start_all(&ctx).await?;

    Ok(())
}

/// Fully prepared router over `pool`, as the server would serve it
pub async fn build_app(settings: &Settings, pool: &SqlitePool) -> anyhow::Result<Router> {
    let registry = registry();
    prepare(&registry, settings, pool).await?;

    let ctx = InitCtx {
        settings,
        db: pool,
    };
    Ok(bookshelf_http::build_router(&registry, &ctx))
}
