//! The book catalog: entity, request validation, persistence and HTTP handlers.

pub mod handlers;
pub mod models;
pub mod request;
pub mod seed;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};

pub use handlers::App;
pub use models::{Book, BooksResponse};
pub use request::{validate_full_book_request, FullBookRequest, ValidationErrors};
pub use store::{BookStore, StoreError};

/// Books module: owns the `books` table and the `/books` routes
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        let store = BookStore::with_timeout(ctx.db.clone(), ctx.settings.database.query_timeout());
        handlers::router(App::new(store))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![seed::CREATE_BOOKS]
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.database.seed_demo_data {
            seed::seed_if_empty(ctx.db).await?;
        }
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
