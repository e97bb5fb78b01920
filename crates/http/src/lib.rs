//! HTTP server facade for bookshelf with Axum, error mapping, and a uniform JSON writer.

use anyhow::Context;
use axum::{http::StatusCode, response::Response, routing::get, Router};
use serde::Serialize;

use bookshelf_kernel::{InitCtx, ModuleRegistry};

pub mod error;
pub mod response;
pub mod router;

use response::write_json;
use router::RouterBuilder;

/// Service version reported by `/healthz`
pub const VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Start the HTTP server and serve until `shutdown` resolves
pub async fn start_server<F>(
    registry: &ModuleRegistry,
    ctx: &InitCtx<'_>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let address = ctx.settings.server.bind_address();

    // Build the main router
    let app = build_router(registry, ctx);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to address {}", address))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(module = module.name(), "mounting module routes");
        router_builder = router_builder.mount_module(module.routes(ctx));
    }

    router_builder
        .with_tracing()
        .with_request_id()
        .with_timeout(ctx.settings.server.request_timeout_ms)
        .build()
}

/// Health check endpoint
async fn health_check() -> Response {
    write_json(
        StatusCode::OK,
        &HealthResponse {
            status: "ok",
            version: VERSION,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bookshelf_kernel::settings::Settings;
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_reports_status_and_version() {
        let settings = Settings::default();
        let pool = sqlx::SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &pool,
        };
        let router = build_router(&ModuleRegistry::new(), &ctx);

        let response = router
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok","version":"1.0.0"}"#);
    }

    #[tokio::test]
    async fn unknown_route_and_method_use_axum_defaults() {
        let settings = Settings::default();
        let pool = sqlx::SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &pool,
        };
        let router = build_router(&ModuleRegistry::new(), &ctx);

        let missing = router
            .clone()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let wrong_method = router
            .oneshot(Request::post("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
