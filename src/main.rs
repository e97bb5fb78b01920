use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    if let Err(err) = run(settings).await {
        tracing::error!(error = ?err, "bookshelf terminated");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        version = bookshelf_http::VERSION,
        "bookshelf bootstrap starting"
    );

    let pool = bookshelf_db::connect(&settings.database).await?;

    let registry = bookshelf::registry();
    bookshelf::prepare(&registry, &settings, &pool).await?;

    tracing::info!("bookshelf bootstrap complete");

    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    let served = bookshelf_http::start_server(&registry, &ctx, shutdown_signal()).await;

    registry.stop_all().await?;
    pool.close().await;
    served
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(%e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(%e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }

    tracing::info!("shutdown signal received, draining connections");
}
