//! Album service binary

use anyhow::Context;

use album_service::api::{create_router, AppState};
use album_service::config::AppConfig;
use album_service::storage::create_store;
use album_service::{profiler, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    let telemetry = telemetry::init_tracing(&config)?;

    profiler::start(&config.profiling, &config.telemetry)
        .context("failed to start profiler")?;

    let store_config = config
        .store_config()
        .context("invalid database configuration")?;

    let store = create_store(store_config)
        .await
        .context("failed to open album store")?;
    tracing::info!("Connected!");

    let router = create_router(AppState::new(store.clone()));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    tracing::info!(%addr, "Listening for HTTP traffic");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(flush_traces = telemetry.is_exporting(), "Shutting down");
    store.close().await;
    telemetry.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
