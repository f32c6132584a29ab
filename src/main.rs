//! greenify-server entry point.
//!
//! Starts the Axum HTTP server with REST, webhook and WebSocket endpoints.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use greenify_server::ai::{GeminiClient, VisionModel};
use greenify_server::api;
use greenify_server::app_state::AppState;
use greenify_server::config::{GreenifyConfig, LogFormat};
use greenify_server::persistence::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GreenifyConfig::from_env().map_err(|e| anyhow::anyhow!("config: {e}"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting greenify-server");

    let (store, store_kind): (Arc<dyn Store>, &'static str) = if config.persistence_enabled {
        let store = PgStore::connect(&config).await?;
        tracing::info!("connected to postgres, migrations applied");
        (Arc::new(store), "postgres")
    } else {
        tracing::warn!("persistence disabled, state is kept in memory only");
        (Arc::new(MemoryStore::new()), "memory")
    };

    let model: Arc<dyn VisionModel> = Arc::new(GeminiClient::from_config(&config)?);
    let state = AppState::new(&config, store, model, store_kind)?;
    if state.webhooks.user.is_none() || state.webhooks.session.is_none() {
        tracing::warn!("a webhook secret is not configured; that endpoint will answer 500");
    }

    let app = api::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
