//! Health endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Service health and wiring summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` when the process answers.
    pub status: &'static str,
    /// Storage backend: `postgres` or `memory`.
    pub persistence: &'static str,
    /// Whether the user and session webhook secrets are set.
    pub webhooks: WebhookStatus,
    /// Open WebSocket feeds.
    pub live_subscribers: usize,
    /// Crate version.
    pub version: &'static str,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Which webhook endpoints can verify signatures.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookStatus {
    /// `CLERK_WEBHOOK_SECRET_USER` is set.
    pub user: bool,
    /// `CLERK_WEBHOOK_SECRET_SESSION` is set.
    pub session: bool,
}

/// `GET /health` — Liveness plus storage and webhook wiring.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports the storage backend, which webhook secrets are configured and how many live feeds are open.",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        persistence: state.store_kind,
        webhooks: WebhookStatus {
            user: state.webhooks.user.is_some(),
            session: state.webhooks.session.is_some(),
        },
        // The app state holds no receiver, so every one belongs to a socket.
        live_subscribers: state.event_bus.receiver_count(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Health route, mounted at the root.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
