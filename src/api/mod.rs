//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Business endpoints are mounted under `/api/v1`; health, chat and the
//! identity-provider webhooks live at the root.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ai::MAX_IMAGE_BYTES;
use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Request body limit. Leaves room above [`MAX_IMAGE_BYTES`] for the
/// multipart envelope so oversize images reach the upload validation.
pub const BODY_LIMIT_BYTES: usize = MAX_IMAGE_BYTES + 2 * 1024 * 1024;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::root_routes())
}

/// Builds the full application: REST, WebSocket, OpenAPI docs and layers.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .merge(openapi::docs_router())
        .route("/ws", get(ws_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
