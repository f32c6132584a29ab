//! REST endpoint handlers organized by resource.

pub mod chat;
pub mod me;
pub mod notifications;
pub mod reports;
pub mod rewards;
pub mod system;
pub mod webhooks;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(reports::routes())
        .merge(me::routes())
        .merge(notifications::routes())
        .merge(rewards::routes())
}

/// Routes mounted at the root level: health, chat and webhooks.
pub fn root_routes() -> Router<AppState> {
    Router::new()
        .merge(system::routes())
        .merge(chat::routes())
        .merge(webhooks::routes())
}
