//! Help chat handler.

use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ChatRequest, ChatResponse};
use crate::app_state::AppState;
use crate::service::chat;

/// `POST /api/chat` — Keyword-matched waste management tips.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    summary = "Chat with the help assistant",
    description = "Answers with a canned tip picked by keyword (recycling, composting, hazardous waste or general).",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
    )
)]
pub async fn chat_handler(Json(req): Json<ChatRequest>) -> impl IntoResponse {
    Json(ChatResponse {
        role: "assistant",
        content: chat::reply(&req.message, req.image_url.as_deref()),
    })
}

/// Chat route mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat_handler))
}
