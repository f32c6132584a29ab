//! Identity-provider webhook receivers.
//!
//! Both endpoints read the raw body, check the Svix signature headers and
//! only then decode the JSON payload.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, GreenifyError};
use crate::webhook::{
    SignatureHeaders, UserEvent, WebhookEnvelope, WebhookVerifier, session_active,
};

/// Acknowledgement for a processed user event.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    message: &'static str,
}

fn verified_envelope(
    verifier: Option<&WebhookVerifier>,
    secret_name: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<WebhookEnvelope, GreenifyError> {
    let signature = SignatureHeaders::from_headers(headers)?;
    let verifier = verifier
        .ok_or_else(|| GreenifyError::Internal(format!("{secret_name} is not configured")))?;
    verifier.verify(&signature, body)?;
    WebhookEnvelope::parse(body)
}

/// `POST /api/webhooks/user` — Mirror a user event.
///
/// # Errors
///
/// Returns 400 for missing signature headers or a malformed payload and
/// 401 for a bad signature.
#[utoipa::path(
    post,
    path = "/api/webhooks/user",
    tag = "Webhooks",
    summary = "User webhook",
    description = "Handles `user.created`, `user.updated` and `user.deleted` events signed with the user webhook secret.",
    request_body(content = serde_json::Value, content_type = "application/json"),
    responses(
        (status = 200, description = "Event processed", body = WebhookAck),
        (status = 400, description = "Missing headers or bad payload", body = ErrorResponse),
        (status = 401, description = "Invalid signature", body = ErrorResponse),
    )
)]
pub async fn user_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, GreenifyError> {
    let envelope = verified_envelope(
        state.webhooks.user.as_ref(),
        "CLERK_WEBHOOK_SECRET_USER",
        &headers,
        &body,
    )?;
    let event = UserEvent::from_envelope(envelope)?;
    state.user_service.apply(event).await?;
    Ok(Json(WebhookAck {
        message: "Webhook received",
    }))
}

/// `POST /api/webhooks/session` — Session validity flag.
///
/// # Errors
///
/// Returns 400 for missing signature headers or a payload without `type`
/// or `data`, and 401 for a bad signature.
#[utoipa::path(
    post,
    path = "/api/webhooks/session",
    tag = "Webhooks",
    summary = "Session webhook",
    description = "Responds `true` for `session.created` and `false` for `session.ended` or any other event.",
    request_body(content = serde_json::Value, content_type = "application/json"),
    responses(
        (status = 200, description = "Session flag", body = bool),
        (status = 400, description = "Missing headers or bad payload", body = ErrorResponse),
        (status = 401, description = "Invalid signature", body = ErrorResponse),
    )
)]
pub async fn session_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, GreenifyError> {
    let envelope = verified_envelope(
        state.webhooks.session.as_ref(),
        "CLERK_WEBHOOK_SECRET_SESSION",
        &headers,
        &body,
    )?;
    let active = session_active(envelope)?;
    tracing::debug!(active, "session webhook");
    Ok(Json(active))
}

/// Webhook routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/webhooks/user", post(user_webhook))
        .route("/api/webhooks/session", post(session_webhook))
}
