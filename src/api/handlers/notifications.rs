//! Notification inbox handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LimitParams, MarkAllReadResponse, NotificationParams};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::domain::{Notification, NotificationId};
use crate::error::{ErrorResponse, GreenifyError};

/// `GET /me/notifications` — Newest first.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/me/notifications",
    tag = "Notifications",
    summary = "List notifications",
    params(NotificationParams),
    responses(
        (status = 200, description = "Notifications", body = Vec<Notification>),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(params): Query<NotificationParams>,
) -> Result<impl IntoResponse, GreenifyError> {
    let limit = LimitParams {
        limit: params.limit.unwrap_or(20),
    }
    .clamped();
    let notifications = state
        .notification_service
        .list(&caller, params.unread_only, limit)
        .await?;
    Ok(Json(notifications))
}

/// `POST /me/notifications/{id}/read` — Acknowledge one notification.
///
/// # Errors
///
/// Returns [`GreenifyError::NotificationNotFound`] if the caller has no
/// such notification.
#[utoipa::path(
    post,
    path = "/api/v1/me/notifications/{id}/read",
    tag = "Notifications",
    summary = "Mark notification read",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GreenifyError> {
    state
        .notification_service
        .mark_read(&caller, NotificationId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /me/notifications/read-all` — Acknowledge everything.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    post,
    path = "/api/v1/me/notifications/read-all",
    tag = "Notifications",
    summary = "Mark all notifications read",
    responses(
        (status = 200, description = "Number updated", body = MarkAllReadResponse),
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse, GreenifyError> {
    let updated = state.notification_service.mark_all_read(&caller).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

/// Notification routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/notifications", get(list_notifications))
        .route("/me/notifications/read-all", post(mark_all_read))
        .route("/me/notifications/{id}/read", post(mark_read))
}
