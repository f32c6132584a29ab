//! Caller-scoped handlers: profile, dashboard stats, history.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{LimitParams, RewardHistoryResponse};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::domain::{Report, Transaction, User};
use crate::error::{ErrorResponse, GreenifyError};
use crate::service::DashboardStats;

/// `GET /me` — The caller's mirrored profile.
///
/// # Errors
///
/// Returns [`GreenifyError::UserNotFound`] if the caller is not mirrored.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Me",
    summary = "Current user",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Missing identity", body = ErrorResponse),
        (status = 404, description = "User not mirrored", body = ErrorResponse),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse, GreenifyError> {
    Ok(Json(state.user_service.profile(&caller).await?))
}

/// `GET /me/stats` — Dashboard counters.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/me/stats",
    tag = "Me",
    summary = "Dashboard statistics",
    description = "Points, tier, number of reports submitted and cleanups verified.",
    responses(
        (status = 200, description = "Stats", body = DashboardStats),
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse, GreenifyError> {
    Ok(Json(state.reward_service.stats(&caller).await?))
}

/// `GET /me/reports` — The caller's recent reports.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/me/reports",
    tag = "Me",
    summary = "My reports",
    params(LimitParams),
    responses(
        (status = 200, description = "Reports, newest first", body = Vec<Report>),
    )
)]
pub async fn my_reports(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, GreenifyError> {
    let reports = state
        .report_service
        .my_reports(&caller, params.clamped())
        .await?;
    Ok(Json(reports))
}

/// `GET /me/rewards` — Balance, tier and ledger.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/me/rewards",
    tag = "Me",
    summary = "My rewards",
    params(LimitParams),
    responses(
        (status = 200, description = "Reward history", body = RewardHistoryResponse),
    )
)]
pub async fn my_rewards(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, GreenifyError> {
    let summary = state.reward_service.summary(&caller).await?;
    let entries = state
        .reward_service
        .ledger(&caller, params.clamped())
        .await?;
    Ok(Json(RewardHistoryResponse {
        balance: summary.balance,
        tier: summary.tier,
        entries,
    }))
}

/// `GET /me/transactions` — Points history.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/me/transactions",
    tag = "Me",
    summary = "My transactions",
    params(LimitParams),
    responses(
        (status = 200, description = "Transactions, newest first", body = Vec<Transaction>),
    )
)]
pub async fn my_transactions(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, GreenifyError> {
    let transactions = state
        .reward_service
        .transactions(&caller, params.clamped())
        .await?;
    Ok(Json(transactions))
}

/// Caller routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile))
        .route("/me/stats", get(stats))
        .route("/me/reports", get(my_reports))
        .route("/me/rewards", get(my_rewards))
        .route("/me/transactions", get(my_transactions))
}
