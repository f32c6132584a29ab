//! Reward catalog, redemption and leaderboard handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LimitParams, RedeemRequest};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::domain::{CatalogItem, LeaderboardEntry};
use crate::error::{ErrorResponse, GreenifyError};
use crate::service::Redemption;

/// `GET /rewards/catalog` — Redeemable rewards.
#[utoipa::path(
    get,
    path = "/api/v1/rewards/catalog",
    tag = "Rewards",
    summary = "Reward catalog",
    responses(
        (status = 200, description = "Catalog", body = Vec<CatalogItem>),
    )
)]
pub async fn catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.reward_service.catalog())
}

/// `POST /rewards/redeem` — Spend points.
///
/// # Errors
///
/// Returns [`GreenifyError::InsufficientPoints`] when the balance is too
/// low and [`GreenifyError::RewardNotFound`] for an unknown reward.
#[utoipa::path(
    post,
    path = "/api/v1/rewards/redeem",
    tag = "Rewards",
    summary = "Redeem a reward",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Redeemed", body = Redemption),
        (status = 404, description = "Unknown reward", body = ErrorResponse),
        (status = 422, description = "Insufficient points", body = ErrorResponse),
    )
)]
pub async fn redeem(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<RedeemRequest>,
) -> Result<impl IntoResponse, GreenifyError> {
    let redemption = state.reward_service.redeem(&caller, req.reward_id).await?;
    Ok(Json(redemption))
}

/// `GET /leaderboard` — Top users by balance.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "Rewards",
    summary = "Leaderboard",
    params(LimitParams),
    responses(
        (status = 200, description = "Users ordered by points", body = Vec<LeaderboardEntry>),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, GreenifyError> {
    let rows = state.reward_service.leaderboard(params.clamped()).await?;
    Ok(Json(rows))
}

/// Reward routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rewards/catalog", get(catalog))
        .route("/rewards/redeem", post(redeem))
        .route("/leaderboard", get(leaderboard))
}
