//! OpenAPI document and the optional Swagger UI.

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

use super::dto;
use super::handlers::{chat, me, notifications, reports, rewards, system, webhooks};

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Greenify API",
        description = "Community waste reporting with AI classification, collector claims, cleanup verification and rewards."
    ),
    paths(
        reports::analyze_report,
        reports::submit_report,
        reports::list_reports,
        reports::get_report,
        reports::claim_report,
        reports::verify_report,
        me::profile,
        me::stats,
        me::my_reports,
        me::my_rewards,
        me::my_transactions,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        rewards::catalog,
        rewards::redeem,
        rewards::leaderboard,
        chat::chat_handler,
        webhooks::user_webhook,
        webhooks::session_webhook,
        system::health_handler,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        crate::domain::Report,
        crate::domain::ReportStatus,
        crate::domain::Notification,
        crate::domain::Transaction,
        crate::domain::TransactionKind,
        crate::domain::RewardLedgerEntry,
        crate::domain::LeaderboardEntry,
        crate::domain::CatalogItem,
        crate::domain::RewardTier,
        crate::domain::User,
        crate::ai::WasteClassification,
        crate::ai::WasteDetails,
        crate::ai::CleanupJudgment,
        crate::ai::CleanupStatus,
        crate::ai::RejectionReason,
        crate::service::SubmittedReport,
        crate::service::VerificationOutcome,
        crate::service::Redemption,
        crate::service::DashboardStats,
        dto::ReportListResponse,
        dto::PaginationMeta,
        dto::RedeemRequest,
        dto::RewardHistoryResponse,
        dto::MarkAllReadResponse,
        dto::ChatRequest,
        dto::ChatResponse,
        system::HealthResponse,
        system::WebhookStatus,
        webhooks::WebhookAck,
    )),
    tags(
        (name = "Reports", description = "Report submission and the cleanup lifecycle"),
        (name = "Me", description = "Caller profile and history"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Rewards", description = "Catalog, redemption and leaderboard"),
        (name = "Chat", description = "Help assistant"),
        (name = "Webhooks", description = "Identity-provider events"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Serves `/api-docs/openapi.json` and, with the `swagger-ui` feature,
/// the Swagger UI at `/swagger-ui`.
#[cfg(feature = "swagger-ui")]
pub fn docs_router() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

/// Serves `/api-docs/openapi.json`.
#[cfg(not(feature = "swagger-ui"))]
pub fn docs_router() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/reports",
            "/api/v1/reports/{id}/claim",
            "/api/v1/reports/{id}/verify",
            "/api/webhooks/user",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
