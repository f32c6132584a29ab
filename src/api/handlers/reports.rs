//! Report handlers: analyze, submit, list, get, claim, verify.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::ai::WasteClassification;
use crate::api::dto::{
    AnalyzeForm, ReportListResponse, SubmitReportForm, TaskListParams, VerifyForm,
};
use crate::api::extract::{Caller, ImageForm};
use crate::app_state::AppState;
use crate::domain::{Report, ReportId};
use crate::error::{ErrorResponse, GreenifyError};
use crate::persistence::ReportQuery;
use crate::service::{SubmittedReport, VerificationOutcome};

/// `POST /reports/analyze` — Classify a photo without storing it.
///
/// # Errors
///
/// Returns [`GreenifyError`] on invalid uploads or model failures.
#[utoipa::path(
    post,
    path = "/api/v1/reports/analyze",
    tag = "Reports",
    summary = "Classify a waste photo",
    description = "Sends the photo to the vision model and returns the decoded classification. Nothing is stored.",
    request_body(content = AnalyzeForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Classification", body = WasteClassification),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 502, description = "Model failure", body = ErrorResponse),
    )
)]
pub async fn analyze_report(
    State(state): State<AppState>,
    _caller: Caller,
    multipart: Multipart,
) -> Result<impl IntoResponse, GreenifyError> {
    let image = ImageForm::read(multipart).await?.require_image()?;
    let classification = state.report_service.analyze(&image).await?;
    Ok(Json(classification))
}

/// `POST /reports` — Classify a photo and store a pending report.
///
/// # Errors
///
/// Returns [`GreenifyError`] on invalid input, model failures or when the
/// photo shows no waste.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "Reports",
    summary = "Submit a waste report",
    description = "Validates the location and photo, classifies the photo, stores the report as `pending` and credits the reporter.",
    request_body(content = SubmitReportForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report stored", body = SubmittedReport),
        (status = 400, description = "Invalid upload or location", body = ErrorResponse),
        (status = 401, description = "Missing identity", body = ErrorResponse),
        (status = 422, description = "Photo shows no waste", body = ErrorResponse),
        (status = 502, description = "Model failure", body = ErrorResponse),
    )
)]
pub async fn submit_report(
    State(state): State<AppState>,
    Caller(caller): Caller,
    multipart: Multipart,
) -> Result<impl IntoResponse, GreenifyError> {
    let mut form = ImageForm::read(multipart).await?;
    let image = form.require_image()?;
    let location = form.text("location").unwrap_or_default().to_string();

    let submitted = state
        .report_service
        .submit(&caller, &location, &image)
        .await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

/// `GET /reports` — Collection task board.
///
/// # Errors
///
/// Returns [`GreenifyError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Reports",
    summary = "List reports",
    description = "Returns reports newest first, optionally filtered by status and a location substring.",
    params(TaskListParams),
    responses(
        (status = 200, description = "Paginated reports", body = ReportListResponse),
    )
)]
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> Result<impl IntoResponse, GreenifyError> {
    let pagination = params.pagination();
    let query = ReportQuery {
        status: params.status,
        reporter: None,
        search: params.search_text(),
        offset: pagination.offset(),
        limit: pagination.per_page,
    };
    let page = state.report_service.list_tasks(&query).await?;
    Ok(Json(ReportListResponse {
        data: page.items,
        pagination: pagination.meta(page.total),
    }))
}

/// `GET /reports/{id}` — One report.
///
/// # Errors
///
/// Returns [`GreenifyError::ReportNotFound`] if it does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    tag = "Reports",
    summary = "Get a report",
    params(("id" = i64, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse),
    )
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GreenifyError> {
    let report = state.report_service.get(ReportId::new(id)).await?;
    Ok(Json(report))
}

/// `POST /reports/{id}/claim` — Take a pending report.
///
/// # Errors
///
/// Returns [`GreenifyError::ReportAlreadyClaimed`] when someone else holds it.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/claim",
    tag = "Reports",
    summary = "Claim a report",
    description = "Moves a `pending` report to `in_progress` for the caller. Only the first claim succeeds.",
    params(("id" = i64, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Claimed report", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Already claimed", body = ErrorResponse),
    )
)]
pub async fn claim_report(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GreenifyError> {
    let report = state.report_service.claim(&caller, ReportId::new(id)).await?;
    Ok(Json(report))
}

/// `POST /reports/{id}/verify` — Submit the after photo.
///
/// # Errors
///
/// Returns [`GreenifyError`] when the caller does not hold the report,
/// the upload is invalid, or the model fails.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/verify",
    tag = "Reports",
    summary = "Verify a cleanup",
    description = "Compares the stored photo with the uploaded one. A passing judgment verifies the report and rewards the collector; a failing one leaves the report `in_progress` and is returned with `verified: false`.",
    params(("id" = i64, Path, description = "Report ID")),
    request_body(content = VerifyForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Verification outcome", body = VerificationOutcome),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 409, description = "Report not held by caller", body = ErrorResponse),
        (status = 502, description = "Model failure", body = ErrorResponse),
    )
)]
pub async fn verify_report(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, GreenifyError> {
    let mut form = ImageForm::read(multipart).await?;
    let image = form.require_image()?;
    let comment = form.text("comment").map(str::to_string);

    let outcome = state
        .report_service
        .verify(&caller, ReportId::new(id), &image, comment)
        .await?;
    Ok(Json(outcome))
}

/// Report routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", post(submit_report).get(list_reports))
        .route("/reports/analyze", post(analyze_report))
        .route("/reports/{id}", get(get_report))
        .route("/reports/{id}/claim", post(claim_report))
        .route("/reports/{id}/verify", post(verify_report))
}
