//! Service error types with HTTP status code mapping.
//!
//! [`GreenifyError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::ai::decoder::DecodeError;
use crate::domain::{ReportId, ReportStatus};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1003,
///     "message": "image too large: 12000000 bytes exceeds 10485760",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GreenifyError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status                  |
/// |-----------|-----------------------|------------------------------|
/// | 1000–1099 | Validation            | 400 Bad Request              |
/// | 1100–1199 | Identity / signatures | 401 / 403                    |
/// | 2000–2999 | Not Found / Conflict  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / upstream     | 500 / 502                    |
/// | 4000–4999 | Domain rules          | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum GreenifyError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Uploaded file is not an image.
    #[error("unsupported media type: {0} (expected image/*)")]
    UnsupportedMediaType(String),

    /// Uploaded image exceeds the size limit.
    #[error("image too large: {size} bytes exceeds {limit}")]
    ImageTooLarge {
        /// Size of the rejected upload in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        limit: usize,
    },

    /// Location is not an absolute http(s) URL.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// Webhook request lacks one of the signature headers.
    #[error("missing webhook signature headers")]
    MissingSignatureHeaders,

    /// No caller identity was supplied with the request.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Webhook signature did not match or its timestamp is stale.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Caller identity is not mirrored in the users table.
    #[error("user not registered: {0}")]
    UserNotRegistered(String),

    /// Report with the given ID was not found.
    #[error("report not found: {0}")]
    ReportNotFound(ReportId),

    /// Notification with the given ID was not found for the caller.
    #[error("notification not found: {0}")]
    NotificationNotFound(i64),

    /// Reward catalog item was not found.
    #[error("reward not found: {0}")]
    RewardNotFound(u32),

    /// User with the given external ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The report is no longer pending and cannot be claimed.
    #[error("report {id} already claimed (status {status})")]
    ReportAlreadyClaimed {
        /// Report that was requested.
        id: ReportId,
        /// Status observed when the claim was attempted.
        status: ReportStatus,
    },

    /// Caller is not the collector assigned to the report.
    #[error("report {0} is not assigned to the caller")]
    NotReportCollector(ReportId),

    /// Requested lifecycle transition is not allowed.
    #[error("invalid status transition {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: ReportStatus,
        /// Requested status.
        to: ReportStatus,
    },

    /// Balance is too low for the requested redemption.
    #[error("insufficient points: {required} required, {available} available")]
    InsufficientPoints {
        /// Points required.
        required: i64,
        /// Points currently available.
        available: i64,
    },

    /// The model judged the uploaded image not to show waste.
    #[error("image does not appear to show waste")]
    NotWasteImage,

    /// Model reply could not be decoded into the expected structure.
    #[error("model output rejected: {0}")]
    ModelOutput(#[from] DecodeError),

    /// The model endpoint failed or returned an error.
    #[error("model request failed: {0}")]
    ModelRequest(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GreenifyError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::UnsupportedMediaType(_) => 1002,
            Self::ImageTooLarge { .. } => 1003,
            Self::InvalidLocation(_) => 1004,
            Self::MissingSignatureHeaders => 1005,
            Self::Unauthenticated(_) => 1101,
            Self::InvalidSignature => 1102,
            Self::UserNotRegistered(_) => 1103,
            Self::ReportNotFound(_) => 2001,
            Self::NotificationNotFound(_) => 2002,
            Self::RewardNotFound(_) => 2003,
            Self::UserNotFound(_) => 2004,
            Self::ReportAlreadyClaimed { .. } => 2101,
            Self::NotReportCollector(_) => 2102,
            Self::InvalidTransition { .. } => 2103,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::ModelOutput(_) => 3002,
            Self::ModelRequest(_) => 3003,
            Self::InsufficientPoints { .. } => 4001,
            Self::NotWasteImage => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::UnsupportedMediaType(_)
            | Self::ImageTooLarge { .. }
            | Self::InvalidLocation(_)
            | Self::MissingSignatureHeaders => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) | Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::UserNotRegistered(_) => StatusCode::FORBIDDEN,
            Self::ReportNotFound(_)
            | Self::NotificationNotFound(_)
            | Self::RewardNotFound(_)
            | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::ReportAlreadyClaimed { .. }
            | Self::NotReportCollector(_)
            | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::InsufficientPoints { .. } | Self::NotWasteImage => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::ModelOutput(_) | Self::ModelRequest(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for GreenifyError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for GreenifyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
