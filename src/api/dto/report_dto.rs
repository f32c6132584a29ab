//! Report endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{PaginationMeta, PaginationParams};
use crate::domain::{Report, ReportStatus};

/// Query for the collection task board.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TaskListParams {
    /// Only reports in this status.
    pub status: Option<ReportStatus>,
    /// Case-insensitive location substring.
    pub search: Option<String>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100).
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl TaskListParams {
    /// Pagination part with defaults applied and bounds clamped.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
        .clamped()
    }

    /// Search text, with blank input treated as absent.
    #[must_use]
    pub fn search_text(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Paginated report listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportListResponse {
    /// Reports on this page.
    pub data: Vec<Report>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Multipart body of `POST /reports/analyze`.
#[derive(Debug, ToSchema)]
pub struct AnalyzeForm {
    /// Photo of the waste (`image/*`, at most 10 MiB).
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Multipart body of `POST /reports`.
#[derive(Debug, ToSchema)]
pub struct SubmitReportForm {
    /// Map link of the site.
    pub location: String,
    /// Photo of the waste (`image/*`, at most 10 MiB).
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Multipart body of `POST /reports/{id}/verify`.
#[derive(Debug, ToSchema)]
pub struct VerifyForm {
    /// Photo of the cleaned site (`image/*`, at most 10 MiB).
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    /// Optional collector note stored on the collection record.
    pub comment: Option<String>,
}
