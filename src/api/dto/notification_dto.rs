//! Notification endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query for the notification inbox.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NotificationParams {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Maximum rows (1–100). Defaults to 20.
    pub limit: Option<u32>,
}

/// Result of a bulk acknowledge.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    /// Notifications changed to read.
    pub updated: u64,
}
