//! Chat widget DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// User message.
    pub message: String,
    /// Optional attached image link.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Assistant reply.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatResponse {
    /// Always `assistant`.
    pub role: &'static str,
    /// Reply text.
    pub content: String,
}
