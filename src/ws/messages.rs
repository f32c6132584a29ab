//! WebSocket message types: envelope, commands and report selectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ReportId;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error message answering request `id`.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u32, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands carried in the payload of a `command` message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific reports. `"*"` selects all.
    Subscribe {
        /// Report selectors.
        report_ids: Vec<ReportSelector>,
    },
    /// Unsubscribe from specific reports.
    Unsubscribe {
        /// Report selectors. A wildcard here clears the wildcard flag.
        report_ids: Vec<ReportSelector>,
    },
    /// Fetch the current state of one report.
    GetReport {
        /// Report to fetch.
        report_id: i64,
    },
}

/// One entry of a subscription list: a numeric report ID, the same ID
/// as a string, or `"*"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReportSelector {
    /// Numeric ID.
    Id(i64),
    /// Textual form.
    Text(String),
}

impl ReportSelector {
    /// Returns `true` for the `"*"` wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Text(text) if text == "*")
    }

    /// Returns the report ID, if this selector names one.
    #[must_use]
    pub fn report_id(&self) -> Option<ReportId> {
        match self {
            Self::Id(id) => Some(ReportId::new(*id)),
            Self::Text(text) => text.trim().parse::<i64>().ok().map(ReportId::new),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_accepts_mixed_selectors() {
        let payload = serde_json::json!({
            "command": "subscribe",
            "report_ids": [3, "4", "*", "nope"]
        });
        let Ok(WsCommand::Subscribe { report_ids }) = serde_json::from_value(payload) else {
            panic!("expected subscribe command");
        };
        let ids: Vec<_> = report_ids.iter().filter_map(ReportSelector::report_id).collect();
        assert_eq!(ids, vec![ReportId::new(3), ReportId::new(4)]);
        assert!(report_ids.iter().any(ReportSelector::is_wildcard));
    }

    #[test]
    fn unknown_command_fails_to_decode() {
        let payload = serde_json::json!({ "command": "swap" });
        assert!(serde_json::from_value::<WsCommand>(payload).is_err());
    }
}
