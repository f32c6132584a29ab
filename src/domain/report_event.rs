//! Domain events reflecting report lifecycle changes.
//!
//! Every lifecycle change emits a [`ReportEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers so
//! that task boards update without polling.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ReportId, UserId};

/// Domain event emitted after a report changes state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ReportEvent {
    /// A new report was stored as `pending`.
    ReportSubmitted {
        /// Report identifier.
        report_id: ReportId,
        /// Reporting user.
        reporter_id: UserId,
        /// Classified waste type.
        waste_type: String,
        /// Classified amount.
        amount: String,
        /// Location link.
        location: String,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A collector claimed the report (`in_progress`).
    ReportClaimed {
        /// Report identifier.
        report_id: ReportId,
        /// Claiming collector.
        collector_id: UserId,
        /// Claim timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Cleanup passed verification and the collector was rewarded.
    ReportVerified {
        /// Report identifier.
        report_id: ReportId,
        /// Rewarded collector.
        collector_id: UserId,
        /// Points granted.
        points: i64,
        /// Verification timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Cleanup verification failed; the report stays `in_progress`.
    VerificationRejected {
        /// Report identifier.
        report_id: ReportId,
        /// Collector who attempted verification.
        collector_id: UserId,
        /// Why the judgment did not pass.
        reason: String,
        /// Attempt timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ReportEvent {
    /// Returns the report ID associated with this event.
    #[must_use]
    pub fn report_id(&self) -> ReportId {
        match self {
            Self::ReportSubmitted { report_id, .. }
            | Self::ReportClaimed { report_id, .. }
            | Self::ReportVerified { report_id, .. }
            | Self::VerificationRejected { report_id, .. } => *report_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ReportSubmitted { .. } => "report_submitted",
            Self::ReportClaimed { .. } => "report_claimed",
            Self::ReportVerified { .. } => "report_verified",
            Self::VerificationRejected { .. } => "verification_rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claimed_event_serializes_with_tag() {
        let event = ReportEvent::ReportClaimed {
            report_id: ReportId::new(7),
            collector_id: UserId::from("collector"),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"report_claimed\""));
        assert!(json.contains("\"report_id\":7"));
        assert_eq!(event.event_type_str(), "report_claimed");
    }

    #[test]
    fn report_id_accessor() {
        let event = ReportEvent::VerificationRejected {
            report_id: ReportId::new(3),
            collector_id: UserId::from("c"),
            reason: "not cleaned".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.report_id(), ReportId::new(3));
    }
}
