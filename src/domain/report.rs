//! Waste reports and their lifecycle.
//!
//! A report only ever moves forward:
//!
//! ```text
//! pending --(claim)--> in_progress --(verify success)--> verified
//! ```
//!
//! A failed verification leaves the report `in_progress` with the same
//! collector. There is no path back to `pending` and no rejected state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ReportId, UserId};
use crate::error::GreenifyError;

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Reported, waiting for a collector.
    Pending,
    /// Claimed by a collector, cleanup not yet verified.
    InProgress,
    /// Cleanup verified and rewarded.
    Verified,
}

impl ReportStatus {
    /// Returns the status as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Verified => "verified",
        }
    }

    /// Returns `true` if `next` is the single forward step from `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress) | (Self::InProgress, Self::Verified)
        )
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = GreenifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "verified" => Ok(Self::Verified),
            other => Err(GreenifyError::InvalidRequest(format!(
                "unknown report status: {other}"
            ))),
        }
    }
}

/// A stored waste report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    /// Report identifier.
    pub id: ReportId,
    /// User who reported the waste.
    pub user_id: UserId,
    /// Free-text location, normally a map link.
    pub location: String,
    /// Waste type as classified by the model.
    pub waste_type: String,
    /// Estimated quantity as classified by the model.
    pub amount: String,
    /// Image of the site, stored as a `data:` URL.
    pub image_url: Option<String>,
    /// Descriptive classification details (decomposition time, impact, ...).
    #[schema(value_type = Option<Object>)]
    pub verification_result: Option<serde_json::Value>,
    /// Lifecycle status.
    pub status: ReportStatus,
    /// Collector currently holding the report.
    pub collector_id: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Assigns the report to `collector`, moving it to `in_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::ReportAlreadyClaimed`] if the report is
    /// not pending.
    pub fn claim(&mut self, collector: &UserId) -> Result<(), GreenifyError> {
        if self.status != ReportStatus::Pending {
            return Err(GreenifyError::ReportAlreadyClaimed {
                id: self.id,
                status: self.status,
            });
        }
        self.status = ReportStatus::InProgress;
        self.collector_id = Some(collector.clone());
        Ok(())
    }

    /// Checks that `collector` may submit a cleanup verification.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidTransition`] if the report is not
    /// `in_progress`, or [`GreenifyError::NotReportCollector`] if it is
    /// held by someone else.
    pub fn ensure_verifiable_by(&self, collector: &UserId) -> Result<(), GreenifyError> {
        if !self.status.can_transition_to(ReportStatus::Verified) {
            return Err(GreenifyError::InvalidTransition {
                from: self.status,
                to: ReportStatus::Verified,
            });
        }
        if self.collector_id.as_ref() != Some(collector) {
            return Err(GreenifyError::NotReportCollector(self.id));
        }
        Ok(())
    }

    /// Marks the report verified for `collector`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Report::ensure_verifiable_by`].
    pub fn mark_verified(&mut self, collector: &UserId) -> Result<(), GreenifyError> {
        self.ensure_verifiable_by(collector)?;
        self.status = ReportStatus::Verified;
        Ok(())
    }
}

/// Fields required to create a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    /// Reporting user.
    pub user_id: UserId,
    /// Location link.
    pub location: String,
    /// Classified waste type.
    pub waste_type: String,
    /// Classified quantity.
    pub amount: String,
    /// Site image as a `data:` URL.
    pub image_url: Option<String>,
    /// Descriptive classification details.
    pub verification_result: Option<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pending_report() -> Report {
        Report {
            id: ReportId::new(7),
            user_id: UserId::from("reporter"),
            location: "https://maps.example/x".to_string(),
            waste_type: "plastic".to_string(),
            amount: "5kg".to_string(),
            image_url: None,
            verification_result: None,
            status: ReportStatus::Pending,
            collector_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn transitions_only_move_forward() {
        use ReportStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Verified));
        assert!(!Pending.can_transition_to(Verified));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Verified.can_transition_to(InProgress));
        assert!(!Verified.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(InProgress));
    }

    #[test]
    fn claim_assigns_collector() {
        let mut report = pending_report();
        let collector = UserId::from("collector");
        assert!(report.claim(&collector).is_ok());
        assert_eq!(report.status, ReportStatus::InProgress);
        assert_eq!(report.collector_id, Some(collector));
    }

    #[test]
    fn second_claim_is_rejected() {
        let mut report = pending_report();
        assert!(report.claim(&UserId::from("first")).is_ok());
        let Err(err) = report.claim(&UserId::from("second")) else {
            panic!("second claim should fail");
        };
        assert!(matches!(err, GreenifyError::ReportAlreadyClaimed { .. }));
        assert_eq!(report.collector_id, Some(UserId::from("first")));
    }

    #[test]
    fn verify_requires_in_progress() {
        let mut report = pending_report();
        let collector = UserId::from("collector");
        let Err(err) = report.mark_verified(&collector) else {
            panic!("pending report cannot be verified");
        };
        assert!(matches!(err, GreenifyError::InvalidTransition { .. }));
    }

    #[test]
    fn verify_requires_assigned_collector() {
        let mut report = pending_report();
        assert!(report.claim(&UserId::from("collector")).is_ok());
        let Err(err) = report.mark_verified(&UserId::from("intruder")) else {
            panic!("other users cannot verify");
        };
        assert!(matches!(err, GreenifyError::NotReportCollector(_)));
        assert_eq!(report.status, ReportStatus::InProgress);
    }

    #[test]
    fn verified_is_terminal() {
        let mut report = pending_report();
        let collector = UserId::from("collector");
        assert!(report.claim(&collector).is_ok());
        assert!(report.mark_verified(&collector).is_ok());
        assert_eq!(report.status, ReportStatus::Verified);
        assert!(report.mark_verified(&collector).is_err());
        assert!(report.claim(&collector).is_err());
    }

    #[test]
    fn status_parses_database_strings() {
        for status in [
            ReportStatus::Pending,
            ReportStatus::InProgress,
            ReportStatus::Verified,
        ] {
            let Ok(parsed) = status.as_str().parse::<ReportStatus>() else {
                panic!("status should parse");
            };
            assert_eq!(parsed, status);
        }
        assert!("rejected".parse::<ReportStatus>().is_err());
    }
}
