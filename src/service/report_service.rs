//! Report service: classification, submission, claim and verification.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::registered_user;
use crate::ai::{
    CleanupJudgment, ImageUpload, InlineImage, RejectionReason, VisionModel, WasteClassification,
    prompt,
};
use crate::config::GreenifyConfig;
use crate::domain::{
    EventBus, NOTIFICATION_TYPE_REWARD, NewNotification, NewReport, PointsGrant, Report,
    ReportEvent, ReportId, TransactionKind, UserId,
};
use crate::error::GreenifyError;
use crate::persistence::{CollectionCompletion, Page, ReportQuery, Store};

/// Points paid out by the report workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPoints {
    /// Granted to the reporter on submission.
    pub report: i64,
    /// Granted to the collector on a verified cleanup.
    pub collection: i64,
}

impl Default for RewardPoints {
    fn default() -> Self {
        Self {
            report: 10,
            collection: 50,
        }
    }
}

impl From<&GreenifyConfig> for RewardPoints {
    fn from(config: &GreenifyConfig) -> Self {
        Self {
            report: config.report_reward_points,
            collection: config.collection_reward_points,
        }
    }
}

/// A stored report together with the classification that produced it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmittedReport {
    /// The new `pending` report.
    pub report: Report,
    /// Model classification.
    pub classification: WasteClassification,
    /// Points granted to the reporter.
    pub points_awarded: i64,
}

/// Result of a cleanup verification attempt.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerificationOutcome {
    /// Report after the attempt.
    pub report: Report,
    /// Whether the cleanup passed and was rewarded.
    pub verified: bool,
    /// The model's judgment.
    pub judgment: CleanupJudgment,
    /// Why the judgment failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    /// Points granted to the collector.
    pub points_awarded: i64,
}

/// Orchestrates the report lifecycle.
///
/// Every mutation follows the same shape: check the caller, call the
/// model if needed, write through the [`Store`] in one atomic step, then
/// publish a [`ReportEvent`].
#[derive(Debug, Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
    model: Arc<dyn VisionModel>,
    event_bus: EventBus,
    points: RewardPoints,
}

impl ReportService {
    /// Creates a new `ReportService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        model: Arc<dyn VisionModel>,
        event_bus: EventBus,
        points: RewardPoints,
    ) -> Self {
        Self {
            store,
            model,
            event_bus,
            points,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn publish(&self, event: ReportEvent) {
        let event_type = event.event_type_str();
        let report_id = event.report_id();
        let receivers = self.event_bus.publish(event);
        tracing::debug!(%report_id, event_type, receivers, "report event published");
    }

    /// Classifies a photo without storing anything.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::ModelRequest`] if the model call fails and
    /// [`GreenifyError::ModelOutput`] if the reply cannot be decoded.
    pub async fn analyze(&self, image: &ImageUpload) -> Result<WasteClassification, GreenifyError> {
        let reply = self
            .model
            .generate(prompt::CLASSIFY_WASTE, &[image.to_inline()])
            .await?;
        WasteClassification::from_model_text(&reply).map_err(|e| {
            tracing::warn!(error = %e, "classification reply rejected");
            GreenifyError::from(e)
        })
    }

    /// Classifies the photo and stores a `pending` report.
    ///
    /// The location is validated before the model is called. The reporter
    /// is credited [`RewardPoints::report`] in the same write.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidLocation`] for a location that is
    /// not an absolute http(s) URL, [`GreenifyError::NotWasteImage`] when
    /// the model says the photo shows no waste, plus the errors of
    /// [`ReportService::analyze`].
    pub async fn submit(
        &self,
        caller: &UserId,
        location: &str,
        image: &ImageUpload,
    ) -> Result<SubmittedReport, GreenifyError> {
        registered_user(self.store.as_ref(), caller).await?;
        let location = validate_location(location)?;

        let classification = self.analyze(image).await?;
        if !classification.shows_waste() {
            tracing::info!(user = %caller, "photo classified as not showing waste");
            return Err(GreenifyError::NotWasteImage);
        }

        let details = serde_json::to_value(&classification.details)
            .map_err(|e| GreenifyError::Internal(format!("serialize details: {e}")))?;
        let new_report = NewReport {
            user_id: caller.clone(),
            location,
            waste_type: classification.waste_type.clone(),
            amount: classification.quantity.clone(),
            image_url: Some(image.to_data_url()),
            verification_result: Some(details),
        };
        let reward = (self.points.report > 0).then(|| PointsGrant {
            user_id: caller.clone(),
            kind: TransactionKind::EarnedReport,
            amount: self.points.report,
            description: "Points earned for reporting waste".to_string(),
        });
        let points_awarded = reward.as_ref().map_or(0, |grant| grant.amount);

        let report = self.store.create_report(new_report, reward).await?;

        self.publish(ReportEvent::ReportSubmitted {
            report_id: report.id,
            reporter_id: caller.clone(),
            waste_type: report.waste_type.clone(),
            amount: report.amount.clone(),
            location: report.location.clone(),
            timestamp: report.created_at,
        });

        tracing::info!(report_id = %report.id, user = %caller, waste_type = %report.waste_type, "report submitted");

        Ok(SubmittedReport {
            report,
            classification,
            points_awarded,
        })
    }

    /// Assigns a `pending` report to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::ReportNotFound`] or
    /// [`GreenifyError::ReportAlreadyClaimed`] when another collector got
    /// there first.
    pub async fn claim(&self, caller: &UserId, id: ReportId) -> Result<Report, GreenifyError> {
        registered_user(self.store.as_ref(), caller).await?;
        let report = self.store.claim_report(id, caller).await?;

        self.publish(ReportEvent::ReportClaimed {
            report_id: id,
            collector_id: caller.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(report_id = %id, collector = %caller, "report claimed");
        Ok(report)
    }

    /// Compares the stored photo with `after` and, if the cleanup passes,
    /// verifies the report and rewards the collector.
    ///
    /// A failed judgment is not an error: the outcome carries the reason
    /// and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidTransition`] or
    /// [`GreenifyError::NotReportCollector`] when the caller may not verify
    /// the report, plus model request and decode errors.
    pub async fn verify(
        &self,
        caller: &UserId,
        id: ReportId,
        after: &ImageUpload,
        comment: Option<String>,
    ) -> Result<VerificationOutcome, GreenifyError> {
        registered_user(self.store.as_ref(), caller).await?;
        let report = self.get(id).await?;
        report.ensure_verifiable_by(caller)?;

        let before = report
            .image_url
            .as_deref()
            .ok_or_else(|| GreenifyError::InvalidRequest(format!("report {id} has no image")))
            .and_then(InlineImage::from_data_url)?;

        let reply = self
            .model
            .generate(prompt::COMPARE_CLEANUP, &[before, after.to_inline()])
            .await?;
        let judgment = CleanupJudgment::from_model_text(&reply).map_err(|e| {
            tracing::warn!(report_id = %id, error = %e, "comparison reply rejected");
            GreenifyError::from(e)
        })?;

        if let Err(reason) = judgment.evaluate() {
            self.publish(ReportEvent::VerificationRejected {
                report_id: id,
                collector_id: caller.clone(),
                reason: reason.to_string(),
                timestamp: Utc::now(),
            });
            tracing::info!(report_id = %id, collector = %caller, %reason, "verification rejected");
            return Ok(VerificationOutcome {
                report,
                verified: false,
                judgment,
                reason: Some(reason),
                points_awarded: 0,
            });
        }

        let points = self.points.collection;
        let completion = CollectionCompletion {
            report_id: id,
            collector_id: caller.clone(),
            comment: comment.or_else(|| judgment.comments.clone()),
            reward: PointsGrant {
                user_id: caller.clone(),
                kind: TransactionKind::EarnedCollect,
                amount: points,
                description: format!("Points earned for collecting waste (report {id})"),
            },
            notification: NewNotification {
                user_id: caller.clone(),
                message: format!("You've earned {points} points for collecting waste!"),
                kind: NOTIFICATION_TYPE_REWARD.to_string(),
            },
        };
        let done = self.store.complete_collection(completion).await?;

        self.publish(ReportEvent::ReportVerified {
            report_id: id,
            collector_id: caller.clone(),
            points,
            timestamp: done.collected.collection_date,
        });

        tracing::info!(report_id = %id, collector = %caller, points, "cleanup verified");

        Ok(VerificationOutcome {
            report: done.report,
            verified: true,
            judgment,
            reason: None,
            points_awarded: points,
        })
    }

    /// Loads one report.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::ReportNotFound`] if it does not exist.
    pub async fn get(&self, id: ReportId) -> Result<Report, GreenifyError> {
        self.store
            .get_report(id)
            .await?
            .ok_or(GreenifyError::ReportNotFound(id))
    }

    /// Lists reports for the collection task board.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn list_tasks(&self, query: &ReportQuery) -> Result<Page<Report>, GreenifyError> {
        self.store.list_reports(query).await
    }

    /// The caller's most recent reports.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn my_reports(
        &self,
        caller: &UserId,
        limit: u32,
    ) -> Result<Vec<Report>, GreenifyError> {
        let query = ReportQuery {
            reporter: Some(caller.clone()),
            limit,
            ..ReportQuery::default()
        };
        Ok(self.store.list_reports(&query).await?.items)
    }
}

/// Accepts absolute `http`/`https` URLs (map links); returns the trimmed text.
fn validate_location(location: &str) -> Result<String, GreenifyError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(GreenifyError::InvalidLocation("location is required".to_string()));
    }
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| GreenifyError::InvalidLocation(format!("{trimmed}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(trimmed.to_string()),
        _ => Err(GreenifyError::InvalidLocation(format!(
            "{trimmed}: expected an http(s) link"
        ))),
    }
}
