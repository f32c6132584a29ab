//! Service layer: business logic orchestration.
//!
//! [`ReportService`] drives the report lifecycle (classify, submit, claim,
//! verify) and emits events through the [`super::domain::EventBus`].
//! [`RewardService`], [`NotificationService`] and [`UserService`] are thin
//! coordinators over the [`Store`]. [`chat`] answers the help widget.

pub mod chat;
pub mod notification_service;
pub mod report_service;
pub mod reward_service;
pub mod user_service;

pub use notification_service::NotificationService;
pub use report_service::{RewardPoints, SubmittedReport, VerificationOutcome, ReportService};
pub use reward_service::{DashboardStats, Redemption, RewardService, RewardSummary};
pub use user_service::UserService;

use crate::domain::{User, UserId};
use crate::error::GreenifyError;
use crate::persistence::Store;

/// Loads the caller's user mirror, rejecting identities the webhook has
/// not registered (or has deleted).
async fn registered_user(store: &dyn Store, caller: &UserId) -> Result<User, GreenifyError> {
    store
        .find_user(caller)
        .await?
        .ok_or_else(|| GreenifyError::UserNotRegistered(caller.to_string()))
}
