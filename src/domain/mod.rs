//! Domain layer: reports and their lifecycle, reward ledger records,
//! notifications, reward tiers and the lifecycle event bus.

pub mod event_bus;
pub mod ids;
pub mod records;
pub mod report;
pub mod report_event;
pub mod rewards;

pub use event_bus::EventBus;
pub use ids::{NotificationId, ReportId, UserId};
pub use records::{
    CollectedWaste, LeaderboardEntry, NOTIFICATION_TYPE_REWARD, NewNotification, Notification,
    PointsGrant, RewardLedgerEntry, Transaction, TransactionKind, User, UserProfile,
};
pub use report::{NewReport, Report, ReportStatus};
pub use report_event::ReportEvent;
pub use rewards::{CatalogItem, RewardTier};
