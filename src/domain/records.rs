//! Users, collection audit records, reward ledger and notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{NotificationId, ReportId, UserId};
use crate::error::GreenifyError;

/// Local mirror of an identity-provider user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Identity-provider user ID.
    pub clerk_id: UserId,
    /// Primary email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Avatar URL.
    pub profile_image: Option<String>,
    /// Mirror creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Profile fields carried by identity-provider user events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Identity-provider user ID.
    pub clerk_id: UserId,
    /// Primary email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Avatar URL.
    pub profile_image: Option<String>,
}

/// Audit record of a verified cleanup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectedWaste {
    /// Row ID.
    pub id: i64,
    /// Report that was cleaned up.
    pub report_id: ReportId,
    /// Collector who performed the cleanup.
    pub collector_id: UserId,
    /// Time the cleanup was verified.
    pub collection_date: DateTime<Utc>,
    /// Record status (`collected`).
    pub status: String,
    /// Model comment or collector note.
    pub comment: Option<String>,
}

/// One append-only grant (or debit) of reward points.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RewardLedgerEntry {
    /// Row ID.
    pub id: i64,
    /// User the points belong to.
    pub user_id: UserId,
    /// Signed point delta.
    pub points: i64,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

/// Category of a points transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Points earned by submitting a report.
    EarnedReport,
    /// Points earned by a verified cleanup.
    EarnedCollect,
    /// Points spent on a catalog reward.
    Redeemed,
}

impl TransactionKind {
    /// Returns the kind as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EarnedReport => "earned_report",
            Self::EarnedCollect => "earned_collect",
            Self::Redeemed => "redeemed",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = GreenifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earned_report" => Ok(Self::EarnedReport),
            "earned_collect" => Ok(Self::EarnedCollect),
            "redeemed" => Ok(Self::Redeemed),
            other => Err(GreenifyError::PersistenceError(format!(
                "unknown transaction type: {other}"
            ))),
        }
    }
}

/// User-facing history line for a points movement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Row ID.
    pub id: i64,
    /// Owner.
    pub user_id: UserId,
    /// Transaction category.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Unsigned point amount.
    pub amount: i64,
    /// Human-readable description.
    pub description: String,
    /// Transaction timestamp.
    pub date: DateTime<Utc>,
}

/// Points movement to record: one ledger entry plus its history line.
#[derive(Debug, Clone)]
pub struct PointsGrant {
    /// Recipient.
    pub user_id: UserId,
    /// Transaction category.
    pub kind: TransactionKind,
    /// Unsigned point amount.
    pub amount: i64,
    /// Human-readable description.
    pub description: String,
}

impl PointsGrant {
    /// Signed ledger delta for this grant.
    #[must_use]
    pub const fn ledger_points(&self) -> i64 {
        match self.kind {
            TransactionKind::Redeemed => -self.amount,
            TransactionKind::EarnedReport | TransactionKind::EarnedCollect => self.amount,
        }
    }
}

/// Notification type used for reward announcements.
pub const NOTIFICATION_TYPE_REWARD: &str = "reward";

/// In-app notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    /// Notification ID.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Message text.
    pub message: String,
    /// Notification type (e.g. `reward`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the user has read it.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Notification to enqueue.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Recipient.
    pub user_id: UserId,
    /// Message text.
    pub message: String,
    /// Notification type.
    pub kind: String,
}

/// Leaderboard row: a user and their point balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    /// User ID.
    pub user_id: UserId,
    /// Display name.
    pub full_name: String,
    /// Avatar URL.
    pub profile_image: Option<String>,
    /// Current balance.
    pub points: i64,
}
