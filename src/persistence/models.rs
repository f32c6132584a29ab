//! Database rows and their conversion into domain records.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::{
    CollectedWaste, LeaderboardEntry, Notification, NotificationId, Report, ReportId,
    RewardLedgerEntry, Transaction, User, UserId,
};
use crate::error::GreenifyError;

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    /// Identity-provider ID (primary key).
    pub clerk_id: String,
    /// Primary email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Avatar URL.
    pub profile_image: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            clerk_id: UserId::new(row.clerk_id),
            email: row.email,
            full_name: row.full_name,
            profile_image: row.profile_image,
            created_at: row.created_at,
        }
    }
}

/// Row of the `reports` table.
#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    /// Serial ID.
    pub id: i64,
    /// Reporter.
    pub user_id: String,
    /// Location link.
    pub location: String,
    /// Waste type.
    pub waste_type: String,
    /// Quantity.
    pub amount: String,
    /// Site image.
    pub image_url: Option<String>,
    /// Classification details (JSONB).
    pub verification_result: Option<serde_json::Value>,
    /// Status text.
    pub status: String,
    /// Claiming collector.
    pub collector_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = GreenifyError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|_| GreenifyError::PersistenceError(format!("bad status: {}", row.status)))?;
        Ok(Self {
            id: ReportId::new(row.id),
            user_id: UserId::new(row.user_id),
            location: row.location,
            waste_type: row.waste_type,
            amount: row.amount,
            image_url: row.image_url,
            verification_result: row.verification_result,
            status,
            collector_id: row.collector_id.map(UserId::new),
            created_at: row.created_at,
        })
    }
}

/// Row of the `collected_wastes` table.
#[derive(Debug, Clone, FromRow)]
pub struct CollectedWasteRow {
    /// Serial ID.
    pub id: i64,
    /// Report cleaned up.
    pub report_id: i64,
    /// Collector.
    pub collector_id: String,
    /// Verification time.
    pub collection_date: DateTime<Utc>,
    /// Record status.
    pub status: String,
    /// Comment.
    pub comment: Option<String>,
}

impl From<CollectedWasteRow> for CollectedWaste {
    fn from(row: CollectedWasteRow) -> Self {
        Self {
            id: row.id,
            report_id: ReportId::new(row.report_id),
            collector_id: UserId::new(row.collector_id),
            collection_date: row.collection_date,
            status: row.status,
            comment: row.comment,
        }
    }
}

/// Row of the `rewards` ledger.
#[derive(Debug, Clone, FromRow)]
pub struct LedgerRow {
    /// Serial ID.
    pub id: i64,
    /// Owner.
    pub user_id: String,
    /// Signed delta.
    pub points: i64,
    /// Entry time.
    pub created_at: DateTime<Utc>,
}

impl From<LedgerRow> for RewardLedgerEntry {
    fn from(row: LedgerRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId::new(row.user_id),
            points: row.points,
            created_at: row.created_at,
        }
    }
}

/// Row of the `transactions` table.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    /// Serial ID.
    pub id: i64,
    /// Owner.
    pub user_id: String,
    /// Type text.
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Unsigned amount.
    pub amount: i64,
    /// Description.
    pub description: String,
    /// Timestamp.
    pub date: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = GreenifyError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: UserId::new(row.user_id),
            kind: row.kind.parse()?,
            amount: row.amount,
            description: row.description,
            date: row.date,
        })
    }
}

/// Row of the `notifications` table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    /// Serial ID.
    pub id: i64,
    /// Recipient.
    pub user_id: String,
    /// Message.
    pub message: String,
    /// Type text.
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Read flag.
    pub is_read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            user_id: UserId::new(row.user_id),
            message: row.message,
            kind: row.kind,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// Aggregated leaderboard row.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    /// User ID.
    pub clerk_id: String,
    /// Display name.
    pub full_name: String,
    /// Avatar.
    pub profile_image: Option<String>,
    /// Balance.
    pub points: i64,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            user_id: UserId::new(row.clerk_id),
            full_name: row.full_name,
            profile_image: row.profile_image,
            points: row.points,
        }
    }
}
