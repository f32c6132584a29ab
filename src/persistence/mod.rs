//! Persistence layer: users, reports, reward ledger and notifications.
//!
//! The [`Store`] trait is the only way the service touches durable state.
//! [`postgres::PgStore`] backs it with `sqlx::PgPool`; [`memory::MemoryStore`]
//! keeps everything behind a single `tokio::sync::RwLock` for tests and for
//! running with persistence disabled.
//!
//! Multi-row operations ([`Store::create_report`],
//! [`Store::complete_collection`], [`Store::redeem`]) are atomic in both
//! implementations, and [`Store::claim_report`] only succeeds while the
//! report is still `pending`.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{
    CollectedWaste, LeaderboardEntry, NewNotification, NewReport, Notification, NotificationId,
    PointsGrant, Report, ReportId, ReportStatus, RewardLedgerEntry, Transaction, User, UserId,
    UserProfile,
};
use crate::error::GreenifyError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filter and window for report listings. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    /// Only reports in this status.
    pub status: Option<ReportStatus>,
    /// Only reports by this user.
    pub reporter: Option<UserId>,
    /// Case-insensitive substring of the location.
    pub search: Option<String>,
    /// Rows to skip.
    pub offset: u32,
    /// Maximum rows to return.
    pub limit: u32,
}

/// One window of a listing plus the total number of matches.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Rows in this window.
    pub items: Vec<T>,
    /// Total matching rows.
    pub total: u64,
}

/// Everything written when a cleanup passes verification.
#[derive(Debug, Clone)]
pub struct CollectionCompletion {
    /// Report being completed.
    pub report_id: ReportId,
    /// Collector holding the report.
    pub collector_id: UserId,
    /// Comment for the audit record.
    pub comment: Option<String>,
    /// Reward for the collector.
    pub reward: PointsGrant,
    /// Notification for the collector.
    pub notification: NewNotification,
}

/// Rows produced by [`Store::complete_collection`].
#[derive(Debug, Clone)]
pub struct CompletedCollection {
    /// Report, now `verified`.
    pub report: Report,
    /// Audit record.
    pub collected: CollectedWaste,
    /// Ledger entry for the reward.
    pub ledger_entry: RewardLedgerEntry,
    /// Notification sent to the collector.
    pub notification: Notification,
}

/// Per-user activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserActivity {
    /// Reports submitted.
    pub reports: u64,
    /// Cleanups verified.
    pub collections: u64,
}

/// Durable storage used by the services.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Finds a user that has not been deleted.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, GreenifyError>;

    /// Inserts a user mirror; returns `false` if it already existed.
    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<bool, GreenifyError>;

    /// Updates a user mirror; returns `false` if there was none.
    async fn update_user(&self, profile: &UserProfile) -> Result<bool, GreenifyError>;

    /// Marks a user deleted; returns `false` if there was none.
    async fn soft_delete_user(&self, id: &UserId) -> Result<bool, GreenifyError>;

    /// Stores a `pending` report together with an optional reporting reward.
    async fn create_report(
        &self,
        report: NewReport,
        reward: Option<PointsGrant>,
    ) -> Result<Report, GreenifyError>;

    /// Loads one report.
    async fn get_report(&self, id: ReportId) -> Result<Option<Report>, GreenifyError>;

    /// Lists reports, newest first.
    async fn list_reports(&self, query: &ReportQuery) -> Result<Page<Report>, GreenifyError>;

    /// Moves a `pending` report to `in_progress` for `collector`.
    ///
    /// Fails with [`GreenifyError::ReportAlreadyClaimed`] when another
    /// claim got there first.
    async fn claim_report(
        &self,
        id: ReportId,
        collector: &UserId,
    ) -> Result<Report, GreenifyError>;

    /// Atomically verifies the report and writes the audit record, ledger
    /// entry, transaction and notification. Nothing is written on failure.
    async fn complete_collection(
        &self,
        completion: CollectionCompletion,
    ) -> Result<CompletedCollection, GreenifyError>;

    /// Sum of the user's ledger entries.
    async fn balance(&self, user: &UserId) -> Result<i64, GreenifyError>;

    /// Most recent ledger entries.
    async fn ledger(&self, user: &UserId, limit: u32)
    -> Result<Vec<RewardLedgerEntry>, GreenifyError>;

    /// Most recent transactions.
    async fn transactions(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>, GreenifyError>;

    /// Debits a redemption if the balance covers it; returns the new balance.
    async fn redeem(&self, debit: PointsGrant) -> Result<i64, GreenifyError>;

    /// Users ordered by balance, highest first.
    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, GreenifyError>;

    /// Report and collection counts for a user.
    async fn user_activity(&self, user: &UserId) -> Result<UserActivity, GreenifyError>;

    /// Most recent notifications.
    async fn notifications(
        &self,
        user: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, GreenifyError>;

    /// Marks one of the user's notifications read; `false` if not found.
    async fn mark_notification_read(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<bool, GreenifyError>;

    /// Marks all of the user's notifications read; returns how many changed.
    async fn mark_all_notifications_read(&self, user: &UserId) -> Result<u64, GreenifyError>;
}
