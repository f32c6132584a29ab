//! In-memory implementation of [`Store`].
//!
//! All tables live behind one [`tokio::sync::RwLock`], so every trait
//! method is atomic: a multi-row write either completes under the write
//! guard or returns before touching anything.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CollectionCompletion, CompletedCollection, Page, ReportQuery, Store, UserActivity};
use crate::domain::{
    CollectedWaste, LeaderboardEntry, NewReport, Notification, NotificationId, PointsGrant,
    Report, ReportId, ReportStatus, RewardLedgerEntry, Transaction, TransactionKind, User, UserId,
    UserProfile,
};
use crate::error::GreenifyError;

#[derive(Debug)]
struct StoredUser {
    user: User,
    deleted: bool,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, StoredUser>,
    reports: BTreeMap<ReportId, Report>,
    collected: Vec<CollectedWaste>,
    rewards: Vec<RewardLedgerEntry>,
    transactions: Vec<Transaction>,
    notifications: Vec<Notification>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn balance(&self, user: &UserId) -> i64 {
        self.rewards
            .iter()
            .filter(|entry| &entry.user_id == user)
            .map(|entry| entry.points)
            .sum()
    }

    /// Appends a ledger entry and its transaction line.
    fn record_points(&mut self, grant: &PointsGrant) -> RewardLedgerEntry {
        let now = Utc::now();
        let entry = RewardLedgerEntry {
            id: self.next_id(),
            user_id: grant.user_id.clone(),
            points: grant.ledger_points(),
            created_at: now,
        };
        self.rewards.push(entry.clone());
        let transaction = Transaction {
            id: self.next_id(),
            user_id: grant.user_id.clone(),
            kind: grant.kind,
            amount: grant.amount,
            description: grant.description.clone(),
            date: now,
        };
        self.transactions.push(transaction);
        entry
    }
}

/// Store backed by process memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn window<T>(items: Vec<T>, offset: u32, limit: u32) -> Vec<T> {
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, GreenifyError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.user.clone()))
    }

    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<bool, GreenifyError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&profile.clerk_id) {
            return Ok(false);
        }
        let user = User {
            clerk_id: profile.clerk_id.clone(),
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            profile_image: profile.profile_image.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(
            profile.clerk_id.clone(),
            StoredUser {
                user,
                deleted: false,
            },
        );
        Ok(true)
    }

    async fn update_user(&self, profile: &UserProfile) -> Result<bool, GreenifyError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.users.get_mut(&profile.clerk_id) else {
            return Ok(false);
        };
        stored.user.email.clone_from(&profile.email);
        stored.user.full_name.clone_from(&profile.full_name);
        stored.user.profile_image.clone_from(&profile.profile_image);
        stored.deleted = false;
        Ok(true)
    }

    async fn soft_delete_user(&self, id: &UserId) -> Result<bool, GreenifyError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                stored.user.profile_image = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_report(
        &self,
        report: NewReport,
        reward: Option<PointsGrant>,
    ) -> Result<Report, GreenifyError> {
        let mut tables = self.tables.write().await;
        let id = ReportId::new(tables.next_id());
        let stored = Report {
            id,
            user_id: report.user_id,
            location: report.location,
            waste_type: report.waste_type,
            amount: report.amount,
            image_url: report.image_url,
            verification_result: report.verification_result,
            status: ReportStatus::Pending,
            collector_id: None,
            created_at: Utc::now(),
        };
        tables.reports.insert(id, stored.clone());
        if let Some(grant) = reward {
            tables.record_points(&grant);
        }
        Ok(stored)
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>, GreenifyError> {
        Ok(self.tables.read().await.reports.get(&id).cloned())
    }

    async fn list_reports(&self, query: &ReportQuery) -> Result<Page<Report>, GreenifyError> {
        let tables = self.tables.read().await;
        let needle = query.search.as_ref().map(|s| s.to_lowercase());
        let mut matches: Vec<Report> = tables
            .reports
            .values()
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .filter(|r| query.reporter.as_ref().is_none_or(|u| &r.user_id == u))
            .filter(|r| {
                needle
                    .as_deref()
                    .is_none_or(|n| r.location.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matches.len() as u64;
        Ok(Page {
            items: window(matches, query.offset, query.limit),
            total,
        })
    }

    async fn claim_report(
        &self,
        id: ReportId,
        collector: &UserId,
    ) -> Result<Report, GreenifyError> {
        let mut tables = self.tables.write().await;
        let report = tables
            .reports
            .get_mut(&id)
            .ok_or(GreenifyError::ReportNotFound(id))?;
        report.claim(collector)?;
        Ok(report.clone())
    }

    async fn complete_collection(
        &self,
        completion: CollectionCompletion,
    ) -> Result<CompletedCollection, GreenifyError> {
        let mut tables = self.tables.write().await;
        let report = tables
            .reports
            .get_mut(&completion.report_id)
            .ok_or(GreenifyError::ReportNotFound(completion.report_id))?;
        report.mark_verified(&completion.collector_id)?;
        let report = report.clone();

        let now = Utc::now();
        let collected = CollectedWaste {
            id: tables.next_id(),
            report_id: completion.report_id,
            collector_id: completion.collector_id.clone(),
            collection_date: now,
            status: "collected".to_string(),
            comment: completion.comment,
        };
        tables.collected.push(collected.clone());

        let ledger_entry = tables.record_points(&completion.reward);

        let notification = Notification {
            id: NotificationId::new(tables.next_id()),
            user_id: completion.notification.user_id,
            message: completion.notification.message,
            kind: completion.notification.kind,
            is_read: false,
            created_at: now,
        };
        tables.notifications.push(notification.clone());

        Ok(CompletedCollection {
            report,
            collected,
            ledger_entry,
            notification,
        })
    }

    async fn balance(&self, user: &UserId) -> Result<i64, GreenifyError> {
        Ok(self.tables.read().await.balance(user))
    }

    async fn ledger(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<RewardLedgerEntry>, GreenifyError> {
        let tables = self.tables.read().await;
        Ok(tables
            .rewards
            .iter()
            .rev()
            .filter(|entry| &entry.user_id == user)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn transactions(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>, GreenifyError> {
        let tables = self.tables.read().await;
        Ok(tables
            .transactions
            .iter()
            .rev()
            .filter(|tx| &tx.user_id == user)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn redeem(&self, debit: PointsGrant) -> Result<i64, GreenifyError> {
        if debit.kind != TransactionKind::Redeemed {
            return Err(GreenifyError::Internal(format!(
                "redeem called with {} transaction",
                debit.kind
            )));
        }
        let mut tables = self.tables.write().await;
        let available = tables.balance(&debit.user_id);
        if available < debit.amount {
            return Err(GreenifyError::InsufficientPoints {
                required: debit.amount,
                available,
            });
        }
        tables.record_points(&debit);
        Ok(available - debit.amount)
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, GreenifyError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<LeaderboardEntry> = tables
            .users
            .values()
            .filter(|stored| !stored.deleted)
            .map(|stored| LeaderboardEntry {
                user_id: stored.user.clerk_id.clone(),
                full_name: stored.user.full_name.clone(),
                profile_image: stored.user.profile_image.clone(),
                points: tables.balance(&stored.user.clerk_id),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.full_name.cmp(&b.full_name))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn user_activity(&self, user: &UserId) -> Result<UserActivity, GreenifyError> {
        let tables = self.tables.read().await;
        Ok(UserActivity {
            reports: tables.reports.values().filter(|r| &r.user_id == user).count() as u64,
            collections: tables
                .collected
                .iter()
                .filter(|c| &c.collector_id == user)
                .count() as u64,
        })
    }

    async fn notifications(
        &self,
        user: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, GreenifyError> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| &n.user_id == user && (!unread_only || !n.is_read))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<bool, GreenifyError> {
        let mut tables = self.tables.write().await;
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && &n.user_id == user)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user: &UserId) -> Result<u64, GreenifyError> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| &n.user_id == user && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}
