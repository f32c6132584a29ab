//! PostgreSQL implementation of [`Store`].

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};

use super::models::{
    CollectedWasteRow, LeaderboardRow, LedgerRow, NotificationRow, ReportRow, TransactionRow,
    UserRow,
};
use super::{CollectionCompletion, CompletedCollection, Page, ReportQuery, Store, UserActivity};
use crate::config::GreenifyConfig;
use crate::domain::{
    LeaderboardEntry, NewReport, Notification, NotificationId, PointsGrant, Report, ReportId,
    ReportStatus, RewardLedgerEntry, Transaction, TransactionKind, User, UserId, UserProfile,
};
use crate::error::GreenifyError;

const REPORT_COLUMNS: &str = "id, user_id, location, waste_type, amount, image_url, \
     verification_result, status, collector_id, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the configured pool settings and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GreenifyError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &GreenifyConfig) -> Result<Self, GreenifyError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| GreenifyError::PersistenceError(format!("migration failed: {e}")))?;

        tracing::info!("database migrations applied");
        Ok(Self::new(pool))
    }
}

/// Appends a ledger entry and its transaction line inside `tx`.
async fn record_points(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    grant: &PointsGrant,
) -> Result<RewardLedgerEntry, GreenifyError> {
    let entry = sqlx::query_as::<_, LedgerRow>(
        "INSERT INTO rewards (user_id, points) VALUES ($1, $2) \
         RETURNING id, user_id, points, created_at",
    )
    .bind(grant.user_id.as_str())
    .bind(grant.ledger_points())
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query("INSERT INTO transactions (user_id, type, amount, description) VALUES ($1, $2, $3, $4)")
        .bind(grant.user_id.as_str())
        .bind(grant.kind.as_str())
        .bind(grant.amount)
        .bind(&grant.description)
        .execute(&mut **tx)
        .await?;

    Ok(entry.into())
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, GreenifyError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT clerk_id, email, full_name, profile_image, created_at FROM users \
             WHERE clerk_id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<bool, GreenifyError> {
        let result = sqlx::query(
            "INSERT INTO users (clerk_id, email, full_name, profile_image) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (clerk_id) DO NOTHING",
        )
        .bind(profile.clerk_id.as_str())
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.profile_image)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_user(&self, profile: &UserProfile) -> Result<bool, GreenifyError> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, full_name = $3, profile_image = $4, deleted_at = NULL \
             WHERE clerk_id = $1",
        )
        .bind(profile.clerk_id.as_str())
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.profile_image)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn soft_delete_user(&self, id: &UserId) -> Result<bool, GreenifyError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), profile_image = NULL \
             WHERE clerk_id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn create_report(
        &self,
        report: NewReport,
        reward: Option<PointsGrant>,
    ) -> Result<Report, GreenifyError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "INSERT INTO reports (user_id, location, waste_type, amount, image_url, verification_result, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {REPORT_COLUMNS}"
        ))
        .bind(report.user_id.as_str())
        .bind(&report.location)
        .bind(&report.waste_type)
        .bind(&report.amount)
        .bind(&report.image_url)
        .bind(&report.verification_result)
        .bind(ReportStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(grant) = reward {
            record_points(&mut tx, &grant).await?;
        }

        tx.commit().await?;
        Report::try_from(row)
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>, GreenifyError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Report::try_from).transpose()
    }

    async fn list_reports(&self, query: &ReportQuery) -> Result<Page<Report>, GreenifyError> {
        const FILTER: &str = "($1::TEXT IS NULL OR status = $1) \
             AND ($2::TEXT IS NULL OR user_id = $2) \
             AND ($3::TEXT IS NULL OR position(lower($3) in lower(location)) > 0)";

        let status = query.status.map(ReportStatus::as_str);
        let reporter = query.reporter.as_ref().map(UserId::as_str);
        let search = query.search.as_deref();

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM reports WHERE {FILTER}"
        ))
        .bind(status)
        .bind(reporter)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE {FILTER} \
             ORDER BY created_at DESC, id DESC OFFSET $4 LIMIT $5"
        ))
        .bind(status)
        .bind(reporter)
        .bind(search)
        .bind(i64::from(query.offset))
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(Report::try_from)
                .collect::<Result<_, _>>()?,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn claim_report(
        &self,
        id: ReportId,
        collector: &UserId,
    ) -> Result<Report, GreenifyError> {
        let claimed = sqlx::query_as::<_, ReportRow>(&format!(
            "UPDATE reports SET status = $3, collector_id = $2 \
             WHERE id = $1 AND status = $4 RETURNING {REPORT_COLUMNS}"
        ))
        .bind(id.get())
        .bind(collector.as_str())
        .bind(ReportStatus::InProgress.as_str())
        .bind(ReportStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = claimed {
            return Report::try_from(row);
        }

        match self.get_report(id).await? {
            Some(current) => Err(GreenifyError::ReportAlreadyClaimed {
                id,
                status: current.status,
            }),
            None => Err(GreenifyError::ReportNotFound(id)),
        }
    }

    async fn complete_collection(
        &self,
        completion: CollectionCompletion,
    ) -> Result<CompletedCollection, GreenifyError> {
        let mut tx = self.pool.begin().await?;

        let verified = sqlx::query_as::<_, ReportRow>(&format!(
            "UPDATE reports SET status = $3 \
             WHERE id = $1 AND collector_id = $2 AND status = $4 RETURNING {REPORT_COLUMNS}"
        ))
        .bind(completion.report_id.get())
        .bind(completion.collector_id.as_str())
        .bind(ReportStatus::Verified.as_str())
        .bind(ReportStatus::InProgress.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = verified else {
            tx.rollback().await?;
            let current = self
                .get_report(completion.report_id)
                .await?
                .ok_or(GreenifyError::ReportNotFound(completion.report_id))?;
            current.ensure_verifiable_by(&completion.collector_id)?;
            return Err(GreenifyError::Internal(format!(
                "report {} changed during verification",
                completion.report_id
            )));
        };

        let collected = sqlx::query_as::<_, CollectedWasteRow>(
            "INSERT INTO collected_wastes (report_id, collector_id, status, comment) \
             VALUES ($1, $2, 'collected', $3) \
             RETURNING id, report_id, collector_id, collection_date, status, comment",
        )
        .bind(completion.report_id.get())
        .bind(completion.collector_id.as_str())
        .bind(&completion.comment)
        .fetch_one(&mut *tx)
        .await?;

        let ledger_entry = record_points(&mut tx, &completion.reward).await?;

        let notification = sqlx::query_as::<_, NotificationRow>(
            "INSERT INTO notifications (user_id, message, type) VALUES ($1, $2, $3) \
             RETURNING id, user_id, message, type, is_read, created_at",
        )
        .bind(completion.notification.user_id.as_str())
        .bind(&completion.notification.message)
        .bind(&completion.notification.kind)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CompletedCollection {
            report: Report::try_from(row)?,
            collected: collected.into(),
            ledger_entry,
            notification: notification.into(),
        })
    }

    async fn balance(&self, user: &UserId) -> Result<i64, GreenifyError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(points), 0)::BIGINT FROM rewards WHERE user_id = $1",
        )
        .bind(user.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn ledger(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<RewardLedgerEntry>, GreenifyError> {
        let rows = sqlx::query_as::<_, LedgerRow>(
            "SELECT id, user_id, points, created_at FROM rewards WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RewardLedgerEntry::from).collect())
    }

    async fn transactions(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>, GreenifyError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, user_id, type, amount, description, date FROM transactions \
             WHERE user_id = $1 ORDER BY date DESC, id DESC LIMIT $2",
        )
        .bind(user.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn redeem(&self, debit: PointsGrant) -> Result<i64, GreenifyError> {
        if debit.kind != TransactionKind::Redeemed {
            return Err(GreenifyError::Internal(format!(
                "redeem called with {} transaction",
                debit.kind
            )));
        }

        let mut tx = self.pool.begin().await?;

        // Serializes concurrent redemptions for the same user.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(debit.user_id.as_str())
            .execute(&mut *tx)
            .await?;

        let available = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(points), 0)::BIGINT FROM rewards WHERE user_id = $1",
        )
        .bind(debit.user_id.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if available < debit.amount {
            tx.rollback().await?;
            return Err(GreenifyError::InsufficientPoints {
                required: debit.amount,
                available,
            });
        }

        record_points(&mut tx, &debit).await?;
        tx.commit().await?;
        Ok(available - debit.amount)
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, GreenifyError> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT u.clerk_id, u.full_name, u.profile_image, \
                    COALESCE(SUM(r.points), 0)::BIGINT AS points \
             FROM users u LEFT JOIN rewards r ON r.user_id = u.clerk_id \
             WHERE u.deleted_at IS NULL \
             GROUP BY u.clerk_id, u.full_name, u.profile_image \
             ORDER BY points DESC, u.full_name ASC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
    }

    async fn user_activity(&self, user: &UserId) -> Result<UserActivity, GreenifyError> {
        let (reports, collections) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT (SELECT COUNT(*) FROM reports WHERE user_id = $1), \
                    (SELECT COUNT(*) FROM collected_wastes WHERE collector_id = $1)",
        )
        .bind(user.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(UserActivity {
            reports: u64::try_from(reports).unwrap_or_default(),
            collections: u64::try_from(collections).unwrap_or_default(),
        })
    }

    async fn notifications(
        &self,
        user: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, GreenifyError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, user_id, message, type, is_read, created_at FROM notifications \
             WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE) \
             ORDER BY created_at DESC, id DESC LIMIT $3",
        )
        .bind(user.as_str())
        .bind(unread_only)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_notification_read(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<bool, GreenifyError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id.get())
                .bind(user.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_all_notifications_read(&self, user: &UserId) -> Result<u64, GreenifyError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
