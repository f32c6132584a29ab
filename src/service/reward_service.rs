//! Reward service: balances, tiers, history, redemption and leaderboard.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::registered_user;
use crate::domain::rewards::{catalog, catalog_item};
use crate::domain::{
    CatalogItem, LeaderboardEntry, PointsGrant, RewardLedgerEntry, RewardTier, Transaction,
    TransactionKind, UserId,
};
use crate::error::GreenifyError;
use crate::persistence::Store;

/// Balance plus its display tier.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewardSummary {
    /// Current balance.
    pub balance: i64,
    /// Display tier for the balance.
    pub tier: RewardTier,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Redemption {
    /// Reward bought.
    pub reward: CatalogItem,
    /// Balance after the debit.
    pub balance: i64,
}

/// Dashboard counters for one user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    /// Current balance.
    pub points: i64,
    /// Display tier.
    pub tier: RewardTier,
    /// Reports submitted.
    pub reports_submitted: u64,
    /// Cleanups verified.
    pub wastes_collected: u64,
}

/// Read and redeem operations over the reward ledger.
#[derive(Debug, Clone)]
pub struct RewardService {
    store: Arc<dyn Store>,
}

impl RewardService {
    /// Creates a new `RewardService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Balance and tier.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn summary(&self, caller: &UserId) -> Result<RewardSummary, GreenifyError> {
        let balance = self.store.balance(caller).await?;
        Ok(RewardSummary {
            balance,
            tier: RewardTier::for_points(balance),
        })
    }

    /// Most recent ledger entries.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn ledger(
        &self,
        caller: &UserId,
        limit: u32,
    ) -> Result<Vec<RewardLedgerEntry>, GreenifyError> {
        self.store.ledger(caller, limit).await
    }

    /// Most recent transactions.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn transactions(
        &self,
        caller: &UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>, GreenifyError> {
        self.store.transactions(caller, limit).await
    }

    /// Redeemable rewards.
    #[must_use]
    pub fn catalog(&self) -> &'static [CatalogItem] {
        catalog()
    }

    /// Spends points on a catalog reward.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::RewardNotFound`] for an unknown reward and
    /// [`GreenifyError::InsufficientPoints`] when the balance is too low.
    pub async fn redeem(&self, caller: &UserId, reward_id: u32) -> Result<Redemption, GreenifyError> {
        registered_user(self.store.as_ref(), caller).await?;
        let item = catalog_item(reward_id).ok_or(GreenifyError::RewardNotFound(reward_id))?;

        let balance = self
            .store
            .redeem(PointsGrant {
                user_id: caller.clone(),
                kind: TransactionKind::Redeemed,
                amount: item.points,
                description: format!("Redeemed {}", item.title),
            })
            .await?;

        tracing::info!(user = %caller, reward_id, points = item.points, balance, "reward redeemed");
        Ok(Redemption {
            reward: *item,
            balance,
        })
    }

    /// Top users by balance.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, GreenifyError> {
        self.store.leaderboard(limit).await
    }

    /// Points, tier and activity counters for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn stats(&self, caller: &UserId) -> Result<DashboardStats, GreenifyError> {
        let points = self.store.balance(caller).await?;
        let activity = self.store.user_activity(caller).await?;
        Ok(DashboardStats {
            points,
            tier: RewardTier::for_points(points),
            reports_submitted: activity.reports,
            wastes_collected: activity.collections,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{NewReport, UserProfile};
    use crate::persistence::MemoryStore;

    async fn service_with_points(points: i64) -> (RewardService, UserId) {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::from("saver");
        let profile = UserProfile {
            clerk_id: user.clone(),
            email: "saver@example.com".to_string(),
            full_name: "Saver".to_string(),
            profile_image: None,
        };
        assert!(store.insert_user_if_absent(&profile).await.is_ok());
        let report = NewReport {
            user_id: user.clone(),
            location: "https://maps.example/x".to_string(),
            waste_type: "glass".to_string(),
            amount: "1kg".to_string(),
            image_url: None,
            verification_result: None,
        };
        let grant = PointsGrant {
            user_id: user.clone(),
            kind: TransactionKind::EarnedReport,
            amount: points,
            description: "seed".to_string(),
        };
        assert!(store.create_report(report, Some(grant)).await.is_ok());
        (RewardService::new(store), user)
    }

    #[tokio::test]
    async fn redeem_debits_balance() {
        let (service, user) = service_with_points(250).await;
        let Ok(redemption) = service.redeem(&user, 1).await else {
            panic!("redeem failed");
        };
        assert_eq!(redemption.balance, 50);
        assert_eq!(redemption.reward.title, "Eco-friendly Water Bottle");
        let Ok(history) = service.transactions(&user, 10).await else {
            panic!("history failed");
        };
        assert!(history.iter().any(|t| t.kind == TransactionKind::Redeemed && t.amount == 200));
    }

    #[tokio::test]
    async fn redeem_without_enough_points_fails() {
        let (service, user) = service_with_points(100).await;
        let result = service.redeem(&user, 2).await;
        assert!(matches!(
            result,
            Err(GreenifyError::InsufficientPoints {
                required: 300,
                available: 100
            })
        ));
        assert_eq!(service.summary(&user).await.map(|s| s.balance).ok(), Some(100));
    }

    #[tokio::test]
    async fn unknown_reward_is_not_found() {
        let (service, user) = service_with_points(1000).await;
        assert!(matches!(
            service.redeem(&user, 99).await,
            Err(GreenifyError::RewardNotFound(99))
        ));
    }

    #[tokio::test]
    async fn stats_report_tier_and_counts() {
        let (service, user) = service_with_points(120).await;
        let Ok(stats) = service.stats(&user).await else {
            panic!("stats failed");
        };
        assert_eq!(stats.points, 120);
        assert_eq!(stats.tier.title, "Eco Warrior");
        assert_eq!(stats.reports_submitted, 1);
        assert_eq!(stats.wastes_collected, 0);
    }
}
