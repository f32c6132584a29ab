//! Reward endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{RewardLedgerEntry, RewardTier};

/// Body of `POST /rewards/redeem`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RedeemRequest {
    /// Catalog reward ID.
    pub reward_id: u32,
}

/// Balance, tier and recent ledger entries.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewardHistoryResponse {
    /// Current balance.
    pub balance: i64,
    /// Display tier.
    pub tier: RewardTier,
    /// Most recent ledger entries.
    pub entries: Vec<RewardLedgerEntry>,
}
