//! Reward tiers and the redeemable reward catalog.
//!
//! Tiers are display-only: they are derived from the balance and never
//! change how many points an action earns.

use serde::Serialize;
use utoipa::ToSchema;

/// Display tier derived from a point balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RewardTier {
    /// 1-based level number.
    pub level: u32,
    /// Tier title.
    pub title: &'static str,
    /// Minimum balance for this tier.
    pub min_points: i64,
    /// Balance needed for the next tier, if any.
    pub next_threshold: Option<i64>,
}

const TIERS: [(&str, i64); 5] = [
    ("Eco Beginner", 0),
    ("Eco Warrior", 100),
    ("Green Innovator", 500),
    ("Sustainability Champion", 1000),
    ("Zero Waste Master", 2000),
];

impl RewardTier {
    /// Returns the tier for a balance. Negative balances fall in the first tier.
    #[must_use]
    pub fn for_points(points: i64) -> Self {
        let idx = TIERS
            .iter()
            .rposition(|&(_, min)| points >= min)
            .unwrap_or(0);
        let (title, min_points) = TIERS.get(idx).copied().unwrap_or(("Eco Beginner", 0));
        let next_threshold = TIERS.get(idx + 1).map(|&(_, min)| min);
        Self {
            level: u32::try_from(idx + 1).unwrap_or(1),
            title,
            min_points,
            next_threshold,
        }
    }
}

/// A reward that can be bought with points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogItem {
    /// Catalog ID.
    pub id: u32,
    /// Reward title.
    pub title: &'static str,
    /// Reward description.
    pub description: &'static str,
    /// Price in points.
    pub points: i64,
}

const CATALOG: [CatalogItem; 3] = [
    CatalogItem {
        id: 1,
        title: "Eco-friendly Water Bottle",
        description: "Reusable stainless steel water bottle",
        points: 200,
    },
    CatalogItem {
        id: 2,
        title: "Bamboo Cutlery Set",
        description: "Sustainable bamboo cutlery set with carrying case",
        points: 300,
    },
    CatalogItem {
        id: 3,
        title: "Organic Cotton Tote",
        description: "Eco-friendly shopping bag made from organic cotton",
        points: 150,
    },
];

/// Returns every redeemable reward.
#[must_use]
pub fn catalog() -> &'static [CatalogItem] {
    &CATALOG
}

/// Looks up a catalog reward by ID.
#[must_use]
pub fn catalog_item(id: u32) -> Option<&'static CatalogItem> {
    CATALOG.iter().find(|item| item.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_points_is_first_tier() {
        let tier = RewardTier::for_points(0);
        assert_eq!(tier.level, 1);
        assert_eq!(tier.title, "Eco Beginner");
        assert_eq!(tier.next_threshold, Some(100));
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(RewardTier::for_points(99).level, 1);
        assert_eq!(RewardTier::for_points(100).level, 2);
        assert_eq!(RewardTier::for_points(1999).title, "Sustainability Champion");
    }

    #[test]
    fn top_tier_has_no_next_threshold() {
        let tier = RewardTier::for_points(5_000);
        assert_eq!(tier.level, 5);
        assert_eq!(tier.next_threshold, None);
    }

    #[test]
    fn negative_balance_is_first_tier() {
        assert_eq!(RewardTier::for_points(-10).level, 1);
    }

    #[test]
    fn catalog_lookup() {
        assert_eq!(catalog().len(), 3);
        assert_eq!(catalog_item(2).map(|i| i.points), Some(300));
        assert!(catalog_item(99).is_none());
    }
}
