//! Per-connection subscription manager.
//!
//! Tracks which reports a WebSocket client follows and filters events
//! server-side.

use std::collections::HashSet;

use crate::domain::ReportId;

/// Manages the set of report subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed report IDs. Ignored while `subscribe_all` is set.
    report_ids: HashSet<ReportId>,
    /// Wildcard `"*"`: the client follows every report, including ones
    /// submitted after subscribing.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds report IDs to the subscription set.
    pub fn subscribe(&mut self, ids: &[ReportId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.report_ids.extend(ids.iter().copied());
    }

    /// Removes report IDs. `wildcard` turns the wildcard off.
    pub fn unsubscribe(&mut self, ids: &[ReportId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.report_ids.remove(id);
        }
    }

    /// Returns `true` if events for `report_id` should be forwarded.
    #[must_use]
    pub fn matches(&self, report_id: ReportId) -> bool {
        self.subscribe_all || self.report_ids.contains(&report_id)
    }

    /// Returns the number of explicitly subscribed report IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.report_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(ReportId::new(1)));
    }

    #[test]
    fn subscribe_specific_report() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[ReportId::new(5)], false);
        assert!(mgr.matches(ReportId::new(5)));
        assert!(!mgr.matches(ReportId::new(6)));
        assert_eq!(mgr.count(), 1);
    }

    #[test]
    fn wildcard_on_and_off() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[ReportId::new(2)], true);
        assert!(mgr.matches(ReportId::new(99)));

        mgr.unsubscribe(&[], true);
        assert!(!mgr.is_subscribed_all());
        assert!(!mgr.matches(ReportId::new(99)));
        assert!(mgr.matches(ReportId::new(2)));
    }
}
