//! Per-connection subscription manager.
//!
//! Tracks which accounts a WebSocket client follows and filters events by
//! their audience server-side.

use std::collections::HashSet;

use crate::domain::{MarketEvent, UserId};

/// Manages the set of followed accounts for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed accounts. Ignored while `subscribe_all` is set.
    user_ids: HashSet<UserId>,
    /// Wildcard `"*"` subscription.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds accounts to the subscription set, optionally enabling the wildcard.
    pub fn subscribe(&mut self, ids: &[UserId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.user_ids.extend(ids.iter().copied());
    }

    /// Removes accounts from the subscription set. `"*"` drops the wildcard.
    pub fn unsubscribe(&mut self, ids: &[UserId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.user_ids.remove(id);
        }
    }

    /// Returns `true` if any account in the event's audience is followed.
    #[must_use]
    pub fn matches(&self, event: &MarketEvent) -> bool {
        self.subscribe_all
            || event
                .audience()
                .iter()
                .any(|id| self.user_ids.contains(id))
    }

    /// Number of explicitly followed accounts.
    #[must_use]
    pub fn count(&self) -> usize {
        self.user_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::MessageId;

    fn message_for(recipient: UserId) -> MarketEvent {
        MarketEvent::MessageCreated {
            message_id: MessageId::new(),
            recipient,
            title: "hello".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&message_for(UserId::new())));
    }

    #[test]
    fn follows_only_subscribed_accounts() {
        let mut mgr = SubscriptionManager::new();
        let me = UserId::new();
        mgr.subscribe(&[me], false);
        assert!(mgr.matches(&message_for(me)));
        assert!(!mgr.matches(&message_for(UserId::new())));
    }

    #[test]
    fn wildcard_matches_everything_until_dropped() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(&message_for(UserId::new())));
        mgr.unsubscribe(&[], true);
        assert!(!mgr.is_subscribed_all());
        assert!(!mgr.matches(&message_for(UserId::new())));
    }

    #[test]
    fn unsubscribe_removes_account() {
        let mut mgr = SubscriptionManager::new();
        let me = UserId::new();
        mgr.subscribe(&[me, UserId::new()], false);
        assert_eq!(mgr.count(), 2);
        mgr.unsubscribe(&[me], false);
        assert!(!mgr.matches(&message_for(me)));
        assert_eq!(mgr.count(), 1);
    }
}
