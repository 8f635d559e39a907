//! Subscription-derived types.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Subscription facts for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFacts {
    /// Currently subscribed.
    pub is_subscriber: bool,
    /// Gift subscriptions this identity has given.
    pub gift_count: u32,
    /// All-time bits leaderboard score.
    pub bits_score: u64,
}

/// Aggregated subscription data for a channel, keyed by lower-cased login.
///
/// Built once per run from every subscription page and a single leaderboard
/// call.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionLedger {
    subscribers: HashSet<String>,
    gifts: HashMap<String, u32>,
    bits: HashMap<String, u64>,
}

impl SubscriptionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an identity as subscribed.
    pub fn add_subscriber(&mut self, login: &str) {
        self.subscribers.insert(login.to_lowercase());
    }

    /// Counts one gifted subscription for a gifter.
    pub fn add_gift(&mut self, gifter: &str) {
        *self.gifts.entry(gifter.to_lowercase()).or_insert(0) += 1;
    }

    /// Records a leaderboard score, replacing any previous one.
    pub fn set_bits(&mut self, login: &str, score: u64) {
        self.bits.insert(login.to_lowercase(), score);
    }

    /// Facts for one identity, defaulting to nothing known.
    pub fn facts_for(&self, login: &str) -> SubscriptionFacts {
        SubscriptionFacts {
            is_subscriber: self.subscribers.contains(login),
            gift_count: self.gifts.get(login).copied().unwrap_or(0),
            bits_score: self.bits.get(login).copied().unwrap_or(0),
        }
    }

    /// Number of distinct subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of distinct gifters.
    pub fn gifter_count(&self) -> usize {
        self.gifts.len()
    }

    /// Number of leaderboard entries.
    pub fn leaderboard_len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty() && self.gifts.is_empty() && self.bits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gift_tally_accumulates() {
        let mut ledger = SubscriptionLedger::new();
        ledger.add_gift("Bob");
        ledger.add_gift("bob");
        ledger.add_subscriber("bob");

        let facts = ledger.facts_for("bob");
        assert!(facts.is_subscriber);
        assert_eq!(facts.gift_count, 2);
        assert_eq!(facts.bits_score, 0);
    }

    #[test]
    fn test_unknown_identity_defaults() {
        let ledger = SubscriptionLedger::new();
        assert_eq!(ledger.facts_for("ghost"), SubscriptionFacts::default());
        assert!(ledger.is_empty());
    }
}
