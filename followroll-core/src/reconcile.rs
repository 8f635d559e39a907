//! Multi-source merge into ranked records.
//!
//! Field precedence:
//!
//! | Field | Source |
//! |-------|--------|
//! | rank, days, roles | surviving sheet row |
//! | date | `now - days` (never a raw sheet date) |
//! | gifts | sheet override, else gifter tally, else 0 |
//! | sub, bits | subscription ledger, default false/0 |
//! | tips, override | sheet side maps, default 0/false |
//! | avatar | bulk lookup, default empty |

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{FeedRow, FeedSheet, FinalRecord, RosterSnapshot, SubscriptionLedger};

/// Merges sheet rows with subscription data and avatars.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    now: DateTime<Utc>,
}

impl Reconciler {
    /// Creates a reconciler anchored at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Rows in rank order: tenure descending, then first-seen position.
    pub fn rank_order(sheet: &FeedSheet) -> Vec<&FeedRow> {
        let mut ordered: Vec<(usize, &FeedRow)> = sheet.rows().iter().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| {
            b.tenure_days.cmp(&a.tenure_days).then_with(|| ia.cmp(ib))
        });
        ordered.into_iter().map(|(_, row)| row).collect()
    }

    /// Builds the final records in rank order.
    pub fn merge(
        &self,
        sheet: &FeedSheet,
        ledger: &SubscriptionLedger,
        avatars: &HashMap<String, String>,
    ) -> Vec<FinalRecord> {
        Self::rank_order(sheet)
            .into_iter()
            .zip(1u32..)
            .map(|(row, rank)| {
                let login = row.login();
                let facts = ledger.facts_for(login);
                FinalRecord {
                    login: login.to_string(),
                    display: row.identity.display.clone(),
                    days: row.tenure_days,
                    date: self.first_seen(row.tenure_days),
                    vip: row.roles.vip,
                    moderator: row.roles.moderator,
                    tier2: row.roles.tier2,
                    tier3: row.roles.tier3,
                    artist: row.roles.artist,
                    rank,
                    subscriber: facts.is_subscriber,
                    gifts: sheet.gift_override(login).unwrap_or(facts.gift_count),
                    bits: facts.bits_score,
                    tips: sheet.tip(login),
                    avatar_override: sheet.has_avatar_override(login),
                    avatar_url: avatars.get(login).cloned().unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Merges and wraps the records in a snapshot stamped with `now`.
    pub fn snapshot(
        &self,
        sheet: &FeedSheet,
        ledger: &SubscriptionLedger,
        avatars: &HashMap<String, String>,
    ) -> RosterSnapshot {
        RosterSnapshot::new(self.now, self.merge(sheet, ledger, avatars))
    }

    /// `now - days`, saturating at the earliest representable instant.
    fn first_seen(&self, days: i64) -> DateTime<Utc> {
        TimeDelta::try_days(days)
            .and_then(|delta| self.now.checked_sub_signed(delta))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, RoleFlags};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn sheet_of(rows: &[(&str, i64)]) -> FeedSheet {
        let mut sheet = FeedSheet::new();
        for (name, days) in rows {
            sheet.upsert(FeedRow::new(Identity::from_display(name), *days));
        }
        sheet
    }

    #[test]
    fn test_ranks_follow_tenure_descending() {
        let sheet = sheet_of(&[("carol", 3), ("alice", 30), ("bob", 12)]);
        let records = Reconciler::new(now()).merge(&sheet, &SubscriptionLedger::new(), &HashMap::new());

        let order: Vec<(&str, u32)> = records.iter().map(|r| (r.login.as_str(), r.rank)).collect();
        assert_eq!(order, vec![("alice", 1), ("bob", 2), ("carol", 3)]);
    }

    #[test]
    fn test_ties_keep_sheet_order() {
        let sheet = sheet_of(&[("dave", 7), ("erin", 7), ("frank", 9), ("gina", 7)]);
        let records = Reconciler::new(now()).merge(&sheet, &SubscriptionLedger::new(), &HashMap::new());

        let logins: Vec<&str> = records.iter().map(|r| r.login.as_str()).collect();
        assert_eq!(logins, vec!["frank", "dave", "erin", "gina"]);
        let ranks: Vec<u32> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_gift_precedence() {
        let mut sheet = sheet_of(&[("over", 3), ("tally", 2), ("none", 1)]);
        sheet.record_gift_override("over", 9);

        let mut ledger = SubscriptionLedger::new();
        ledger.add_gift("over");
        ledger.add_gift("tally");
        ledger.add_gift("tally");

        let records = Reconciler::new(now()).merge(&sheet, &ledger, &HashMap::new());
        let gifts: Vec<u32> = records.iter().map(|r| r.gifts).collect();
        assert_eq!(gifts, vec![9, 2, 0]);
    }

    #[test]
    fn test_date_derived_from_tenure() {
        let sheet = sheet_of(&[("alice", 10)]);
        let records = Reconciler::new(now()).merge(&sheet, &SubscriptionLedger::new(), &HashMap::new());
        assert_eq!(records[0].date, Utc.with_ymd_and_hms(2024, 5, 22, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_defaults_when_sources_are_silent() {
        let sheet = sheet_of(&[("alice", 1)]);
        let records = Reconciler::new(now()).merge(&sheet, &SubscriptionLedger::new(), &HashMap::new());
        let alice = &records[0];
        assert!(!alice.subscriber);
        assert_eq!(alice.bits, 0);
        assert_eq!(alice.tips, 0.0);
        assert!(!alice.avatar_override);
        assert_eq!(alice.avatar_url, "");
    }

    #[test]
    fn test_side_maps_and_roles_carried() {
        let mut sheet = FeedSheet::new();
        sheet.upsert(
            FeedRow::new(Identity::from_display("Alice"), 4).with_roles(RoleFlags {
                moderator: true,
                artist: true,
                ..RoleFlags::default()
            }),
        );
        sheet.record_tip("alice", 20.0);
        sheet.flag_avatar_override("alice");

        let mut ledger = SubscriptionLedger::new();
        ledger.set_bits("alice", 1200);

        let mut avatars = HashMap::new();
        avatars.insert("alice".to_string(), "https://cdn.example/alice.png".to_string());

        let records = Reconciler::new(now()).merge(&sheet, &ledger, &avatars);
        let alice = &records[0];
        assert_eq!(alice.display, "Alice");
        assert!(alice.moderator && alice.artist && !alice.vip);
        assert_eq!(alice.tips, 20.0);
        assert!(alice.avatar_override);
        assert_eq!(alice.bits, 1200);
        assert_eq!(alice.avatar_url, "https://cdn.example/alice.png");
    }

    #[test]
    fn test_absurd_tenure_does_not_panic() {
        let sheet = sheet_of(&[("ancient", i64::MAX)]);
        let records = Reconciler::new(now()).merge(&sheet, &SubscriptionLedger::new(), &HashMap::new());
        assert_eq!(records[0].date, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_snapshot_is_valid() {
        let sheet = sheet_of(&[("a", 1), ("b", 5), ("c", 5)]);
        let snapshot = Reconciler::new(now()).snapshot(&sheet, &SubscriptionLedger::new(), &HashMap::new());
        assert_eq!(snapshot.generated, now());
        assert!(snapshot.validate().is_ok());
    }
}
