//! Sheet-derived types.
//!
//! - [`RoleFlags`] - Checkbox columns of a sheet row
//! - [`FeedRow`] - One surviving row per identity
//! - [`FeedSheet`] - The parsed sheet with its side maps

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::identity::Identity;

// ============================================================================
// Role Flags
// ============================================================================

/// Role checkboxes maintained by the sheet author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlags {
    /// VIP badge.
    pub vip: bool,
    /// Channel moderator.
    pub moderator: bool,
    /// Tier 2 subscriber.
    pub tier2: bool,
    /// Tier 3 subscriber.
    pub tier3: bool,
    /// Credited artist.
    pub artist: bool,
}

// ============================================================================
// Feed Row
// ============================================================================

/// A normalized sheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRow {
    /// Who this row describes.
    pub identity: Identity,
    /// Days following; the ranking key.
    pub tenure_days: i64,
    /// Role checkboxes.
    pub roles: RoleFlags,
}

impl FeedRow {
    /// Creates a row with no roles set.
    pub fn new(identity: Identity, tenure_days: i64) -> Self {
        Self {
            identity,
            tenure_days,
            roles: RoleFlags::default(),
        }
    }

    /// Sets the role flags.
    pub fn with_roles(mut self, roles: RoleFlags) -> Self {
        self.roles = roles;
        self
    }

    /// Returns the join key.
    pub fn login(&self) -> &str {
        &self.identity.login
    }
}

// ============================================================================
// Feed Sheet
// ============================================================================

/// The parsed sheet: one row per identity plus the override side maps.
///
/// Rows keep the position at which their identity was first seen, even when
/// a later duplicate replaces the row's contents.
#[derive(Debug, Clone, Default)]
pub struct FeedSheet {
    rows: Vec<FeedRow>,
    index: HashMap<String, usize>,
    tips: HashMap<String, f64>,
    gift_overrides: HashMap<String, u32>,
    avatar_overrides: HashSet<String>,
}

impl FeedSheet {
    /// Creates an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row, resolving duplicates by tenure.
    ///
    /// A duplicate replaces the stored row only when its tenure is strictly
    /// larger. Returns true if `row` was stored.
    pub fn upsert(&mut self, row: FeedRow) -> bool {
        match self.index.get(row.login()) {
            Some(&pos) => {
                if self.rows[pos].tenure_days < row.tenure_days {
                    self.rows[pos] = row;
                    true
                } else {
                    false
                }
            }
            None => {
                self.index.insert(row.login().to_string(), self.rows.len());
                self.rows.push(row);
                true
            }
        }
    }

    /// Records a tip amount. Non-positive amounts are ignored.
    pub fn record_tip(&mut self, login: &str, amount: f64) {
        if amount > 0.0 {
            self.tips.insert(login.to_string(), amount);
        }
    }

    /// Records a gift-count override. Zero is ignored.
    pub fn record_gift_override(&mut self, login: &str, count: u32) {
        if count > 0 {
            self.gift_overrides.insert(login.to_string(), count);
        }
    }

    /// Flags an identity for an avatar override.
    pub fn flag_avatar_override(&mut self, login: &str) {
        self.avatar_overrides.insert(login.to_string());
    }

    /// Rows in first-seen order.
    pub fn rows(&self) -> &[FeedRow] {
        &self.rows
    }

    /// Looks up the surviving row for an identity.
    pub fn get(&self, login: &str) -> Option<&FeedRow> {
        self.index.get(login).map(|&pos| &self.rows[pos])
    }

    /// Handles of every surviving row, in first-seen order.
    pub fn logins(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.identity.login.clone()).collect()
    }

    /// Number of surviving rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows survived parsing.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tip amount for an identity, 0 when absent.
    pub fn tip(&self, login: &str) -> f64 {
        self.tips.get(login).copied().unwrap_or(0.0)
    }

    /// Gift override for an identity.
    pub fn gift_override(&self, login: &str) -> Option<u32> {
        self.gift_overrides.get(login).copied()
    }

    /// Returns true if the identity is flagged for an avatar override.
    pub fn has_avatar_override(&self, login: &str) -> bool {
        self.avatar_overrides.contains(login)
    }

    /// All recorded tips.
    pub fn tips(&self) -> &HashMap<String, f64> {
        &self.tips
    }

    /// All recorded gift overrides.
    pub fn gift_overrides(&self) -> &HashMap<String, u32> {
        &self.gift_overrides
    }

    /// All identities flagged for an avatar override.
    pub fn avatar_overrides(&self) -> &HashSet<String> {
        &self.avatar_overrides
    }
}

// ============================================================================
// Tests
// ============================================================================
