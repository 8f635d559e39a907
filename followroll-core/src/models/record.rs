//! Output record types.
//!
//! The JSON shape of [`RosterSnapshot`] is consumed by the published page,
//! so field names here are a wire contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Final Record
// ============================================================================

/// One reconciled, ranked person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecord {
    /// Lower-cased handle.
    pub login: String,
    /// Display name from the sheet.
    pub display: String,
    /// Days following.
    pub days: i64,
    /// First-follow date derived from `days`.
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    /// VIP badge.
    pub vip: bool,
    /// Channel moderator.
    #[serde(rename = "mod")]
    pub moderator: bool,
    /// Tier 2 subscriber.
    #[serde(rename = "t2")]
    pub tier2: bool,
    /// Tier 3 subscriber.
    #[serde(rename = "t3")]
    pub tier3: bool,
    /// Credited artist.
    #[serde(rename = "art")]
    pub artist: bool,
    /// 1-based follower number.
    #[serde(rename = "fNum")]
    pub rank: u32,
    /// Currently subscribed.
    #[serde(rename = "sub")]
    pub subscriber: bool,
    /// Gift subscriptions given.
    pub gifts: u32,
    /// All-time bits score.
    pub bits: u64,
    /// Tip total. Whole amounts are written as JSON integers.
    #[serde(serialize_with = "whole_number::serialize")]
    pub tips: f64,
    /// Avatar override requested by the sheet.
    #[serde(rename = "override")]
    pub avatar_override: bool,
    /// Profile image URL, empty when unknown.
    #[serde(rename = "avatar")]
    pub avatar_url: String,
}

// ============================================================================
// Roster Snapshot
// ============================================================================

/// The exported artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// When the snapshot was produced.
    #[serde(with = "iso_millis")]
    pub generated: DateTime<Utc>,
    /// Records in rank order.
    pub records: Vec<FinalRecord>,
}

impl RosterSnapshot {
    /// Creates a snapshot stamped with `generated`.
    pub fn new(generated: DateTime<Utc>, records: Vec<FinalRecord>) -> Self {
        Self { generated, records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validates ranking invariants.
    ///
    /// Ranks must run 1..N in emitted order with non-increasing tenure.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` naming the first offending record.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut previous_days: Option<i64> = None;
        for (pos, record) in self.records.iter().enumerate() {
            let expected = u32::try_from(pos + 1)
                .map_err(|_| CoreError::InvalidData("too many records".to_string()))?;
            if record.rank != expected {
                return Err(CoreError::InvalidData(format!(
                    "{}: rank {} at position {}",
                    record.login, record.rank, expected
                )));
            }
            if previous_days.is_some_and(|days| days < record.days) {
                return Err(CoreError::InvalidData(format!(
                    "{}: tenure {} out of order",
                    record.login, record.days
                )));
            }
            previous_days = Some(record.days);
        }
        Ok(())
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Timestamp format
// ============================================================================

/// RFC 3339 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Whole-number amounts
// ============================================================================

/// Writes integral floats as integers, so `0.0` reads back as `0`.
mod whole_number {
    use serde::Serializer;

    /// Largest magnitude below which every integer is exact in an `f64`.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    #[allow(clippy::trivially_copy_pass_by_ref, clippy::float_cmp, clippy::cast_possible_truncation)]
    pub fn serialize<S>(value: &f64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
            s.serialize_i64(*value as i64)
        } else {
            s.serialize_f64(*value)
        }
    }
}
