//! Helix response types.
//!
//! Only the fields the roster needs are modelled; everything else in the
//! payloads is ignored.

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Endpoints
// ============================================================================

/// User lookup, by one or more `login` parameters.
pub const USERS_ENDPOINT: &str = "users";

/// Broadcaster subscriptions, cursor paginated.
pub const SUBSCRIPTIONS_ENDPOINT: &str = "subscriptions";

/// Bits leaderboard.
pub const LEADERBOARD_ENDPOINT: &str = "bits/leaderboard";

/// Maximum `login` parameters per bulk user lookup.
pub const USERS_BATCH_SIZE: usize = 100;

/// Leaderboard entries requested.
pub const LEADERBOARD_COUNT: &str = "100";

/// Leaderboard period.
pub const LEADERBOARD_PERIOD: &str = "all";

// ============================================================================
// Response Types
// ============================================================================

/// `{ "data": [...] }` envelope shared by every Helix endpoint.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    /// Payload entries.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T: serde::de::DeserializeOwned> DataEnvelope<T> {
    /// Decodes an envelope from a page.
    ///
    /// # Errors
    ///
    /// Returns the decode error if `data` entries do not match `T`.
    pub fn from_page(page: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(page)
    }
}

/// Entry of `GET users`.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixUser {
    /// Numeric user id.
    pub id: String,
    /// Lower-case login.
    pub login: String,
    /// Avatar URL.
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Entry of `GET subscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixSubscription {
    /// Subscriber login.
    #[serde(default)]
    pub user_login: Option<String>,
    /// Whether the subscription was gifted.
    #[serde(default)]
    pub is_gift: bool,
    /// Login of the gifter, when gifted.
    #[serde(default)]
    pub gifter_login: Option<String>,
}

/// Entry of `GET bits/leaderboard`.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixLeaderboardEntry {
    /// Login, when the API includes it.
    #[serde(default)]
    pub user_login: Option<String>,
    /// Display name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Bits cheered in the period.
    #[serde(default)]
    pub score: u64,
}

impl HelixLeaderboardEntry {
    /// Join key: the login when present, otherwise the display name.
    pub fn key(&self) -> Option<String> {
        self.user_login
            .as_deref()
            .or(self.user_name.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }
}
