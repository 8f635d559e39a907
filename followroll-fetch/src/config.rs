//! Environment configuration.
//!
//! Every secret comes from the environment and is never logged; the
//! `Debug` impl redacts them.

use std::fmt;

/// Client identifier; required for any authenticated call.
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";
/// Initial access token.
pub const ACCESS_TOKEN_ENV: &str = "ACCESS_TOKEN";
/// Login of the channel whose subscriptions are read.
pub const BROADCASTER_LOGIN_ENV: &str = "BROADCASTER_LOGIN";
/// Client secret.
pub const CLIENT_SECRET_ENV: &str = "CLIENT_SECRET";
/// Refresh token; enables the refresh-token grant together with the secret.
pub const REFRESH_TOKEN_ENV: &str = "REFRESH_TOKEN";

/// Helix credentials and target channel.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HelixConfig {
    /// Client identifier (empty when unset).
    pub client_id: String,
    /// Initial access token (empty when unset).
    pub access_token: String,
    /// Lower-cased broadcaster login (empty when unset).
    pub broadcaster_login: String,
    /// Client secret.
    pub client_secret: Option<String>,
    /// Refresh token.
    pub refresh_token: Option<String>,
}

impl HelixConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            client_id: read(CLIENT_ID_ENV).unwrap_or_default(),
            access_token: read(ACCESS_TOKEN_ENV).unwrap_or_default(),
            broadcaster_login: read(BROADCASTER_LOGIN_ENV)
                .map(|v| v.to_lowercase())
                .unwrap_or_default(),
            client_secret: read(CLIENT_SECRET_ENV),
            refresh_token: read(REFRESH_TOKEN_ENV),
        }
    }

    /// Returns true if a client identifier is configured.
    pub fn has_client_id(&self) -> bool {
        !self.client_id.is_empty()
    }
}

impl fmt::Debug for HelixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |present: bool| if present { "<redacted>" } else { "<unset>" };
        f.debug_struct("HelixConfig")
            .field("client_id", &self.client_id)
            .field("access_token", &redact(!self.access_token.is_empty()))
            .field("broadcaster_login", &self.broadcaster_login)
            .field("client_secret", &redact(self.client_secret.is_some()))
            .field("refresh_token", &redact(self.refresh_token.is_some()))
            .finish()
    }
}
