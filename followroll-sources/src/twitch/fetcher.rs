//! Roster data from Helix.
//!
//! # Example
//!
//! ```ignore
//! let fetcher = RosterFetcher::new(Arc::new(helix));
//! let ledger = match fetcher.resolve_identity("somestreamer").await? {
//!     Some(id) => fetcher.load_subscription_facts(&id).await?,
//!     None => SubscriptionLedger::new(),
//! };
//! let avatars = fetcher.load_avatars(&sheet.logins()).await;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use followroll_core::SubscriptionLedger;
use followroll_fetch::{FetchError, PagedClient, query};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use super::api::{
    DataEnvelope, HelixLeaderboardEntry, HelixSubscription, HelixUser, LEADERBOARD_COUNT,
    LEADERBOARD_ENDPOINT, LEADERBOARD_PERIOD, SUBSCRIPTIONS_ENDPOINT, USERS_BATCH_SIZE,
    USERS_ENDPOINT,
};
use super::error::TwitchError;

/// Avatar batches in flight at once.
const AVATAR_CONCURRENCY: usize = 4;

// ============================================================================
// Fetcher
// ============================================================================

/// Fetches identities, subscription facts and avatars.
#[derive(Clone)]
pub struct RosterFetcher {
    helix: Arc<PagedClient>,
    avatar_concurrency: usize,
}

impl RosterFetcher {
    /// Creates a fetcher over an authenticated Helix client.
    pub fn new(helix: Arc<PagedClient>) -> Self {
        Self {
            helix,
            avatar_concurrency: AVATAR_CONCURRENCY,
        }
    }

    /// Sets how many avatar batches may run at once (at least 1).
    pub fn with_avatar_concurrency(mut self, limit: usize) -> Self {
        self.avatar_concurrency = limit.max(1);
        self
    }

    /// Looks up a user id by login.
    ///
    /// An empty login or an unknown user yields `None`.
    ///
    /// # Errors
    ///
    /// Returns the Helix failure if the lookup call fails.
    #[instrument(skip(self))]
    pub async fn resolve_identity(&self, login: &str) -> Result<Option<String>, TwitchError> {
        let login = login.trim();
        if login.is_empty() {
            debug!("No login configured, skipping lookup");
            return Ok(None);
        }

        let page = self
            .helix
            .request(USERS_ENDPOINT, &query([("login", login)]))
            .await?;
        let users = decode::<HelixUser>(page)?;
        let id = users.into_iter().next().map(|u| u.id).filter(|id| !id.is_empty());

        match id {
            Some(ref id) => debug!(%id, "Resolved broadcaster"),
            None => warn!("Broadcaster login not found"),
        }
        Ok(id)
    }

    /// Collects subscribers, gifter tallies and leaderboard scores.
    ///
    /// An empty broadcaster id yields an empty ledger without any call.
    ///
    /// # Errors
    ///
    /// Returns the first Helix failure; partial data is discarded.
    #[instrument(skip(self))]
    pub async fn load_subscription_facts(&self, broadcaster_id: &str) -> Result<SubscriptionLedger, TwitchError> {
        let mut ledger = SubscriptionLedger::new();
        if broadcaster_id.is_empty() {
            return Ok(ledger);
        }

        let pages = self
            .helix
            .request_all(SUBSCRIPTIONS_ENDPOINT, &query([("broadcaster_id", broadcaster_id)]))
            .await?;
        for page in pages {
            for sub in decode::<HelixSubscription>(page)? {
                if let Some(login) = sub.user_login.as_deref().filter(|l| !l.is_empty()) {
                    ledger.add_subscriber(login);
                }
                if sub.is_gift {
                    if let Some(gifter) = sub.gifter_login.as_deref().filter(|g| !g.is_empty()) {
                        ledger.add_gift(gifter);
                    }
                }
            }
        }

        let leaderboard = self
            .helix
            .request(
                LEADERBOARD_ENDPOINT,
                &query([("count", LEADERBOARD_COUNT), ("period", LEADERBOARD_PERIOD)]),
            )
            .await?;
        for entry in decode::<HelixLeaderboardEntry>(leaderboard)? {
            if let Some(key) = entry.key() {
                ledger.set_bits(&key, entry.score);
            }
        }

        info!(
            subscribers = ledger.subscriber_count(),
            gifters = ledger.gifter_count(),
            leaderboard = ledger.leaderboard_len(),
            "Subscription facts loaded"
        );
        Ok(ledger)
    }

    /// Looks up avatar URLs in batches of at most 100 logins.
    ///
    /// A failed batch is logged and skipped; logins it covered have no entry.
    #[instrument(skip(self, logins), fields(logins = logins.len()))]
    pub async fn load_avatars(&self, logins: &[String]) -> HashMap<String, String> {
        let batches: Vec<&[String]> = logins.chunks(USERS_BATCH_SIZE).collect();
        let results: Vec<Result<Vec<HelixUser>, TwitchError>> = stream::iter(batches.into_iter().enumerate())
            .map(|(batch, chunk)| self.avatar_batch(batch, chunk))
            .buffer_unordered(self.avatar_concurrency)
            .collect()
            .await;

        let mut avatars = HashMap::new();
        for result in results {
            match result {
                Ok(users) => {
                    for user in users {
                        if let Some(url) = user.profile_image_url {
                            avatars.insert(user.login.to_lowercase(), url);
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Skipping avatar batch"),
            }
        }

        debug!(found = avatars.len(), "Avatars loaded");
        avatars
    }

    async fn avatar_batch(&self, batch: usize, logins: &[String]) -> Result<Vec<HelixUser>, TwitchError> {
        let params = query(logins.iter().map(|l| ("login", l.as_str())));
        let page = self
            .helix
            .request(USERS_ENDPOINT, &params)
            .await
            .map_err(|source| TwitchError::AvatarBatch { batch, source })?;
        decode::<HelixUser>(page).map_err(|source| TwitchError::AvatarBatch { batch, source })
    }
}

fn decode<T: serde::de::DeserializeOwned>(page: serde_json::Value) -> Result<Vec<T>, FetchError> {
    Ok(DataEnvelope::<T>::from_page(page)?.data)
}

// ============================================================================
// Tests
// ============================================================================
