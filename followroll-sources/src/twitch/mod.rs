//! Twitch Helix source.
//!
//! Supplies everything the roster knows about a channel's supporters:
//!
//! - Broadcaster id by login (`GET users?login=`)
//! - Subscribers and gifter tallies (`GET subscriptions`, every page)
//! - All-time bits leaderboard (`GET bits/leaderboard`, one call)
//! - Avatar URLs (`GET users` with up to 100 logins per call)
//!
//! Authentication, the single 401 retry and pagination live in
//! `followroll-fetch`; this module only knows the endpoints and payloads.

mod api;
mod error;
mod fetcher;

pub use api::{
    DataEnvelope, HelixLeaderboardEntry, HelixSubscription, HelixUser, USERS_BATCH_SIZE,
};
pub use error::TwitchError;
pub use fetcher::RosterFetcher;
