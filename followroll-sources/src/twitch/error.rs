//! Twitch-specific errors.

use followroll_fetch::FetchError;
use thiserror::Error;

/// Twitch-specific errors.
#[derive(Debug, Error)]
pub enum TwitchError {
    /// A Helix call failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// One bulk avatar lookup failed. Recovered by the fetcher.
    #[error("Avatar batch {batch} failed: {source}")]
    AvatarBatch {
        /// Zero-based batch index.
        batch: usize,
        /// Underlying failure.
        #[source]
        source: FetchError,
    },
}
