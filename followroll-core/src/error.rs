//! Core error types for `FollowRoll`.

use thiserror::Error;

/// Core error type for `FollowRoll` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record set violates one of its invariants.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
