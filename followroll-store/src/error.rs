//! Store error types.

use followroll_core::CoreError;
use thiserror::Error;

/// Errors that can occur while exporting a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The snapshot broke a roster invariant and was not written.
    #[error("Refusing to export: {0}")]
    Invalid(#[from] CoreError),
}

impl StoreError {
    /// Returns true if the target file did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
