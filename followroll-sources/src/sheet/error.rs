//! Feed errors.

use followroll_fetch::HttpError;
use thiserror::Error;

/// Feed download errors.
#[derive(Debug, Error)]
pub enum SheetError {
    /// The feed URL answered with a non-success status.
    #[error("Failed to download CSV: {status} {body}")]
    Download {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
}
