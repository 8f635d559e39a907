//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for Helix calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The credential could not be obtained or was rejected after a refresh.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Non-success status other than a handled 401.
    #[error("Helix request failed {status}: {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Returns true for authentication failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Auth(_))
    }

    /// Returns the HTTP status of a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Remote { status, .. } => Some(*status),
            FetchError::Auth(AuthError::TokenEndpoint { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// Auth Error
// ============================================================================

/// Error type for credential handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No client identifier configured.
    #[error("CLIENT_ID is not configured")]
    MissingClientId,

    /// Token endpoint returned a non-success status.
    #[error("Failed to refresh access token: {status} {body}")]
    TokenEndpoint {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A refreshed credential was rejected again.
    #[error("Credential rejected after refresh for {endpoint}")]
    Rejected {
        /// Endpoint that returned the second 401.
        endpoint: String,
    },

    /// Token endpoint answered with something unusable.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure while talking to the token endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for HttpError {
    fn from(err: url::ParseError) -> Self {
        HttpError::InvalidUrl(err.to_string())
    }
}
