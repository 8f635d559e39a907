//! Credential state and OAuth refresh.
//!
//! The bearer token lives in an [`AuthState`] shared by reference between
//! the [`AuthManager`] (the only writer) and everything that sends requests.
//!
//! # Grant Selection
//!
//! | Configured | Grant |
//! |------------|-------|
//! | client secret + refresh token | `refresh_token` |
//! | anything else | `client_credentials` (secret included when present) |

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::config::HelixConfig;
use crate::error::AuthError;
use crate::host::http::{HttpRequest, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Twitch OAuth token endpoint.
pub const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

// ============================================================================
// Auth State
// ============================================================================

#[derive(Debug, Default)]
struct Tokens {
    access_token: String,
    refresh_token: Option<String>,
}

/// The run's credential, readable concurrently and replaced on refresh.
#[derive(Debug, Default)]
pub struct AuthState {
    tokens: RwLock<Tokens>,
}

impl AuthState {
    /// Creates state holding an initial credential.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            tokens: RwLock::new(Tokens {
                access_token: access_token.into(),
                refresh_token,
            }),
        }
    }

    /// Creates state from configuration.
    pub fn from_config(config: &HelixConfig) -> Self {
        Self::new(config.access_token.clone(), config.refresh_token.clone())
    }

    /// Current bearer token (may be empty).
    pub async fn access_token(&self) -> String {
        self.tokens.read().await.access_token.clone()
    }

    /// Current refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh_token.clone()
    }

    /// Replaces the bearer token, and the refresh token when rotated.
    async fn replace(&self, access_token: String, rotated_refresh: Option<String>) {
        let mut tokens = self.tokens.write().await;
        tokens.access_token = access_token;
        if let Some(refresh) = rotated_refresh {
            tokens.refresh_token = Some(refresh);
        }
    }
}

// ============================================================================
// Grant
// ============================================================================

/// OAuth grant used by a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Exchange a refresh token for a user token.
    RefreshToken,
    /// Anonymous app token.
    ClientCredentials,
}

impl Grant {
    /// Value of the `grant_type` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RefreshToken => "refresh_token",
            Self::ClientCredentials => "client_credentials",
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

// ============================================================================
// Auth Manager
// ============================================================================

/// Obtains and refreshes the bearer credential.
pub struct AuthManager {
    transport: Arc<dyn Transport>,
    client_id: String,
    client_secret: Option<String>,
    state: Arc<AuthState>,
    token_url: String,
    refresh_lock: Mutex<()>,
}

impl AuthManager {
    /// Creates a manager writing into `state`.
    pub fn new(transport: Arc<dyn Transport>, config: &HelixConfig, state: Arc<AuthState>) -> Self {
        Self {
            transport,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            state,
            token_url: TOKEN_URL.to_string(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Client identifier sent with every Helix call.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The shared credential.
    pub fn state(&self) -> &Arc<AuthState> {
        &self.state
    }

    /// Current bearer token.
    pub async fn bearer(&self) -> String {
        self.state.access_token().await
    }

    /// Grant the next refresh will use.
    pub async fn grant(&self) -> Grant {
        if self.client_secret.is_some() && self.state.refresh_token().await.is_some() {
            Grant::RefreshToken
        } else {
            Grant::ClientCredentials
        }
    }

    /// Obtains a new credential and stores it in the shared state.
    ///
    /// No retry happens here; callers decide whether to re-issue.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingClientId` if no client identifier is configured
    /// - `AuthError::TokenEndpoint` on a non-success status
    /// - `AuthError::InvalidResponse` if no access token is returned
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<String, AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::MissingClientId);
        }

        let _guard = self.refresh_lock.lock().await;
        self.run_grant().await
    }

    /// Refreshes only if the shared credential is still `rejected`.
    ///
    /// Callers that raced on the same rejected token share one grant: whoever
    /// takes the lock after a completed refresh gets the new token back
    /// without contacting the endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`AuthManager::refresh`].
    #[instrument(skip(self, rejected))]
    pub async fn refresh_if_stale(&self, rejected: &str) -> Result<String, AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::MissingClientId);
        }

        let _guard = self.refresh_lock.lock().await;
        let current = self.state.access_token().await;
        if current != rejected {
            debug!("Credential already refreshed by another caller");
            return Ok(current);
        }
        self.run_grant().await
    }

    /// Performs one token grant. The caller holds `refresh_lock`.
    async fn run_grant(&self) -> Result<String, AuthError> {
        let grant = self.grant().await;
        let mut form = vec![
            ("client_id".to_string(), self.client_id.clone()),
            ("grant_type".to_string(), grant.as_str().to_string()),
        ];
        if grant == Grant::RefreshToken {
            if let Some(refresh) = self.state.refresh_token().await {
                form.push(("refresh_token".to_string(), refresh));
            }
        }
        if let Some(ref secret) = self.client_secret {
            form.push(("client_secret".to_string(), secret.clone()));
        }

        debug!(grant = grant.as_str(), "Requesting access token");
        let response = self
            .transport
            .execute(HttpRequest::post_form(&self.token_url, form))
            .await?;

        if !response.is_success() {
            warn!(status = response.status, "Token endpoint refused refresh");
            return Err(AuthError::TokenEndpoint {
                status: response.status,
                body: response.body,
            });
        }

        let token: TokenResponse = response
            .json()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("missing access_token".to_string()))?;

        self.state
            .replace(access_token.clone(), token.refresh_token)
            .await;
        info!(grant = grant.as_str(), expires_in = ?token.expires_in, "Access token refreshed");

        Ok(access_token)
    }
}

// ============================================================================
// Tests
// ============================================================================
