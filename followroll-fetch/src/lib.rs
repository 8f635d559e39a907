// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # FollowRoll Fetch
//!
//! Authenticated, paginated access to the Twitch Helix API.
//!
//! ## Layers
//!
//! - [`host::http`] - The [`Transport`] seam and its reqwest-backed [`HttpClient`]
//! - [`config`] - Credentials and target channel from the environment
//! - [`auth`] - The shared credential and its OAuth refresh
//! - [`paged`] - Helix requests with one refresh-and-retry on 401, plus
//!   cursor pagination
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use followroll_fetch::{AuthManager, AuthState, HelixConfig, HttpClient, PagedClient};
//!
//! let config = HelixConfig::from_env();
//! let transport = Arc::new(HttpClient::new()?);
//! let state = Arc::new(AuthState::from_config(&config));
//! let auth = Arc::new(AuthManager::new(transport.clone(), &config, state));
//! let helix = PagedClient::new(transport, auth);
//!
//! let pages = helix.request_all("subscriptions", &[]).await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod host;
pub mod paged;
pub mod retry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Errors
pub use error::{AuthError, FetchError, HttpError};

// Host APIs
pub use host::http::{HttpClient, HttpRequest, HttpResponse, Method, Transport};

// Credentials & requests
pub use auth::{AuthManager, AuthState, Grant, TOKEN_URL};
pub use config::HelixConfig;
pub use paged::{HELIX_BASE_URL, PagedClient, Query, next_cursor, query};
pub use retry::AuthAttempt;
