//! Authenticated Helix requests and cursor pagination.
//!
//! Every call carries `Client-ID` and `Authorization: Bearer` headers. A 401
//! triggers one credential refresh and one re-issue of the same request,
//! bounded by [`AuthAttempt`]. Pages are fetched strictly in sequence since
//! each cursor comes from the previous response.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::AuthManager;
use crate::error::{AuthError, FetchError};
use crate::host::http::{HttpRequest, HttpResponse, Transport};
use crate::retry::AuthAttempt;

// ============================================================================
// Constants
// ============================================================================

/// Helix API base URL.
pub const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix/";

/// Query parameter carrying the pagination cursor.
const CURSOR_PARAM: &str = "after";

/// Query parameters; keys may repeat.
pub type Query = Vec<(String, String)>;

/// Builds a [`Query`] from string pairs.
pub fn query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Query
where
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Cursor of a page, if more pages remain.
pub fn next_cursor(page: &Value) -> Option<&str> {
    page.get("pagination")
        .and_then(|p| p.get("cursor"))
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
}

// ============================================================================
// Paged Client
// ============================================================================

/// Helix client with bounded re-authentication and pagination.
pub struct PagedClient {
    transport: Arc<dyn Transport>,
    auth: Arc<AuthManager>,
    base_url: String,
}

impl PagedClient {
    /// Creates a client against the public Helix API.
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<AuthManager>) -> Self {
        Self {
            transport,
            auth,
            base_url: HELIX_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL. Must end with `/`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolves `endpoint` against the base and appends the query.
    fn build_url(&self, endpoint: &str, query: &[(String, String)]) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .and_then(|base| base.join(endpoint))
            .map_err(crate::error::HttpError::from)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }

    /// Sends a GET; returns the bearer token it carried with the response.
    async fn send(&self, url: &str) -> Result<(String, HttpResponse), FetchError> {
        let bearer = self.auth.bearer().await;
        let request = HttpRequest::get(url)
            .header("Client-ID", self.auth.client_id())
            .header("Authorization", format!("Bearer {bearer}"));
        let response = self.transport.execute(request).await?;
        Ok((bearer, response))
    }

    /// Issues one GET and returns the parsed JSON body.
    ///
    /// # Errors
    ///
    /// - `FetchError::Auth` if a refresh fails or the refreshed credential is
    ///   rejected again
    /// - `FetchError::Remote` for any other non-success status
    #[instrument(skip(self, query))]
    pub async fn request(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
        let url = self.build_url(endpoint, query)?;
        let mut attempt = AuthAttempt::Fresh;

        loop {
            let (bearer, response) = self.send(&url).await?;

            if response.is_unauthorized() {
                attempt = attempt.after_unauthorized().ok_or_else(|| AuthError::Rejected {
                    endpoint: endpoint.to_string(),
                })?;
                warn!("Credential rejected, refreshing once");
                self.auth.refresh_if_stale(&bearer).await?;
                continue;
            }

            if !response.is_success() {
                return Err(FetchError::Remote {
                    status: response.status,
                    body: response.body,
                });
            }

            debug!(retried = attempt.is_retry(), "Request succeeded");
            return Ok(response.json()?);
        }
    }

    /// Fetches every page of a cursor-paginated endpoint, in order.
    ///
    /// Stops when a page has no cursor, or echoes the cursor it was asked
    /// for.
    ///
    /// # Errors
    ///
    /// The first page error aborts the walk; see [`PagedClient::request`].
    #[instrument(skip(self, base_query))]
    pub async fn request_all(&self, endpoint: &str, base_query: &[(String, String)]) -> Result<Vec<Value>, FetchError> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut page_query = base_query.to_vec();
            if let Some(ref after) = cursor {
                page_query.push((CURSOR_PARAM.to_string(), after.clone()));
            }

            let page = self.request(endpoint, &page_query).await?;
            let next = next_cursor(&page).map(str::to_string);
            pages.push(page);

            match next {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    warn!(cursor = %next, "Cursor repeated, stopping pagination");
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(pages = pages.len(), "Pagination complete");
        Ok(pages)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use crate::config::HelixConfig;
    use crate::testing::ScriptedTransport;

    const TOKEN_OK: &str = r#"{"access_token":"fresh"}"#;

    fn client(transport: Arc<ScriptedTransport>) -> PagedClient {
        let config = HelixConfig {
            client_id: "cid".to_string(),
            access_token: "stale".to_string(),
            ..HelixConfig::default()
        };
        let state = Arc::new(AuthState::from_config(&config));
        let auth = AuthManager::new(transport.clone(), &config, state)
            .with_token_url("http://id.test/oauth2/token");
        PagedClient::new(transport, Arc::new(auth)).with_base_url("http://helix.test/")
    }

    #[test]
    fn test_next_cursor() {
        let page: Value = serde_json::from_str(r#"{"pagination":{"cursor":"abc"}}"#).unwrap();
        assert_eq!(next_cursor(&page), Some("abc"));
        let page: Value = serde_json::from_str(r#"{"pagination":{}}"#).unwrap();
        assert_eq!(next_cursor(&page), None);
        let page: Value = serde_json::from_str(r#"{"pagination":{"cursor":""}}"#).unwrap();
        assert_eq!(next_cursor(&page), None);
    }

    #[tokio::test]
    async fn test_headers_attached() {
        let transport = Arc::new(ScriptedTransport::new().on("users", 200, r#"{"data":[]}"#));
        client(transport.clone())
            .request("users", &query([("login", "alice")]))
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "http://helix.test/users?login=alice");
        assert_eq!(sent.header_value("Client-ID"), Some("cid"));
        assert_eq!(sent.header_value("Authorization"), Some("Bearer stale"));
    }

    #[tokio::test]
    async fn test_repeated_keys_are_encoded() {
        let transport = Arc::new(ScriptedTransport::new().on("users", 200, r#"{"data":[]}"#));
        client(transport.clone())
            .request("users", &query([("login", "a b"), ("login", "c")]))
            .await
            .unwrap();
        assert_eq!(transport.requests()[0].url, "http://helix.test/users?login=a+b&login=c");
    }

    #[tokio::test]
    async fn test_single_401_refreshes_and_retries_once() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("helix.test/users", 401, "expired")
                .on("helix.test/users", 200, r#"{"data":[{"id":"1"}]}"#)
                .on("oauth2/token", 200, TOKEN_OK),
        );
        let value = client(transport.clone()).request("users", &[]).await.unwrap();

        assert_eq!(value["data"][0]["id"], "1");
        assert_eq!(transport.count("oauth2/token"), 1);
        assert_eq!(transport.count("helix.test/users"), 2);
        let retried = &transport.requests()[2];
        assert_eq!(retried.header_value("Authorization"), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn test_second_401_is_auth_error() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("helix.test/users", 401, "expired")
                .on("helix.test/users", 401, "still expired")
                .on("helix.test/users", 200, r#"{"data":[]}"#)
                .on("oauth2/token", 200, TOKEN_OK)
                .on("oauth2/token", 200, TOKEN_OK),
        );
        let err = client(transport.clone()).request("users", &[]).await.unwrap_err();

        assert!(matches!(err, FetchError::Auth(AuthError::Rejected { .. })));
        assert_eq!(transport.count("oauth2/token"), 1);
        assert_eq!(transport.count("helix.test/users"), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_propagates() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("helix.test/users", 401, "expired")
                .on("oauth2/token", 403, "invalid client"),
        );
        let err = client(transport.clone()).request("users", &[]).await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(err.status(), Some(403));
        assert_eq!(transport.count("helix.test/users"), 1);
    }

    #[tokio::test]
    async fn test_other_status_is_remote_error_without_retry() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("helix.test/users", 500, "boom")
                .on("helix.test/users", 200, r#"{"data":[]}"#),
        );
        let err = client(transport.clone()).request("users", &[]).await.unwrap_err();

        match err {
            FetchError::Remote { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_request_all_follows_cursors() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("after=b", 200, r#"{"data":[{"n":3}],"pagination":{}}"#)
                .on("after=a", 200, r#"{"data":[{"n":2}],"pagination":{"cursor":"b"}}"#)
                .on("subscriptions", 200, r#"{"data":[{"n":1}],"pagination":{"cursor":"a"}}"#),
        );
        let pages = client(transport.clone())
            .request_all("subscriptions", &query([("broadcaster_id", "42")]))
            .await
            .unwrap();

        assert_eq!(pages.len(), 3);
        let ns: Vec<i64> = pages.iter().map(|p| p["data"][0]["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![1, 2, 3]);

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://helix.test/subscriptions?broadcaster_id=42",
                "http://helix.test/subscriptions?broadcaster_id=42&after=a",
                "http://helix.test/subscriptions?broadcaster_id=42&after=b",
            ]
        );
    }

    #[tokio::test]
    async fn test_request_all_stops_on_echoed_cursor() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("after=b", 200, r#"{"data":[],"pagination":{"cursor":"b"}}"#)
                .on("after=a", 200, r#"{"data":[],"pagination":{"cursor":"b"}}"#)
                .on("subscriptions", 200, r#"{"data":[],"pagination":{"cursor":"a"}}"#),
        );
        let pages = client(transport.clone())
            .request_all("subscriptions", &[])
            .await
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(transport.requests().len(), 3);
    }
}
