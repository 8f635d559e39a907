//! Feed download.

use std::sync::Arc;

use followroll_fetch::{HttpRequest, Transport};
use tracing::{debug, instrument};

use super::error::SheetError;

/// Published feed used when no URL is configured.
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRfLcoOTBYRzP93HxLn09LNjl2NRL9DZhMp5NW-Yr9lMsEN-cJwIAUwsH2cYrIISU3nXc5RFIlk55Pm/pub?output=csv";

/// Downloads the raw feed text. The feed is public; no credentials are sent.
#[derive(Clone)]
pub struct SheetClient {
    transport: Arc<dyn Transport>,
    url: String,
}

impl SheetClient {
    /// Creates a client for the feed at `url`.
    pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    /// The feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the feed body.
    ///
    /// # Errors
    ///
    /// - `SheetError::Download` on a non-success status
    /// - `SheetError::Http` if the request could not be made
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn download(&self) -> Result<String, SheetError> {
        let response = self.transport.execute(HttpRequest::get(&self.url)).await?;
        if !response.is_success() {
            return Err(SheetError::Download {
                status: response.status,
                body: response.body,
            });
        }
        debug!(bytes = response.body.len(), "Feed downloaded");
        Ok(response.body)
    }
}
