//! Page fetching for retailer catalogs.
//!
//! Every failure mode (timeout, non-2xx status, transport error) is logged
//! and collapsed to `None`; callers skip the page and carry on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::ScraperError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Source of raw page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its body, or `None` when the page could not
    /// be retrieved. `timeout` overrides the fetcher's default for this call.
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Option<String>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs.max(1))))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Performs a single GET and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] for HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`ScraperError::Http`] on timeout, network or TLS failure.
    pub async fn get_text(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<String, ScraperError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml");
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Option<String> {
        match self.get_text(url, timeout).await {
            Ok(body) => Some(body),
            Err(ScraperError::NotFound { .. }) => {
                tracing::debug!(url, "fetch: page not found");
                None
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(url, "fetch: request timed out");
                None
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch: request failed");
                None
            }
        }
    }
}
