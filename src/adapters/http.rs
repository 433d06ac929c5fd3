//! Page fetching over HTTP.
//!
//! Every failure to obtain a body (connect error, timeout, non-success
//! status) is reported as `GuardError::NetworkFailure`; interpreting the
//! body is left to the caller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{GuardError, Result};

const USER_AGENT: &str = "offerguard/0.1";

/// Fetches a page as text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::build(timeout, HeaderMap::new())
    }

    /// Fetcher that sends `cookie` with every request, for pages only the
    /// logged-in user can see
    pub fn with_session_cookie(timeout: Duration, cookie: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(cookie.trim())
            .map_err(|e| GuardError::Validation(format!("invalid session cookie: {}", e)))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value);
        Self::build(timeout, headers)
    }

    fn build(timeout: Duration, headers: HeaderMap) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GuardError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GuardError::NetworkFailure(format!("could not retrieve {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardError::NetworkFailure(format!(
                "could not retrieve {}: HTTP {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| GuardError::NetworkFailure(format!("could not read body of {}: {}", url, e)))
    }
}
