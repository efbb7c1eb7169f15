//! HTTP fetcher implementation
//!
//! This module handles the single outbound request of a crawl:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Sending the GET request
//! - Reading the whole response body
//! - Classifying transport failures

use crate::config::{FetcherConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A response that was received and fully read
///
/// Error statuses are returned here too; deciding that a 4xx/5xx is a failed
/// crawl is up to the caller.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, if any; its charset selects the decoder
    pub content_type: Option<String>,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Returns true for statuses >= 400
    pub fn is_http_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// Transport-level fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("too many redirects: {0}")]
    Redirect(String),

    #[error("{0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    fn classify(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_redirect() {
            Self::Redirect(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }

    /// Returns true if the failure happened while reading the body
    pub fn is_body_error(&self) -> bool {
        matches!(self, Self::Body(_))
    }
}

/// Formats the user agent string: `Name/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `fetcher` - Timeouts and redirect limit
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_probe::config::{FetcherConfig, UserAgentConfig};
/// use sumi_probe::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "SumiProbe".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&FetcherConfig::default(), &user_agent).unwrap();
/// ```
pub fn build_http_client(
    fetcher: &FetcherConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(Duration::from_secs(fetcher.timeout_secs))
        .connect_timeout(Duration::from_secs(fetcher.connect_timeout_secs))
        .redirect(Policy::limited(fetcher.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and reads the whole body
///
/// # Outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | Any HTTP status, body read | `Ok(FetchedPage)` |
/// | Timeout (connect or total) | `Err(Timeout)` |
/// | DNS failure, connection refused, TLS error | `Err(Connect)` |
/// | Redirect limit exceeded | `Err(Redirect)` |
/// | Body could not be read | `Err(Body)` |
///
/// The body is read to the end even for error statuses so the connection is
/// released cleanly.
pub async fn fetch_url(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(FetchError::classify)?;

    let status_code = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    tracing::debug!(%url, status_code, "Response received, reading body");

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else {
            FetchError::Body(e.to_string())
        }
    })?;

    Ok(FetchedPage {
        status_code,
        content_type,
        body: body.to_vec(),
    })
}
