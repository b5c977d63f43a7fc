//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests to fetch page content
//! - Error classification
//!
//! Fetching sits behind the [`Fetch`] trait so the pool can run against any
//! source of pages.

use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Errors raised by a single fetch attempt
///
/// These never escape the pool; they are recorded as failed results.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {uri}")]
    Timeout {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Connection failed for {uri}")]
    Connect {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for {uri}")]
    Request {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Classifies a reqwest error for the given target
    pub fn from_reqwest(uri: &str, source: reqwest::Error) -> Self {
        let uri = uri.to_string();
        if source.is_timeout() {
            Self::Timeout { uri, source }
        } else if source.is_connect() {
            Self::Connect { uri, source }
        } else {
            Self::Request { uri, source }
        }
    }
}

/// A response received for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,

    /// Body length in bytes
    pub content_length: u64,

    /// Body decoded as UTF-8 (invalid sequences replaced)
    pub text: String,
}

impl FetchedPage {
    /// True unless the status is a client or server error
    pub fn is_ok(&self) -> bool {
        self.status_code < 400
    }
}

/// Retrieves the content behind a URI
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Performs one fetch attempt; no retries
    async fn fetch(&self, uri: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use harvest::config::FetchConfig;
/// use harvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetch`] implementation backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(uri, e))?;

        let status = response.status();

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(uri, e))?;

        Ok(FetchedPage {
            status_code: status.as_u16(),
            content_length: body.len() as u64,
            text: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
