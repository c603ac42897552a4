//! HTTP fetcher implementation
//!
//! This module handles the single GET request made for every task:
//! - Building the shared HTTP client
//! - Classifying transport, rate-limit, status and decoding failures
//!
//! There is no retry; a failed fetch is reported once and the task is dropped.

use crate::config::HttpConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors for a single page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, timeout or body-read failure
    #[error("could not get {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    /// HTTP 429; reported separately so operators can lower concurrency
    #[error("rate limited by server while fetching {url}")]
    RateLimited { url: String },

    /// Any other non-2xx status
    #[error("bad response from server for {url}: {status}")]
    Http { url: String, status: StatusCode },

    /// The body is not a text document
    #[error("could not parse page {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    /// The URL of the failed request
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::RateLimited { url }
            | Self::Http { url, .. }
            | Self::Parse { url, .. } => url,
        }
    }

    /// Returns true for HTTP 429 responses
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// The URL that was requested
    pub url: String,

    /// HTTP status code of the response
    pub status_code: u16,

    /// Decoded response body
    pub body: String,
}

/// Builds an HTTP client with the configured timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. TLS backend init)
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a shared connection pool
///
/// Cloning is cheap; every clone shares the same underlying client.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from HTTP configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Fetches a URL with a single GET request
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Connect/DNS/TLS failure, timeout | `Transport` |
    /// | HTTP 429 | `RateLimited` |
    /// | Other non-2xx | `Http` |
    /// | Body read interrupted | `Transport` |
    /// | Body is binary (contains NUL) | `Parse` |
    ///
    /// The response is owned by this call, so its connection goes back to the
    /// pool (or is closed) on every return path, including early status errors.
    pub async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status,
            });
        }

        // Decodes with the Content-Type charset, falling back to UTF-8
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if body.contains('\0') {
            return Err(FetchError::Parse {
                url: url.to_string(),
                message: "body contains NUL bytes and is not an HTML document".to_string(),
            });
        }

        tracing::trace!(url, status = status.as_u16(), bytes = body.len(), "fetched page");

        Ok(Page {
            url: url.to_string(),
            status_code: status.as_u16(),
            body,
        })
    }
}
