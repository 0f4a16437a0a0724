//! Remote image retrieval.
//!
//! The normalizer never talks to the network itself; it consumes the
//! [`Fetcher`] capability, which turns a URL into an in-memory byte buffer.
//! [`HttpFetcher`] is the production implementation on top of
//! `reqwest`'s blocking client.
//!
//! No retries happen here. A non-2xx response becomes
//! [`FetchError::Status`], anything below HTTP (DNS, connect, timeout, a body
//! cut short) becomes [`FetchError::Network`], and the caller decides what
//! to do about either.

use crate::config::FetchConfig;
use reqwest::Url;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Longest slice of an error body carried into [`FetchError::Status`].
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// HTTP status for [`FetchError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Capability: fetch the raw bytes behind a URL.
pub trait Fetcher: Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`Fetcher`] backed by a blocking `reqwest` client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn describe(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "body read failed"
    } else {
        "request failed"
    };
    format!("{kind}: {err}")
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| FetchError::Network(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            let body = response.text().unwrap_or_default();
            let body = excerpt(body.trim());
            let message = if body.is_empty() {
                reason.to_string()
            } else {
                format!("{reason}: {body}")
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Network(describe(&e)))?;
        debug!(url, bytes = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}
