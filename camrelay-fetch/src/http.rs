//! HTTP client for probing and transferring origin content.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use camrelay_core::error::{RelayError, Result};
use camrelay_core::traits::{FetchedSnapshot, SnapshotFetcher};
use camrelay_core::types::HeaderData;

/// Fetcher configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for metadata probes (no body transfer)
    pub probe_timeout: Duration,
    /// Timeout for full transfers
    pub fetch_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(20),
            user_agent: concat!("camrelay/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl FetchConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the probe timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the transfer timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Probes and transfers origin content over one shared HTTP client.
///
/// The client is built once and shared read-only across every concurrent
/// refresh unit; per-request timeouts bound both operations.
pub struct HttpFetcher {
    config: FetchConfig,
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with default configuration.
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    /// Creates a fetcher with custom configuration.
    pub fn with_config(config: FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Extracts the header metadata the cache tracks from a response.
    fn headers_from(response: &reqwest::Response) -> HeaderData {
        let header_str = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        HeaderData {
            status: response.status().as_u16(),
            content_type: header_str(reqwest::header::CONTENT_TYPE).unwrap_or_default(),
            content_length: header_str(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.parse().ok()),
            validation_token: header_str(reqwest::header::ETAG),
        }
    }

    fn transport_error(url: &str, error: reqwest::Error) -> RelayError {
        if error.is_timeout() {
            RelayError::Timeout { url: url.into() }
        } else {
            RelayError::HttpError(error.to_string())
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotFetcher for HttpFetcher {
    /// Issues a HEAD request; no body crosses the wire.
    #[instrument(skip(self))]
    async fn probe(&self, url: &str) -> Result<HeaderData> {
        let response = self
            .client
            .head(url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| Self::transport_error(url, e))?;

        let headers = Self::headers_from(&response);
        debug!(status = headers.status, token = ?headers.validation_token, "Probed origin");
        Ok(headers)
    }

    /// Issues a GET request and returns metadata plus the payload bytes.
    ///
    /// Non-success statuses are returned as data, not mapped to errors; the
    /// refresh engine decides what a failed origin means for the cell.
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedSnapshot> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.fetch_timeout)
            .send()
            .await
            .map_err(|e| Self::transport_error(url, e))?;

        let headers = Self::headers_from(&response);
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::transport_error(url, e))?;

        debug!(status = headers.status, bytes = body.len(), "Transferred origin content");
        Ok(FetchedSnapshot { headers, body })
    }
}
