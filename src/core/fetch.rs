//! Transport to the PDU's JAWS monitoring API.
//!
//! The orchestrator only depends on the [`Fetcher`] trait; [`HttpFetcher`] is
//! the production implementation on top of `reqwest`.

use std::{fmt, time::Duration};

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::device::DeviceConfig;

/// Device identity and credentials for one scrape.
///
/// Credentials are forwarded verbatim to the device and never logged; the
/// `Debug` impl redacts the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Target {
    /// Bare `host[:port]`, not a URL.
    pub host: String,
    pub username: String,
    pub password: String,
}

impl Target {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client itself could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection failure, TLS failure or timeout.
    #[error("failed to perform http request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("incorrect status code received from device: {0}")]
    Status(u16),

    #[error("failed to read body of request from device: {0}")]
    Body(#[source] reqwest::Error),
}

/// Fetches the raw JSON body of one monitoring category.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &Target, path: &str) -> Result<Bytes, FetchError>;
}

/// Builds the monitoring URL for a category path.
pub fn monitor_url(host: &str, path: &str) -> String {
    format!("https://{}/jaws/monitor/{}", host, path)
}

/// HTTPS fetcher with basic authentication.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a client with the configured timeout and certificate policy.
    pub fn new(config: &DeviceConfig) -> Result<Self, FetchError> {
        if !config.verify_tls {
            warn!("TLS certificate verification of PDU endpoints is disabled");
        }

        let client = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &Target, path: &str) -> Result<Bytes, FetchError> {
        let url = monitor_url(&target.host, path);
        debug!(url = %url, "Querying PDU");

        let response = self
            .client
            .get(&url)
            .basic_auth(&target.username, Some(&target.password))
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.bytes().await.map_err(FetchError::Body)
    }
}
