//! Page retrieval from the network, local files, and stdin.
//!
//! Network access goes through the [`PageFetcher`] trait so the batch
//! orchestrator can be driven by a scripted fetcher in tests. The default
//! implementation, [`HttpFetcher`], is available with the `fetch` feature.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::{ApodError, Result};

/// HTTP client configuration for fetching pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Prefix prepended verbatim to every page URL, e.g. a CORS relay
    /// endpoint of the form `https://relay.example/?apod=`.
    pub relay: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: concat!("Mozilla/5.0 (compatible; apod/", env!("CARGO_PKG_VERSION"), ")").to_string(),
            relay: None,
        }
    }
}

impl FetchConfig {
    /// The URL actually requested for `url`, after applying the relay prefix.
    pub fn request_url(&self, url: &str) -> String {
        match &self.relay {
            Some(prefix) => format!("{}{}", prefix, url),
            None => url.to_string(),
        }
    }
}

/// A fetched page: HTTP status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Retrieves raw page HTML.
///
/// Implementations report transport failures as errors and hand back every
/// HTTP response, whatever its status, as a [`FetchedPage`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    /// Builds the client once; it is reused for every request.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApodError::HttpError)?;

        Ok(Self { client, config })
    }
}

#[cfg(feature = "fetch")]
#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let target = self.config.request_url(url);
        let parsed_url = url::Url::parse(&target).map_err(|e| ApodError::InvalidUrl(format!("{}: {}", target, e)))?;

        tracing::debug!(url = %parsed_url, "requesting page");

        let response = self
            .client
            .get(parsed_url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApodError::Timeout { timeout: self.config.timeout }
                } else {
                    ApodError::HttpError(e)
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(FetchedPage { status, body })
    }
}

/// Reads a saved page from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(ApodError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(ApodError::from)
    }
}

/// Reads a page from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(ApodError::from)?;

    Ok(buffer)
}
