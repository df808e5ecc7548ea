//! Fetch orchestration: single dates, the latest entry, and date ranges.
//!
//! [`ApodClient`] ties a [`PageFetcher`] to a [`RecordCache`]. Every fetch
//! consults the cache first and stores successful results under the
//! requested date's key. Ranges are fetched in groups of at most
//! [`ApodConfig::concurrency`] requests; each group runs concurrently and
//! groups run one after another. A failing date inside a range is logged
//! and left out without affecting the rest.
//!
//! # Example
//!
//! ```rust,no_run
//! use apod_core::{ApodClient, ApodConfig, parse_date};
//!
//! # #[tokio::main]
//! # async fn main() -> apod_core::Result<()> {
//! let client = ApodClient::new(ApodConfig::default())?;
//! let start = parse_date("2024-01-01")?;
//! let end = parse_date("2024-01-07")?;
//!
//! let response = client.fetch_apod(Some(start), Some(end), true).await?;
//! for record in response.records() {
//!     println!("{} {:?}", record.date, record.title);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::RecordCache;
use crate::date::{date_key, date_range, latest_url, page_url, resolve_current_date};
use crate::extract::{ExtractConfig, default_base_url, parse_page};
use crate::fetch::{FetchConfig, PageFetcher};
use crate::record::{ApodResponse, Record};
use crate::{ApodError, Result};

/// Configuration for an [`ApodClient`].
///
/// # Example
///
/// ```rust
/// use apod_core::ApodConfig;
///
/// let config = ApodConfig::builder()
///     .concurrency(3)
///     .rollover_hour(6)
///     .timeout(10)
///     .build();
/// assert_eq!(config.concurrency, 3);
/// ```
#[derive(Debug, Clone)]
pub struct ApodConfig {
    /// Site root that page URLs and relative asset URLs resolve against.
    pub base_url: Url,

    /// Maximum requests in flight per range group (default: 5).
    pub concurrency: usize,

    /// Timezone used to decide which day is "today" (default: America/Detroit).
    pub timezone: Tz,

    /// Local hour before which "today" is still the previous day (default: 5).
    pub rollover_hour: u32,

    /// HTTP settings.
    pub fetch: FetchConfig,
}

impl Default for ApodConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            concurrency: 5,
            timezone: chrono_tz::America::Detroit,
            rollover_hour: 5,
            fetch: FetchConfig::default(),
        }
    }
}

impl ApodConfig {
    /// Creates a new builder for ApodConfig.
    pub fn builder() -> ApodConfigBuilder {
        ApodConfigBuilder::new()
    }
}

/// Builder for ApodConfig.
pub struct ApodConfigBuilder {
    config: ApodConfig,
}

impl ApodConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ApodConfig::default() }
    }

    /// Sets the site base URL.
    pub fn base_url(mut self, value: Url) -> Self {
        self.config.base_url = value;
        self
    }

    /// Sets the per-group request limit. Zero is treated as one.
    pub fn concurrency(mut self, value: usize) -> Self {
        self.config.concurrency = value.max(1);
        self
    }

    /// Sets the reference timezone.
    pub fn timezone(mut self, value: Tz) -> Self {
        self.config.timezone = value;
        self
    }

    /// Sets the rollover hour, clamped to 0..=23.
    pub fn rollover_hour(mut self, value: u32) -> Self {
        self.config.rollover_hour = value.min(23);
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.fetch.timeout = value;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    /// Sets a prefix prepended to every page URL.
    pub fn relay(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.relay = Some(value.into());
        self
    }

    /// Builds the config.
    pub fn build(self) -> ApodConfig {
        self.config
    }
}

impl Default for ApodConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches and caches APOD records.
#[derive(Clone)]
pub struct ApodClient {
    config: ApodConfig,
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<RecordCache>,
}

impl ApodClient {
    /// Creates a client that fetches over HTTP and caches to the user's cache
    /// directory (in memory when the platform has none).
    #[cfg(feature = "fetch")]
    pub fn new(config: ApodConfig) -> Result<Self> {
        use crate::cache::JsonFileStore;
        use crate::fetch::HttpFetcher;

        let fetcher = HttpFetcher::new(config.fetch.clone())?;
        let cache = match JsonFileStore::default_path() {
            Some(path) => RecordCache::load(JsonFileStore::new(path)),
            None => RecordCache::in_memory(),
        };

        Ok(Self::with_parts(config, Arc::new(fetcher), Arc::new(cache)))
    }

    /// Creates a client from an explicit fetcher and cache.
    pub fn with_parts(config: ApodConfig, fetcher: Arc<dyn PageFetcher>, cache: Arc<RecordCache>) -> Self {
        Self { config, fetcher, cache }
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Fetches one date, the latest entry, or an inclusive date range.
    ///
    /// - no `end`, no `start`: the latest entry
    /// - no `end`, `start`: that date
    /// - `end`: every date from `start` to `end`, most recent first
    ///
    /// A single date with no page yields `Single(None)`. A range without a
    /// start date is [`ApodError::MissingStartDate`]; a range whose start is
    /// after its end is empty.
    pub async fn fetch_apod(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        preserve_links: bool,
    ) -> Result<ApodResponse> {
        match (start, end) {
            (None, None) => Ok(ApodResponse::Single(self.fetch_latest(preserve_links).await?)),
            (Some(date), None) => Ok(ApodResponse::Single(self.fetch_date(date, preserve_links).await?)),
            (Some(start), Some(end)) => Ok(ApodResponse::Range(self.fetch_range(start, end, preserve_links).await)),
            (None, Some(_)) => Err(ApodError::MissingStartDate),
        }
    }

    /// Fetches the entry for `date`.
    pub async fn fetch_date(&self, date: NaiveDate, preserve_links: bool) -> Result<Option<Record>> {
        let url = page_url(&self.config.base_url, date)?;
        self.fetch_cached(date, &url, preserve_links).await
    }

    /// Fetches the current entry from the site's front page.
    ///
    /// The record is dated and cached as [`ApodClient::latest_date`].
    pub async fn fetch_latest(&self, preserve_links: bool) -> Result<Option<Record>> {
        let date = self.latest_date();
        let url = latest_url(&self.config.base_url)?;
        self.fetch_cached(date, &url, preserve_links).await
    }

    /// Fetches every date in `start..=end`, most recent first.
    pub async fn fetch_range(&self, start: NaiveDate, end: NaiveDate, preserve_links: bool) -> Vec<Record> {
        let dates = date_range(start, end);
        let group_size = self.config.concurrency.max(1);
        let mut records = Vec::with_capacity(dates.len());

        info!(start = %start, end = %end, days = dates.len(), "fetching date range");

        for group in dates.chunks(group_size) {
            let results = join_all(group.iter().map(|&date| self.fetch_date(date, preserve_links))).await;

            for (date, result) in group.iter().zip(results) {
                match result {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => debug!(date = %date, "no entry for date"),
                    Err(e) => warn!(date = %date, error = %e, "failed to fetch entry"),
                }
            }
        }

        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.dedup_by_key(|record| record.date);
        records
    }

    /// The date the site currently shows, in the configured timezone.
    pub fn latest_date(&self) -> NaiveDate {
        let now = Utc::now().with_timezone(&self.config.timezone);
        resolve_current_date(&now, self.config.rollover_hour)
    }

    async fn fetch_cached(&self, date: NaiveDate, url: &Url, preserve_links: bool) -> Result<Option<Record>> {
        let key = date_key(date);

        if let Some(record) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(Some(record));
        }

        debug!(key = %key, "cache miss");
        let record = self.fetch_page(url.as_str(), date, preserve_links).await?;

        if let Some(record) = &record {
            self.cache.insert(key, record.clone());
        }

        Ok(record)
    }

    /// Fetches and parses one page without touching the cache.
    ///
    /// A 404 yields `None`; any other non-success status is an error.
    pub async fn fetch_page(&self, url: &str, date: NaiveDate, preserve_links: bool) -> Result<Option<Record>> {
        let page = self.fetcher.fetch(url).await?;

        if page.is_not_found() {
            debug!(url = %url, "page not found");
            return Ok(None);
        }

        if !page.is_success() {
            return Err(ApodError::UnexpectedStatus { status: page.status, url: url.to_string() });
        }

        let config = ExtractConfig { base_url: self.config.base_url.clone(), preserve_links };
        let record = parse_page(&page.body, date, &config)?;

        if record.error {
            warn!(date = %date, "entry is missing a title, explanation, or media URL");
        }

        Ok(Some(record))
    }
}

impl std::fmt::Debug for ApodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApodClient")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Convenience function: fetch with default configuration.
#[cfg(feature = "fetch")]
pub async fn fetch_apod(start: Option<NaiveDate>, end: Option<NaiveDate>, preserve_links: bool) -> Result<ApodResponse> {
    ApodClient::new(ApodConfig::default())?
        .fetch_apod(start, end, preserve_links)
        .await
}
