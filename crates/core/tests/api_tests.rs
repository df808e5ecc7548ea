//! Library API integration tests
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use apod_core::*;
use async_trait::async_trait;
use chrono::NaiveDate;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/apod/{}", name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn day_url(d: u32) -> String {
    format!("https://apod.nasa.gov/apod/ap2401{:02}.html", d)
}

fn simple_page(d: u32) -> String {
    format!(
        r#"<html><body>
        <center><a href="image/2401/day{d}_big.jpg"><img src="image/2401/day{d}.jpg"></a></center>
        <center><b> Day {d} </b><br><b> Image Credit: </b> Observer {d}</center>
        <p><b> Explanation: </b> Entry for day <a href="ap2401{d:02}.html">{d}</a>.
        <p><center><b> Tomorrow's picture: </b> soon</center>
        </body></html>"#
    )
}

/// Serves canned pages and records request concurrency.
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, FetchedPage>,
    failing: HashSet<String>,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    fn with_days(days: impl IntoIterator<Item = u32>) -> Self {
        let mut fetcher = Self::default();
        for d in days {
            fetcher.serve(day_url(d), FetchedPage::new(200, simple_page(d)));
        }
        fetcher
    }

    fn serve(&mut self, url: impl Into<String>, page: FetchedPage) {
        self.pages.insert(url.into(), page);
    }

    fn fail(&mut self, url: impl Into<String>) {
        self.failing.insert(url.into());
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(ApodError::Timeout { timeout: 30 });
        }

        Ok(self.pages.get(url).cloned().unwrap_or_else(|| FetchedPage::new(404, "Not Found")))
    }
}

fn client_with(fetcher: Arc<ScriptedFetcher>, cache: RecordCache) -> ApodClient {
    ApodClient::with_parts(ApodConfig::default(), fetcher, Arc::new(cache))
}

#[tokio::test]
async fn test_fetch_single_date_from_fixture() {
    let mut fetcher = ScriptedFetcher::default();
    fetcher.serve(day_url(15), FetchedPage::new(200, fixture("image_separate_credits.html")));
    let client = client_with(Arc::new(fetcher), RecordCache::in_memory());

    let response = client.fetch_apod(Some(day(15)), None, true).await.unwrap();
    let ApodResponse::Single(Some(record)) = response else {
        panic!("expected a single record");
    };

    assert!(!record.error);
    assert_eq!(record.title.as_deref(), Some("The Pillars of Creation"));
    assert_eq!(record.media_type, MediaType::Image);
    assert_eq!(
        record.url.as_deref(),
        Some("https://apod.nasa.gov/apod/image/2401/pillars_1024.jpg")
    );
    assert_eq!(
        record.hd_url.as_deref(),
        Some("https://apod.nasa.gov/apod/image/2401/pillars_big.jpg")
    );
    assert_eq!(
        record.credits.as_deref(),
        Some("NASA, ESA, CSA; Processing: Joseph DePasquale (STScI)")
    );
    assert_eq!(record.copyright.as_deref(), Some("Jane Doe & John Roe"));
    assert_eq!(record.date, day(15));
    assert_eq!(record.link, "https://apod.nasa.gov/apod/ap240115.html");

    let explanation = record.explanation.unwrap();
    assert!(explanation.starts_with("These towering columns"));
    assert!(explanation.contains(
        r#"<a href="https://apod.nasa.gov/apod/ap230101.html" target="_blank">Eagle Nebula</a>"#
    ));
    assert!(explanation.ends_with("The image was taken in infrared light."));
    assert!(!explanation.contains("Tomorrow"));
}

#[tokio::test]
async fn test_links_flattened_when_not_preserved() {
    let mut fetcher = ScriptedFetcher::default();
    fetcher.serve(day_url(15), FetchedPage::new(200, fixture("image_separate_credits.html")));
    let client = client_with(Arc::new(fetcher), RecordCache::in_memory());

    let record = client.fetch_date(day(15), false).await.unwrap().unwrap();
    let explanation = record.explanation.unwrap();

    assert!(!explanation.contains("<a"));
    assert!(explanation.contains("part of the Eagle Nebula, about 6,500 light-years away."));
}

#[tokio::test]
async fn test_not_found_returns_none() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let client = client_with(fetcher.clone(), RecordCache::in_memory());

    let response = client.fetch_apod(Some(day(1)), None, true).await.unwrap();

    assert_eq!(response, ApodResponse::Single(None));
    assert!(client.cache().is_empty());
    assert_eq!(fetcher.requests(), 1);
}

#[tokio::test]
async fn test_unexpected_status_propagates() {
    let mut fetcher = ScriptedFetcher::default();
    fetcher.serve(day_url(2), FetchedPage::new(503, "busy"));
    let client = client_with(Arc::new(fetcher), RecordCache::in_memory());

    let result = client.fetch_date(day(2), true).await;
    assert!(matches!(result, Err(ApodError::UnexpectedStatus { status: 503, .. })));
}

#[tokio::test]
async fn test_transport_error_propagates_for_single_date() {
    let mut fetcher = ScriptedFetcher::with_days([2]);
    fetcher.fail(day_url(2));
    let client = client_with(Arc::new(fetcher), RecordCache::in_memory());

    let result = client.fetch_apod(Some(day(2)), None, true).await;
    assert!(matches!(result, Err(ApodError::Timeout { .. })));
}

#[tokio::test]
async fn test_range_is_descending_and_bounded() {
    let fetcher = Arc::new(ScriptedFetcher::with_days(1..=12));
    let client = client_with(fetcher.clone(), RecordCache::in_memory());

    let response = client.fetch_apod(Some(day(1)), Some(day(12)), true).await.unwrap();
    let records = response.records();

    assert_eq!(records.len(), 12);
    assert!(records.windows(2).all(|pair| pair[0].date > pair[1].date));
    assert_eq!(records[0].date, day(12));
    assert_eq!(records[11].date, day(1));

    assert_eq!(fetcher.requests(), 12);
    assert_eq!(fetcher.max_in_flight(), 5);
    assert_eq!(client.cache().len(), 12);
}

#[tokio::test]
async fn test_range_isolates_failures() {
    let mut fetcher = ScriptedFetcher::with_days((1..=7).filter(|d| *d != 5));
    fetcher.fail(day_url(3));
    let client = client_with(Arc::new(fetcher), RecordCache::in_memory());

    let records = client.fetch_range(day(1), day(7), true).await;
    let dates: Vec<u32> = records.iter().map(|r| chrono::Datelike::day(&r.date)).collect();

    assert_eq!(dates, vec![7, 6, 4, 2, 1]);
}

#[tokio::test]
async fn test_range_respects_configured_concurrency() {
    let fetcher = Arc::new(ScriptedFetcher::with_days(1..=9));
    let config = ApodConfig::builder().concurrency(2).build();
    let client = ApodClient::with_parts(config, fetcher.clone(), Arc::new(RecordCache::in_memory()));

    let records = client.fetch_range(day(1), day(9), true).await;

    assert_eq!(records.len(), 9);
    assert_eq!(fetcher.max_in_flight(), 2);
}

#[tokio::test]
async fn test_range_requires_start() {
    let client = client_with(Arc::new(ScriptedFetcher::default()), RecordCache::in_memory());

    let result = client.fetch_apod(None, Some(day(5)), true).await;
    assert!(matches!(result, Err(ApodError::MissingStartDate)));
}

#[tokio::test]
async fn test_reversed_range_is_empty() {
    let fetcher = Arc::new(ScriptedFetcher::with_days(1..=5));
    let client = client_with(fetcher.clone(), RecordCache::in_memory());

    let response = client.fetch_apod(Some(day(5)), Some(day(1)), true).await.unwrap();

    assert_eq!(response, ApodResponse::Range(Vec::new()));
    assert_eq!(fetcher.requests(), 0);
}

#[tokio::test]
async fn test_cache_hit_avoids_fetch() {
    let fetcher = Arc::new(ScriptedFetcher::with_days([4]));
    let client = client_with(fetcher.clone(), RecordCache::in_memory());

    let first = client.fetch_date(day(4), true).await.unwrap();
    let second = client.fetch_date(day(4), true).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fetcher.requests(), 1);
    assert!(client.cache().contains("240104"));
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let store = MemoryStore::new();

    let first = client_with(Arc::new(ScriptedFetcher::with_days([8])), RecordCache::load(store.clone()));
    let fetched = first.fetch_date(day(8), true).await.unwrap().unwrap();

    let offline = Arc::new(ScriptedFetcher::default());
    let restarted = client_with(offline.clone(), RecordCache::load(store));
    let cached = restarted.fetch_date(day(8), true).await.unwrap().unwrap();

    assert_eq!(cached, fetched);
    assert_eq!(offline.requests(), 0);
}

#[tokio::test]
async fn test_json_file_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("apod_cache.json");

    let first = client_with(
        Arc::new(ScriptedFetcher::with_days(1..=3)),
        RecordCache::load(JsonFileStore::new(&path)),
    );
    first.fetch_range(day(1), day(3), true).await;

    let persisted: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(persisted["240102"]["date"], "2024-01-02");
    assert_eq!(persisted["240102"]["mediaType"], "image");

    let offline = Arc::new(ScriptedFetcher::default());
    let restarted = client_with(offline.clone(), RecordCache::load(JsonFileStore::new(&path)));
    let records = restarted.fetch_range(day(1), day(3), true).await;

    assert_eq!(records.len(), 3);
    assert_eq!(offline.requests(), 0);
}

#[tokio::test]
async fn test_latest_uses_front_page() {
    let mut fetcher = ScriptedFetcher::default();
    fetcher.serve(
        "https://apod.nasa.gov/apod/astropix.html",
        FetchedPage::new(200, fixture("video.html")),
    );
    let fetcher = Arc::new(fetcher);
    let client = client_with(fetcher.clone(), RecordCache::in_memory());

    let expected_date = client.latest_date();
    let record = client.fetch_apod(None, None, true).await.unwrap().into_records().remove(0);

    assert_eq!(record.media_type, MediaType::Video);
    assert_eq!(record.date, expected_date);
    assert_eq!(record.link, page_url(&default_base_url(), expected_date).unwrap().as_str());
    assert!(client.cache().contains(&date_key(expected_date)));

    client.fetch_latest(true).await.unwrap();
    assert_eq!(fetcher.requests(), 1);
}

#[test]
fn test_combined_credit_fixture() {
    let record = parse_page(&fixture("image_combined_credit.html"), day(16), &ExtractConfig::default()).unwrap();

    assert!(!record.error);
    assert_eq!(record.title.as_deref(), Some("Dark Nebula LDN 1622"));
    assert_eq!(record.credits, None);
    assert_eq!(record.copyright.as_deref(), Some("Ann Smith / Remote Observatory"));
    assert_eq!(
        record.hd_url.as_deref(),
        Some("https://apod.nasa.gov/apod/image/2401/ldn1622_full.jpg")
    );
}

#[test]
fn test_video_fixture() {
    let record = parse_page(&fixture("video.html"), day(17), &ExtractConfig::default()).unwrap();

    assert!(!record.error);
    assert_eq!(record.media_type, MediaType::Video);
    assert_eq!(record.url.as_deref(), Some("https://www.youtube.com/embed/abc123XYZ?rel=0"));
    assert_eq!(record.hd_url, None);
    assert_eq!(record.title.as_deref(), Some("Total Solar Eclipse in Motion"));
    assert_eq!(record.credits.as_deref(), Some("Eclipse Team; Music: Corona Suite"));
    assert_eq!(
        record.explanation.as_deref(),
        Some(
            "What does a total solar eclipse look like from a \
             <a href=\"https://en.wikipedia.org/wiki/Weather_balloon\" target=\"_blank\">high altitude balloon</a>? \
             The Moon's shadow sweeps across the clouds below."
        )
    );
}

#[test]
fn test_missing_explanation_fixture() {
    let record = parse_page(&fixture("missing_explanation.html"), day(18), &ExtractConfig::default()).unwrap();

    assert!(record.error);
    assert_eq!(record.explanation, None);
    assert_eq!(record.title.as_deref(), Some("Lunar Halo"));
    assert_eq!(record.credits.as_deref(), Some("NASA"));
    assert!(record.url.is_some());
}

#[test]
fn test_record_output_formats() {
    let record = parse_page(&fixture("image_separate_credits.html"), day(15), &ExtractConfig::default()).unwrap();
    let response = ApodResponse::Single(Some(record));

    let json = convert_to_json(&response, &JsonConfig::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "The Pillars of Creation");
    assert_eq!(value["error"], false);

    let text = convert_to_text(response.records(), &TextConfig::default()).unwrap();
    assert!(text.starts_with("The Pillars of Creation\n"));
    assert!(!text.contains("<a"));

    let markdown = convert_to_markdown(
        response.records(),
        &MarkdownConfig { include_frontmatter: true, ..Default::default() },
    )
    .unwrap();
    assert!(markdown.starts_with("+++\n"));
    assert!(markdown.contains("# The Pillars of Creation"));
}
