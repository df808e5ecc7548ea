//! Field extraction from APOD pages.
//!
//! Each extractor works on a parsed [`Document`] independently and never
//! fails: a field that cannot be found comes back empty and the assembled
//! [`Record`] flags it through [`Record::error`].
//!
//! # Example
//!
//! ```rust
//! use apod_core::{ExtractConfig, parse_page};
//! use chrono::NaiveDate;
//!
//! let html = r#"<html><body>
//!     <center><img src="image/2401/moon.jpg"></center>
//!     <center><b> Full Moon </b><br><b> Image Credit: </b> NASA</center>
//!     <p><b> Explanation: </b> The Moon is full tonight.</p>
//! </body></html>"#;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();
//! let record = parse_page(html, date, &ExtractConfig::default()).unwrap();
//! assert_eq!(record.title.as_deref(), Some("Full Moon"));
//! assert!(!record.error);
//! ```

pub mod credits;
pub mod explanation;
pub mod media;
pub mod title;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::date::BASE_URL;
use crate::parse::Document;
use crate::record::Record;
use crate::Result;

pub use credits::{Attribution, extract_attribution, normalize_attribution};
pub use explanation::extract_explanation;
pub use media::{Media, MediaType, locate_media};
pub use title::extract_title;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Configuration for turning a page into a [`Record`].
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Base URL that relative media and link URLs resolve against.
    pub base_url: Url,
    /// Keep inline explanation links as `<a>` markup (default: true).
    pub preserve_links: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), preserve_links: true }
    }
}

/// The parsed form of [`BASE_URL`].
pub fn default_base_url() -> Url {
    static BASE: LazyLock<Url> = LazyLock::new(|| Url::parse(BASE_URL).expect("valid base URL"));
    BASE.clone()
}

/// Runs every extractor over a parsed page and assembles the record for `date`.
pub fn extract_record(doc: &Document, date: NaiveDate, config: &ExtractConfig) -> Result<Record> {
    let base = doc.base_url().unwrap_or(&config.base_url);

    let media = locate_media(doc, base);
    let title = extract_title(doc);
    let explanation = extract_explanation(doc, base, config.preserve_links);
    let attribution = extract_attribution(doc);

    Record::assemble(date, media, title, explanation, attribution, &config.base_url)
}

/// Parses raw page HTML and assembles the record for `date`.
pub fn parse_page(html: &str, date: NaiveDate, config: &ExtractConfig) -> Result<Record> {
    let doc = Document::parse_with_base(html, config.base_url.clone())?;
    extract_record(&doc, date, config)
}

/// Resolves a possibly relative URL against the site base.
///
/// Values that already start with `http` are returned as they are.
pub(crate) fn resolve_url(base: &Url, href: &str) -> Option<String> {
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(String::from)
}

/// Collapses every whitespace run, newlines included, to one space and trims.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
