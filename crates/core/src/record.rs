//! Record output type for one day's entry.
//!
//! This module defines the [`Record`] struct which is the complete result of
//! parsing one APOD page: media URLs, title, explanation, attribution, and
//! the validity flag.

use chrono::NaiveDate;
use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Result;
use crate::date::{date_key, page_url};
use crate::extract::{Attribution, Media, MediaType};

/// Output format options for records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON (structured data).
    Json,
    /// Markdown with TOML frontmatter.
    Markdown,
    /// Plain text.
    PlainText,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" | "plain" => Ok(Self::PlainText),
            _ => Err(format!("Invalid format: {}. Valid options: json, markdown, text", s)),
        }
    }
}

/// One parsed day's entry.
///
/// Records are assembled once per fetch and never modified afterwards. The
/// `error` flag is set when the title, explanation, or media URL could not
/// be recovered; whatever was found is still present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Media URL (image source or embedded video source).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// High resolution image URL.
    #[serde(default, alias = "hdurl", skip_serializing_if = "Option::is_none")]
    pub hd_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Explanation paragraph, plain text or text with inline `<a>` markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(default)]
    pub credits: Option<String>,

    #[serde(default)]
    pub copyright: Option<String>,

    #[serde(alias = "media_type")]
    pub media_type: MediaType,

    /// The requested calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,

    /// Canonical per-day page URL.
    pub link: String,

    /// True when title, explanation, or url is missing.
    #[serde(default)]
    pub error: bool,
}

impl Record {
    /// Assembles a record from extractor output for the requested date.
    ///
    /// Empty strings count as missing. The `date` and `link` come from the
    /// requested date, not from anything printed on the page.
    pub fn assemble(
        date: NaiveDate,
        media: Media,
        title: String,
        explanation: String,
        attribution: Attribution,
        base: &Url,
    ) -> Result<Self> {
        let url = media.url.filter(|u| !u.is_empty());
        let hd_url = media.hd_url.filter(|u| !u.is_empty());
        let title = Some(title).filter(|t| !t.is_empty());
        let explanation = Some(explanation).filter(|e| !e.is_empty());
        let error = title.is_none() || explanation.is_none() || url.is_none();
        let link = page_url(base, date)?.to_string();

        Ok(Self {
            url,
            hd_url,
            title,
            explanation,
            credits: attribution.credits,
            copyright: attribution.copyright,
            media_type: media.media_type,
            date,
            link,
            error,
        })
    }

    /// The six digit `YYMMDD` cache key for this record.
    pub fn key(&self) -> String {
        date_key(self.date)
    }

    /// Explanation with any inline markup removed.
    pub fn explanation_text(&self) -> Option<String> {
        self.explanation.as_deref().map(html_to_text)
    }
}

/// Result of a fetch request: one date (possibly unpublished) or a range.
///
/// Serializes as a record object, `null`, or an array of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ApodResponse {
    /// A single requested date; `None` when no page exists for it.
    Single(Option<Record>),
    /// A date range, most recent first.
    Range(Vec<Record>),
}

impl ApodResponse {
    /// Borrows the contained records.
    pub fn records(&self) -> &[Record] {
        match self {
            ApodResponse::Single(Some(record)) => std::slice::from_ref(record),
            ApodResponse::Single(None) => &[],
            ApodResponse::Range(records) => records,
        }
    }

    /// Consumes the response, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            ApodResponse::Single(record) => record.into_iter().collect(),
            ApodResponse::Range(records) => records,
        }
    }

    /// True when no record was found.
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

/// Convert an HTML fragment to plain text by removing tags
pub(crate) fn html_to_text(html: &str) -> String {
    Html::parse_fragment(html).root_element().text().collect()
}
