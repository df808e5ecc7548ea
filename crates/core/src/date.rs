//! Calendar helpers for APOD dates.
//!
//! APOD identifies each day by a six digit `YYMMDD` key that appears both in
//! the per-day page URL and as the cache key. The site publishes on US
//! Eastern time and rolls over a few hours after midnight, so "today" is
//! resolved in a reference timezone with a rollover hour.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Timelike};
use url::Url;

use crate::{ApodError, Result};

/// Site root that page assets and per-day pages resolve against.
pub const BASE_URL: &str = "https://apod.nasa.gov/apod/";

/// Page that always shows the most recent entry.
pub const LATEST_PAGE: &str = "astropix.html";

/// Parses a calendar date written as `YYYY-MM-DD` or `YYYY/MM/DD`.
///
/// # Example
///
/// ```rust
/// use apod_core::parse_date;
///
/// let date = parse_date("2024/01/05").unwrap();
/// assert_eq!(date.to_string(), "2024-01-05");
/// ```
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .map_err(|_| ApodError::InvalidDate(input.to_string()))
}

/// Formats the six digit `YYMMDD` key for a date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Builds the canonical per-day page URL, `{base}ap{YYMMDD}.html`.
pub fn page_url(base: &Url, date: NaiveDate) -> Result<Url> {
    let page = format!("ap{}.html", date_key(date));
    base.join(&page).map_err(|e| ApodError::InvalidUrl(e.to_string()))
}

/// Builds the URL of the page that always shows the latest entry.
pub fn latest_url(base: &Url) -> Result<Url> {
    base.join(LATEST_PAGE).map_err(|e| ApodError::InvalidUrl(e.to_string()))
}

/// Resolves which day is current on the site at instant `now`.
///
/// `now` should already be expressed in the site's reference timezone. Before
/// `rollover_hour` local time the previous day's entry is still current.
pub fn resolve_current_date<Tz: TimeZone>(now: &DateTime<Tz>, rollover_hour: u32) -> NaiveDate {
    let today = now.date_naive();
    if now.hour() < rollover_hour {
        today.checked_sub_days(Days::new(1)).unwrap_or(today)
    } else {
        today
    }
}

/// Enumerates every date from `start` to `end` inclusive, ascending.
///
/// Returns an empty list when `start` is after `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}
