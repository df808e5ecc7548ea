//! Error types for APOD operations.
//!
//! This module defines the main error type [`ApodError`] which represents
//! every fault that can surface from fetching, parsing, or formatting
//! Astronomy Picture of the Day pages.
//!
//! Two outcomes are deliberately *not* errors: a page that does not exist
//! (HTTP 404) is reported as `None`, and a page missing its title,
//! explanation, or media URL is reported through [`Record::error`](crate::Record::error).
//!
//! # Example
//!
//! ```rust
//! use apod_core::{ApodError, Result};
//!
//! fn require_start(start: Option<&str>) -> Result<&str> {
//!     start.ok_or(ApodError::MissingStartDate)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for APOD operations.
///
/// # Example
///
/// ```rust
/// use apod_core::{ApodError, parse_date};
///
/// match parse_date("2024-13-40") {
///     Ok(date) => println!("Parsed {}", date),
///     Err(ApodError::InvalidDate(input)) => println!("Bad date: {}", input),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum ApodError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a status other than success or 404.
    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A date string that is not `YYYY-MM-DD` (or `YYYY/MM/DD`).
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A date range was requested without a start date.
    #[error("A date range requires a start date")]
    MissingStartDate,

    /// File not found.
    ///
    /// Returned when attempting to read a saved page that doesn't exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Standard I/O errors for file and stdin operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization or deserialization errors.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for ApodError.
///
/// This is a convenience alias for `std::result::Result<T, ApodError>`.
pub type Result<T> = std::result::Result<T, ApodError>;
