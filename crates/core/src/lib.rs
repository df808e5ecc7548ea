//! Astronomy Picture of the Day page extraction.
//!
//! Fetches APOD pages and turns them into structured [`Record`]s: media
//! URLs, title, explanation, credits, and copyright. Records are cached by
//! date so each page is fetched at most once.
//!
//! ```rust
//! use apod_core::{ExtractConfig, parse_date, parse_page};
//!
//! let html = r#"<html><body>
//!     <center><a href="image/2401/m1_big.jpg"><img src="image/2401/m1.jpg"></a></center>
//!     <center><b> Crab Nebula </b><br><b> Copyright: </b> Jane Doe</center>
//!     <p><b> Explanation: </b> A supernova remnant.</p>
//! </body></html>"#;
//!
//! let record = parse_page(html, parse_date("2024-01-02").unwrap(), &ExtractConfig::default()).unwrap();
//! assert_eq!(record.url.as_deref(), Some("https://apod.nasa.gov/apod/image/2401/m1.jpg"));
//! assert_eq!(record.hd_url.as_deref(), Some("https://apod.nasa.gov/apod/image/2401/m1_big.jpg"));
//! assert_eq!(record.copyright.as_deref(), Some("Jane Doe"));
//! ```

pub mod cache;
pub mod client;
pub mod date;
pub mod dom_tree;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod parse;
pub mod record;

pub use cache::{CacheMap, CacheStore, JsonFileStore, MemoryStore, RecordCache};
#[cfg(feature = "fetch")]
pub use client::fetch_apod;
pub use client::{ApodClient, ApodConfig, ApodConfigBuilder};
pub use date::{
    BASE_URL, LATEST_PAGE, date_key, date_range, latest_url, page_url, parse_date, resolve_current_date,
};
#[doc(hidden)]
pub use dom_tree::{DomNode, child_nodes, following_siblings, walk_siblings};
pub use error::{ApodError, Result};
pub use extract::{
    Attribution, ExtractConfig, Media, MediaType, default_base_url, extract_attribution, extract_explanation,
    extract_record, extract_title, locate_media, normalize_attribution, parse_page,
};
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchConfig, FetchedPage, PageFetcher, fetch_file, fetch_stdin};
pub use formatters::{JsonConfig, JsonFormatter, MarkdownConfig, MarkdownFormatter, TextConfig, TextFormatter};
pub use formatters::{convert_to_json, convert_to_markdown, convert_to_text};
pub use parse::{Document, Element};
pub use record::{ApodResponse, OutputFormat, Record};
