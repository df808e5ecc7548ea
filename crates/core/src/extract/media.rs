//! Media locator: finds the day's image or embedded video.

use serde::{Deserialize, Serialize};
use url::Url;

use super::resolve_url;
use crate::parse::Document;

/// Kind of media an entry features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Other,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Result of locating the media element on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub media_type: MediaType,
    pub url: Option<String>,
    pub hd_url: Option<String>,
}

/// Locates the featured media on an APOD page.
///
/// The first `img` wins. Its `src` is resolved against `base`, and when the
/// image sits inside a link into the site's `image/` directory that link is
/// the high resolution version. Without an image, the first `iframe` marks a
/// video entry. Anything else is `other` with no URL.
pub fn locate_media(doc: &Document, base: &Url) -> Media {
    if let Ok(Some(img)) = doc.select_first("img") {
        let url = img
            .attr("src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .and_then(|src| resolve_url(base, src));

        let hd_url = img
            .closest("a")
            .and_then(|anchor| anchor.attr("href"))
            .map(str::trim)
            .filter(|href| href.starts_with("image/"))
            .and_then(|href| resolve_url(base, href))
            .or_else(|| url.clone());

        return Media { media_type: MediaType::Image, url, hd_url };
    }

    if let Ok(Some(iframe)) = doc.select_first("iframe") {
        let url = iframe
            .attr("src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .and_then(|src| resolve_url(base, src));

        return Media { media_type: MediaType::Video, url, hd_url: None };
    }

    Media { media_type: MediaType::Other, url: None, hd_url: None }
}
