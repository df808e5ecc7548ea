//! Title extractor.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Document;

static DATED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^APOD:\s*\d{4}\s*\w+\s*\d+\s*[–-]\s*").expect("valid title prefix pattern"));

/// Extracts the entry title.
///
/// The title is normally the first bold run inside the first `center` block.
/// Older and unusual pages fall back to the `<title>` element, which reads
/// `APOD: 2024 January 15 - Title` (sometimes with an en-dash). Returns an
/// empty string when neither source is present.
pub fn extract_title(doc: &Document) -> String {
    if let Ok(Some(center)) = doc.select_first("center")
        && let Ok(Some(bold)) = center.select_first("b")
    {
        return bold.text().trim().to_string();
    }

    let page_title = doc.title().unwrap_or_default();
    let last_segment = page_title.split(" - ").last().unwrap_or_default().trim();
    DATED_PREFIX.replace(last_segment, "").trim().to_string()
}
