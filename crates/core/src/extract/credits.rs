//! Credit and copyright extractor.
//!
//! APOD pages put attribution in free text after a bold label such as
//! `Image Credit:`, `Copyright:` or `Image Credit & Copyright:` inside a
//! `center` block. There is no markup separating names, so the value is the
//! run of sibling nodes after the label, cleaned up by a fixed set of
//! spacing rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom_tree::{DomNode, walk_siblings};
use crate::parse::{Document, Element};

/// Attribution lines found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub credits: Option<String>,
    pub copyright: Option<String>,
}

static COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").expect("valid comma pattern"));
static SEMICOLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*;\s*").expect("valid semicolon pattern"));
static PROCESSING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";\s*Processing:\s*").expect("valid processing pattern"));
static AMPERSAND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*&\s*").expect("valid ampersand pattern"));
static SLASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*/\s*").expect("valid slash pattern"));
static OPEN_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s*").expect("valid paren pattern"));
static CLOSE_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\)").expect("valid paren pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Extracts credits and copyright from the page's centered blocks.
///
/// Labels mentioning "copyright" fill `copyright` (even when they also say
/// "credit"); other labels mentioning "credit" fill `credits`. When a page
/// uses one combined label the two values match and only `copyright` is
/// kept. Scanning stops once both fields are set.
pub fn extract_attribution(doc: &Document) -> Attribution {
    let mut credits: Option<String> = None;
    let mut copyright: Option<String> = None;

    for center in doc.select("center").unwrap_or_default() {
        for label in center.select("b").unwrap_or_default() {
            let label_text = label.text().to_lowercase();
            let names_copyright = label_text.contains("copyright");
            if !names_copyright && !label_text.contains("credit") {
                continue;
            }

            let raw = attribution_text(&label);
            if raw.is_empty() {
                continue;
            }

            let value = normalize_attribution(&raw);
            if names_copyright {
                copyright = Some(value);
            } else {
                credits = Some(value);
            }
        }

        if credits.is_some() && credits == copyright {
            credits = None;
        }

        if credits.is_some() && copyright.is_some() {
            break;
        }
    }

    Attribution { credits, copyright }
}

/// Joins the text after a label, skipping line breaks and later labels.
fn attribution_text(label: &Element<'_>) -> String {
    walk_siblings(label, |_| false)
        .filter_map(|node| match node {
            DomNode::Text(text) => Some(text.trim().to_string()),
            DomNode::Element(el) if !el.is("br") && !mentions_attribution(&el.text()) => {
                Some(el.text().trim().to_string())
            }
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn mentions_attribution(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("credit") || lower.contains("copyright")
}

/// Normalizes the spacing of an attribution line.
///
/// Commas and semicolons are followed by one space, `Processing:` after a
/// semicolon is followed by one space, ampersands and slashes get one space
/// on each side, parentheses lose inner padding, and whitespace runs collapse.
/// Applying it twice gives the same result as applying it once.
///
/// # Example
///
/// ```rust
/// use apod_core::normalize_attribution;
///
/// assert_eq!(
///     normalize_attribution("NASA ,ESA ;Processing:Jane Doe ( ESO )"),
///     "NASA, ESA; Processing: Jane Doe (ESO)"
/// );
/// ```
pub fn normalize_attribution(raw: &str) -> String {
    let text = COMMA.replace_all(raw, ", ");
    let text = SEMICOLON.replace_all(&text, "; ");
    let text = PROCESSING.replace_all(&text, "; Processing: ");
    let text = AMPERSAND.replace_all(&text, " & ");
    let text = SLASH.replace_all(&text, " / ");
    let text = OPEN_PAREN.replace_all(&text, "(");
    let text = CLOSE_PAREN.replace_all(&text, ")");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}
