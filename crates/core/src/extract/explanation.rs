//! Explanation extractor.
//!
//! The explanation is not wrapped in its own element. It starts right after a
//! bold `Explanation:` label and runs as loose text and inline links until
//! the navigation footer that begins with "Tomorrow's picture".

use url::Url;

use super::{collapse_whitespace, resolve_url};
use crate::dom_tree::{DomNode, walk_siblings};
use crate::parse::{Document, Element};

const LABEL: &str = "explanation:";
const FOOTER_MARKER: &str = "Tomorrow's picture";

/// Extracts the explanation paragraph.
///
/// With `preserve_links` set, inline anchors are kept as markup with absolute
/// `href`s that open in a new browsing context; otherwise only their text is
/// kept. Returns an empty string when the page has no explanation label.
pub fn extract_explanation(doc: &Document, base: &Url, preserve_links: bool) -> String {
    let Some(label) = find_label(doc) else {
        return String::new();
    };

    let mut explanation = String::new();
    for node in walk_siblings(&label, |node| node.text_content().contains(FOOTER_MARKER)) {
        match node {
            DomNode::Text(text) => explanation.push_str(text),
            DomNode::Element(el) => {
                if preserve_links && el.is("a") {
                    match rewrite_anchor(&el, base) {
                        Some(markup) => explanation.push_str(&markup),
                        None => explanation.push_str(&el.text()),
                    }
                } else {
                    explanation.push_str(&el.text());
                }
            }
            DomNode::Comment(_) | DomNode::Other => {}
        }
    }

    collapse_whitespace(&explanation)
}

fn find_label<'a>(doc: &'a Document) -> Option<Element<'a>> {
    doc.select("b")
        .ok()?
        .into_iter()
        .find(|b| b.text().trim().to_lowercase() == LABEL)
}

/// Rewrites an anchor with an absolute `href` and `target="_blank"`,
/// keeping its other attributes and content as parsed.
///
/// Returns `None` for anchors without an `href`, which are flattened to text.
fn rewrite_anchor(anchor: &Element<'_>, base: &Url) -> Option<String> {
    let href = anchor.attr("href")?;
    let absolute = resolve_url(base, href.trim()).unwrap_or_else(|| href.to_string());

    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("a[href]", |el| {
                el.set_attribute("href", &absolute)?;
                el.set_attribute("target", "_blank")?;
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter.write(anchor.outer_html().as_bytes()).ok()?;
    rewriter.end().ok()?;

    Some(String::from_utf8_lossy(&output).into_owned())
}
