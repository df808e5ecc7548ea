//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors and ancestor links.
//!
//! # Example
//!
//! ```rust
//! use apod_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <center><b> Galaxy Tides </b></center>
//!             <p>Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let bold = doc.select("center b").unwrap();
//! assert_eq!(bold[0].text().trim(), "Galaxy Tides");
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{ApodError, Result};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page together with the base URL that relative
/// links on the page resolve against.
///
/// # Example
///
/// ```rust
/// use apod_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apod_core::parse::Document;
    ///
    /// let html = "<html><body><h1>Title</h1></body></html>";
    /// let doc = Document::parse(html).unwrap();
    /// assert!(doc.base_url().is_none());
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: None })
    }

    /// Parses HTML from a string, remembering the URL relative links resolve against.
    pub fn parse_with_base(html: &str, base_url: Url) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: Some(base_url) })
    }

    /// Gets the base URL supplied at parse time.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ApodError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apod_core::parse::Document;
    ///
    /// let html = r#"<center>First</center><center>Second</center>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("center").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(Element::from).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(Element::from))
    }

    /// Gets the title of the document.
    ///
    /// Returns the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ApodError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A wrapper around scraper's ElementRef for easier DOM navigation.
///
/// # Example
///
/// ```rust
/// use apod_core::parse::Document;
///
/// let html = r#"<a href="image/2401/galaxy.jpg"><img src="image/2401/galaxy_small.jpg"></a>"#;
/// let doc = Document::parse(html).unwrap();
/// let img = doc.select_first("img").unwrap().unwrap();
/// let link = img.closest("a").unwrap();
///
/// assert_eq!(link.attr("href"), Some("image/2401/galaxy.jpg"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Element<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self { element }
    }
}

impl<'a> Element<'a> {
    /// Gets the wrapped scraper element.
    pub fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the tag name of this element.
    ///
    /// Returns the lowercase tag name (e.g., "center", "a", "b").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Checks the tag name without allocating.
    pub fn is(&self, tag: &str) -> bool {
        self.element.value().name().eq_ignore_ascii_case(tag)
    }

    /// Gets the parent element, if the parent is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Element::from)
    }

    /// Finds the nearest element with the given tag, starting with this element itself.
    pub fn closest(&self, tag: &str) -> Option<Element<'a>> {
        if self.is(tag) {
            return Some(self.clone());
        }

        self.element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case(tag))
            .map(Element::from)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ApodError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(Element::from).collect())
    }

    /// Selects the first descendant matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).next().map(Element::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>APOD: 2024 January 15 - Test Page</title>
        </head>
        <body>
            <center>
                <p><a href="image/2401/big.jpg"><img src="image/2401/small.jpg"></a></p>
            </center>
            <center><b> Test Page </b><br><b>Image Credit:</b> Someone</center>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph 2</p>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.title(), Some("APOD: 2024 January 15 - Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_closest_and_parent() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let img = doc.select_first("img").unwrap().unwrap();

        let anchor = img.closest("a").unwrap();
        assert_eq!(anchor.attr("href"), Some("image/2401/big.jpg"));
        assert!(img.parent().unwrap().is("a"));
        assert!(img.closest("center").is_some());
        assert!(img.closest("table").is_none());
    }

    #[test]
    fn test_select_within_element() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let centers = doc.select("center").unwrap();
        let bold = centers[1].select("b").unwrap();

        assert_eq!(bold.len(), 2);
        assert_eq!(bold[0].text().trim(), "Test Page");
        assert_eq!(bold[1].tag_name(), "b");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(ApodError::HtmlParseError(_))));
    }

    #[test]
    fn test_base_url() {
        let base = Url::parse("https://apod.nasa.gov/apod/").unwrap();
        let doc = Document::parse_with_base(SAMPLE_HTML, base.clone()).unwrap();
        assert_eq!(doc.base_url(), Some(&base));
    }
}
