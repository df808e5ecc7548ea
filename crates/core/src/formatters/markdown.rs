use crate::Result;
use crate::extract::MediaType;
use crate::record::Record;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Configuration for Markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Include TOML frontmatter with the record's fields
    pub include_frontmatter: bool,
    /// Generate reference table for the explanation's links
    pub include_references: bool,
}

/// A collected link reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    /// The link text
    pub text: String,
    /// The link URL
    pub url: String,
}

/// Convert records to Markdown, one section per record separated by rules.
pub fn convert_to_markdown(records: &[Record], config: &MarkdownConfig) -> Result<String> {
    let sections: Vec<String> = records.iter().map(|record| record_to_markdown(record, config)).collect();
    Ok(sections.join("\n---\n\n"))
}

fn record_to_markdown(record: &Record, config: &MarkdownConfig) -> String {
    let mut output = String::new();

    if config.include_frontmatter {
        output.push_str(&generate_frontmatter(record));
        output.push('\n');
    }

    let title = record.title.as_deref().unwrap_or("(untitled)");
    output.push_str(&format!("# {}\n\n", title));

    if let Some(url) = &record.url {
        match record.media_type {
            MediaType::Image => {
                let target = record.hd_url.as_deref().unwrap_or(url);
                output.push_str(&format!("[![{}]({})]({})\n\n", title, url, target));
            }
            MediaType::Video => output.push_str(&format!("[Watch the video]({})\n\n", url)),
            MediaType::Other => output.push_str(&format!("<{}>\n\n", url)),
        }
    }

    let mut attribution = Vec::new();
    if let Some(credits) = &record.credits {
        attribution.push(format!("**Credit:** {}", credits));
    }
    if let Some(copyright) = &record.copyright {
        attribution.push(format!("**Copyright:** {}", copyright));
    }
    if !attribution.is_empty() {
        output.push_str(&attribution.join("  \n"));
        output.push_str("\n\n");
    }

    if let Some(explanation) = &record.explanation {
        output.push_str(html_to_markdown(explanation).trim());
        output.push_str("\n\n");

        if config.include_references {
            let links = extract_links(explanation);
            if !links.is_empty() {
                output.push_str("## References\n\n");
                output.push_str(&generate_reference_table(&links));
                output.push('\n');
            }
        }
    }

    output.push_str(&format!("[{}]({})\n", record.date, record.link));
    output
}

/// Generate TOML frontmatter from a record
fn generate_frontmatter(record: &Record) -> String {
    let mut frontmatter = String::from("+++");

    if let Some(title) = &record.title {
        frontmatter.push_str(&format!("\ntitle = {}", toml_escape_string(title)));
    }

    frontmatter.push_str(&format!("\ndate = {}", record.date));
    frontmatter.push_str(&format!("\nmedia_type = {}", toml_escape_string(&record.media_type.to_string())));

    if let Some(url) = &record.url {
        frontmatter.push_str(&format!("\nurl = {}", toml_escape_string(url)));
    }

    if let Some(hd_url) = &record.hd_url {
        frontmatter.push_str(&format!("\nhd_url = {}", toml_escape_string(hd_url)));
    }

    if let Some(credits) = &record.credits {
        frontmatter.push_str(&format!("\ncredits = {}", toml_escape_string(credits)));
    }

    if let Some(copyright) = &record.copyright {
        frontmatter.push_str(&format!("\ncopyright = {}", toml_escape_string(copyright)));
    }

    frontmatter.push_str(&format!("\nlink = {}", toml_escape_string(&record.link)));

    if record.error {
        frontmatter.push_str("\nerror = true");
    }

    frontmatter.push_str("\n+++\n");
    frontmatter
}

/// Escape a string for TOML format
fn toml_escape_string(s: &str) -> String {
    let needs_escape = s.contains('"') || s.contains('\\') || s.contains('\n');
    if needs_escape {
        format!(
            "\"{}\"",
            s.replace('\\', "\\\\").replace('\"', "\\\"").replace('\n', "\\n")
        )
    } else {
        format!("\"{}\"", s)
    }
}

/// Convert HTML to Markdown using htmd crate
#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str) -> String {
    htmd::convert(html).unwrap_or_else(|_| crate::record::html_to_text(html))
}

/// Fallback HTML to text conversion when markdown feature is disabled
#[cfg(not(feature = "markdown"))]
fn html_to_markdown(html: &str) -> String {
    crate::record::html_to_text(html)
}

/// Extract the distinct links from an explanation fragment
pub fn extract_links(html: &str) -> Vec<LinkReference> {
    let fragment = Html::parse_fragment(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in fragment.select(&LINK_SELECTOR) {
        let text = element.text().collect::<String>().trim().to_string();
        let Some(url) = element.value().attr("href") else {
            continue;
        };

        if text.is_empty() || url.is_empty() {
            continue;
        }

        if seen.insert(url.to_string()) {
            links.push(LinkReference { text, url: url.to_string() });
        }
    }

    links
}

/// Generate a reference table from collected links
fn generate_reference_table(links: &[LinkReference]) -> String {
    let mut table = String::from("| # | Text | URL |\n");
    table.push_str("|---|------|-----|\n");

    for (i, link) in links.iter().enumerate() {
        table.push_str(&format!("| {} | {} | {} |\n", i + 1, escape_pipe(&link.text), escape_pipe(&link.url)));
    }

    table
}

/// Escape pipe characters for Markdown tables
fn escape_pipe(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Markdown formatter with configurable options
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, records: &[Record]) -> Result<String> {
        convert_to_markdown(records, &self.config)
    }
}
