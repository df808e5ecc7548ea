use crate::Result;
use crate::record::Record;

/// Configuration for plain text output
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Wrap explanation lines at specified width (0 = no wrapping)
    pub line_width: usize,

    /// Include the media and page URLs after the explanation
    pub include_links: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { line_width: 80, include_links: true }
    }
}

/// Plain text formatter for records
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    /// Convert records to plain text
    pub fn convert(&self, records: &[Record]) -> Result<String> {
        convert_to_text(records, &self.config)
    }
}

/// Convert records to plain text, separated by blank lines.
pub fn convert_to_text(records: &[Record], config: &TextConfig) -> Result<String> {
    let blocks: Vec<String> = records.iter().map(|record| record_to_text(record, config)).collect();
    Ok(blocks.join("\n\n"))
}

fn record_to_text(record: &Record, config: &TextConfig) -> String {
    let mut output = generate_header(record);

    if let Some(explanation) = record.explanation_text() {
        output.push('\n');
        output.push_str(&wrap_text(&explanation, config.line_width));
        output.push('\n');
    }

    if config.include_links {
        output.push('\n');
        if let Some(url) = &record.url {
            output.push_str(&format!("Media: {}\n", url));
        }
        if let Some(hd_url) = record.hd_url.as_ref().filter(|hd| Some(*hd) != record.url.as_ref()) {
            output.push_str(&format!("HD: {}\n", hd_url));
        }
        output.push_str(&format!("Page: {}\n", record.link));
    }

    output.trim_end().to_string()
}

/// Generate a header from the record's title, date, and attribution
fn generate_header(record: &Record) -> String {
    let title = record.title.as_deref().unwrap_or("(untitled)");
    let mut header = String::new();

    header.push_str(title);
    header.push('\n');
    header.push_str(&"=".repeat(title.chars().count()));
    header.push('\n');

    let mut meta_parts = vec![format!("Date: {}", record.date), format!("Media: {}", record.media_type)];

    if let Some(credits) = &record.credits {
        meta_parts.push(format!("Credit: {}", credits));
    }

    if let Some(copyright) = &record.copyright {
        meta_parts.push(format!("Copyright: {}", copyright));
    }

    header.push_str(&meta_parts.join(" | "));
    header.push('\n');

    if record.error {
        header.push_str("(incomplete entry)\n");
    }

    header
}

/// Wrap text to specified line width
fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_length = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_length == 0 {
            current_line.push_str(word);
            current_length = word_len;
        } else if current_length + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_length += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line.push_str(word);
            current_length = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MediaType;
    use chrono::NaiveDate;

    fn record() -> Record {
        Record {
            url: Some("https://apod.nasa.gov/apod/image/2401/a.jpg".to_string()),
            hd_url: Some("https://apod.nasa.gov/apod/image/2401/a_big.jpg".to_string()),
            title: Some("Moon".to_string()),
            explanation: Some("The <a href=\"https://x.org\" target=\"_blank\">Moon</a> rises.".to_string()),
            credits: Some("NASA".to_string()),
            copyright: None,
            media_type: MediaType::Image,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            link: "https://apod.nasa.gov/apod/ap240102.html".to_string(),
            error: false,
        }
    }

    #[test]
    fn test_text_output() {
        let text = convert_to_text(&[record()], &TextConfig::default()).unwrap();

        assert!(text.starts_with("Moon\n====\n"));
        assert!(text.contains("Date: 2024-01-02 | Media: image | Credit: NASA"));
        assert!(text.contains("The Moon rises."));
        assert!(!text.contains("<a"));
        assert!(text.contains("HD: https://apod.nasa.gov/apod/image/2401/a_big.jpg"));
        assert!(text.ends_with("Page: https://apod.nasa.gov/apod/ap240102.html"));
    }

    #[test]
    fn test_text_without_links() {
        let config = TextConfig { include_links: false, ..Default::default() };
        let text = TextFormatter::new(config).convert(&[record()]).unwrap();
        assert!(!text.contains("Page:"));
    }

    #[test]
    fn test_incomplete_entry_marker() {
        let mut partial = record();
        partial.title = None;
        partial.error = true;

        let text = convert_to_text(&[partial], &TextConfig::default()).unwrap();
        assert!(text.starts_with("(untitled)"));
        assert!(text.contains("(incomplete entry)"));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three four", 9), "one two\nthree\nfour");
        assert_eq!(wrap_text("one two", 0), "one two");
    }
}
