pub mod json;
pub mod markdown;
pub mod text;

pub use json::{JsonConfig, JsonFormatter, convert_to_json};
pub use markdown::{LinkReference, MarkdownConfig, MarkdownFormatter, convert_to_markdown, extract_links};
pub use text::{TextConfig, TextFormatter, convert_to_text};
