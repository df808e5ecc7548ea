use crate::Result;
use crate::record::ApodResponse;

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
}

/// JSON formatter for records
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Convert a response to a JSON string
    pub fn format(&self, response: &ApodResponse) -> Result<String> {
        convert_to_json(response, &self.config)
    }
}

/// Convert a response to JSON: an object, `null`, or an array.
pub fn convert_to_json(response: &ApodResponse, config: &JsonConfig) -> Result<String> {
    let json = if config.pretty { serde_json::to_string_pretty(response)? } else { serde_json::to_string(response)? };
    Ok(json)
}
