//! Shared utilities for hwmon-query

use rmcp::ErrorData as McpError;
use serde_json::Value;

/// Render one property value the way record lines show it
pub fn format_property(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

/// Format an optional reading, `-` when the provider has none
pub fn format_reading(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}

/// Create an internal error
pub fn internal_error(msg: impl Into<String>) -> McpError {
    McpError::internal_error(msg.into(), None)
}
