//! JSON rendering

use serde::Serialize;

/// Renders a value as indented JSON
pub fn render_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
