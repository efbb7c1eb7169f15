//! Output module for presenting crawl results
//!
//! This module handles:
//! - Formatting a single crawl result as a readable report
//! - Formatting a page of results as a table
//! - Rendering either as JSON

mod json;
mod text;

pub use json::render_json;
pub use text::{format_record, format_result_page};

use serde::Serialize;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Renders a value in the requested format
///
/// `text` produces the plain-text form; it is only called for
/// `OutputFormat::Text`.
pub fn render<T, F>(value: &T, format: OutputFormat, text: F) -> Result<String, serde_json::Error>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => render_json(value),
    }
}
