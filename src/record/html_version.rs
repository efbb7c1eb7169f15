/// Document version classification
///
/// This is a substring match against a fixed set of doctype literals, not a
/// doctype parser.
use serde::Serialize;
use std::fmt;

/// The literal HTML 4.01 Strict doctype
pub(crate) const HTML401_STRICT_DOCTYPE: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#;

/// The literal XHTML 1.0 Strict doctype
pub(crate) const XHTML10_STRICT_DOCTYPE: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#;

/// Represents the detected HTML version of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum HtmlVersion {
    /// `<!doctype html>` in any letter case
    #[serde(rename = "HTML5")]
    Html5,

    /// The exact HTML 4.01 Strict public identifier
    #[serde(rename = "HTML 4.01 Strict")]
    Html401Strict,

    /// The exact XHTML 1.0 Strict public identifier
    #[serde(rename = "XHTML 1.0 Strict")]
    Xhtml10Strict,

    /// Anything else, including pages that were never fetched
    #[default]
    #[serde(rename = "Unknown/Other")]
    Unknown,
}

impl HtmlVersion {
    /// Classifies a raw document
    ///
    /// The raw text is inspected rather than the parsed tree since some
    /// parsers drop the doctype. Checks run in order: HTML5 first, then the
    /// two strict literals.
    pub fn detect(raw: &str) -> Self {
        if raw.to_lowercase().contains("<!doctype html>") {
            Self::Html5
        } else if raw.contains(HTML401_STRICT_DOCTYPE) {
            Self::Html401Strict
        } else if raw.contains(XHTML10_STRICT_DOCTYPE) {
            Self::Xhtml10Strict
        } else {
            Self::Unknown
        }
    }

    /// Returns the label stored in the database and shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Self::Html5 => "HTML5",
            Self::Html401Strict => "HTML 4.01 Strict",
            Self::Xhtml10Strict => "XHTML 1.0 Strict",
            Self::Unknown => "Unknown/Other",
        }
    }

    /// Parses a stored label
    ///
    /// Returns None if the string doesn't match any known label.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "HTML5" => Some(Self::Html5),
            "HTML 4.01 Strict" => Some(Self::Html401Strict),
            "XHTML 1.0 Strict" => Some(Self::Xhtml10Strict),
            "Unknown/Other" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for HtmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
