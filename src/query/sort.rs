use crate::ProbeError;
use serde_json::{Map, Value};

/// A sortable column, as exposed to callers
///
/// External sort keys are mapped onto known columns here before anything
/// reaches the SQL text. Keys outside this set are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    HtmlVersion,
    Url,
    PageTitle,
    InternalLinkCount,
    ExternalLinkCount,
    InaccessibleLinkCount,
    HasLoginForm,
    Error,
    CreatedAt,
}

impl SortKey {
    /// Column name in the `crawl_results` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::HtmlVersion => "html_version",
            Self::Url => "url",
            Self::PageTitle => "page_title",
            Self::InternalLinkCount => "internal_link_count",
            Self::ExternalLinkCount => "external_link_count",
            Self::InaccessibleLinkCount => "inaccessible_link_count",
            Self::HasLoginForm => "has_login_form",
            Self::Error => "error",
            Self::CreatedAt => "created_at",
        }
    }

    /// Looks up an external sort key
    ///
    /// Returns None for anything that is not an exact, known key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Self::Id),
            "html_version" => Some(Self::HtmlVersion),
            "url" => Some(Self::Url),
            "page_title" => Some(Self::PageTitle),
            "internal_link_count" => Some(Self::InternalLinkCount),
            "external_link_count" => Some(Self::ExternalLinkCount),
            "inaccessible_link_count" => Some(Self::InaccessibleLinkCount),
            "has_login_form" => Some(Self::HasLoginForm),
            "error" => Some(Self::Error),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// One `column ASC|DESC` entry of an ORDER BY clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortTerm {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortTerm {
    pub fn to_sql(&self) -> String {
        let direction = if self.ascending { "ASC" } else { "DESC" };
        format!("{} {}", self.key.column(), direction)
    }
}

/// Parses a serialized sort specification
///
/// A sort specification is a JSON object mapping sort keys to a boolean, `true` meaning
/// ascending: `{"page_title": true, "id": false}`. Terms keep the order in
/// which they appear in the input. Blank input yields no terms.
///
/// # Errors
///
/// `ProbeError::SortSpecInvalid` if the text is not a JSON object of
/// booleans or names an unknown key.
pub fn parse_sort_spec(spec: &str) -> Result<Vec<SortTerm>, ProbeError> {
    if spec.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Map<String, Value> = serde_json::from_str(spec)
        .map_err(|e| ProbeError::SortSpecInvalid(format!("malformed sort JSON: {}", e)))?;

    entries
        .iter()
        .map(|(name, direction)| -> Result<SortTerm, ProbeError> {
            let key = SortKey::from_key(name).ok_or_else(|| {
                ProbeError::SortSpecInvalid(format!("unknown sort key '{}'", name))
            })?;
            let ascending = direction.as_bool().ok_or_else(|| {
                ProbeError::SortSpecInvalid(format!(
                    "sort direction for '{}' must be a boolean, got {}",
                    name, direction
                ))
            })?;
            Ok(SortTerm { key, ascending })
        })
        .collect()
}
