//! Sumi-Probe: a single-page structural analyzer
//!
//! This crate fetches one web page, extracts structural metadata from its HTML
//! (document version, title, heading histogram, link counts, login form
//! presence) and persists the result for paginated, searchable, sortable
//! retrieval.

pub mod config;
pub mod crawler;
pub mod output;
pub mod query;
pub mod record;
pub mod storage;
pub mod url;

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for Sumi-Probe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid URL format: {0}")]
    InvalidUrlFormat(#[from] UrlError),

    #[error("{message}")]
    UrlFetchFailed { url: String, message: String },

    #[error("{message}")]
    HtmlParseFailed { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid sort specification: {0}")]
    SortSpecInvalid(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ProbeError {
    /// Maps the error onto the status class reported to the caller
    ///
    /// Input errors are client errors, a batch delete that matched nothing is
    /// a not-found, everything else is a server error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrlFormat(_) | Self::SortSpecInvalid(_) => StatusCode::BAD_REQUEST,
            Self::Storage(storage::StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Assembler, CrawlOutcome};
pub use query::{build_list_plan, QueryPlan};
pub use record::{CrawlResult, HtmlVersion};
pub use storage::{ResultPage, ResultStore, SqliteStorage};
