use serde::Deserialize;

/// Main configuration structure for Sumi-Probe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Hard limit on a whole request, including reading the body (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Limit on establishing the connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed before giving up
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Extraction policy switches
///
/// Stored history was produced under different policies, so each one is a
/// switch rather than a fixed behavior.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExtractionConfig {
    #[serde(rename = "empty-title", default)]
    pub empty_title: EmptyTitle,

    #[serde(rename = "heading-counts", default)]
    pub heading_counts: HeadingCounts,

    #[serde(rename = "unresolvable-links", default)]
    pub unresolvable_links: UnresolvableLinks,
}

/// What to record when a page has no title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyTitle {
    /// Keep the empty string
    #[default]
    Empty,
    /// Substitute the "NO TITLE" sentinel
    Sentinel,
}

/// Whether heading levels with no occurrences get a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingCounts {
    #[default]
    OmitZero,
    IncludeZero,
}

/// How anchors whose href cannot be resolved are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvableLinks {
    /// Not counted anywhere
    #[default]
    Skip,
    /// Counted as inaccessible
    Count,
}
