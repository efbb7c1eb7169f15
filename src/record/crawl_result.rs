use crate::record::HtmlVersion;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Title recorded for a crawl that failed before extraction
pub const FAILED_TITLE: &str = "CRAWLING HAS FAILED";

/// Title substituted for an empty title under the sentinel policy
pub const NO_TITLE: &str = "NO TITLE";

/// One crawl attempt, as persisted in the result store
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CrawlResult {
    /// Assigned by the store on save
    pub id: Option<i64>,

    /// The URL the crawl was requested for; legacy rows may not have one
    pub url: Option<String>,

    pub html_version: HtmlVersion,

    pub page_title: String,

    /// `h1`..`h6` to occurrence count
    pub heading_counts: BTreeMap<String, u32>,

    pub internal_link_count: u32,

    pub external_link_count: u32,

    pub inaccessible_link_count: u32,

    pub has_login_form: bool,

    /// Human-readable failure description, empty on success
    pub error: String,

    /// Assigned by the store at insert time
    pub created_at: Option<DateTime<Utc>>,
}

impl CrawlResult {
    /// Creates an empty, not yet persisted record for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Resets every extracted field and marks the record as failed
    ///
    /// Used for crawls that fail after the URL was accepted, so the stored
    /// row never carries half-computed metrics.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.html_version = HtmlVersion::Unknown;
        self.page_title = FAILED_TITLE.to_string();
        self.heading_counts.clear();
        self.internal_link_count = 0;
        self.external_link_count = 0;
        self.inaccessible_link_count = 0;
        self.has_login_form = false;
        self.error = error.into();
    }

    /// Returns true if the crawl completed without error
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    /// Total number of counted links
    pub fn total_links(&self) -> u32 {
        self.internal_link_count + self.external_link_count + self.inaccessible_link_count
    }
}
