//! Crawl orchestration
//!
//! The assembler drives one crawl through its stages:
//!
//! ```text
//! Init -> UrlParsed -> Fetched -> BodyRead -> Parsed -> Extracted -> Saved
//!   \__________\___________\_________\__________\___________\_____> Failed
//! ```
//!
//! Every failure after the URL was accepted is recorded in the store with
//! zeroed metrics. Recording a failed crawl is best-effort: a store error at
//! that point is logged and the original failure is what the caller sees.

use crate::config::{Config, ExtractionConfig};
use crate::crawler::extractor::{extract, parse_document};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchError};
use crate::record::CrawlResult;
use crate::storage::{ResultStore, StorageError};
use crate::url::parse_crawl_target;
use crate::ProbeError;
use reqwest::Client;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Stages of a single crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStage {
    Init,
    UrlParsed,
    Fetched,
    BodyRead,
    Parsed,
    Extracted,
    Saved,
    Failed,
}

impl CrawlStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::UrlParsed => "url_parsed",
            Self::Fetched => "fetched",
            Self::BodyRead => "body_read",
            Self::Parsed => "parsed",
            Self::Extracted => "extracted",
            Self::Saved => "saved",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one crawl invocation
///
/// A record is always present. On failure `error` holds the classified
/// error and `record.error` its description; `id` is set whenever the record
/// reached the store.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub record: CrawlResult,
    pub id: Option<i64>,
    /// Last stage completed successfully
    pub last_stage: CrawlStage,
    pub error: Option<ProbeError>,
}

impl CrawlOutcome {
    /// The terminal stage: `Saved` on success, `Failed` otherwise
    pub fn stage(&self) -> CrawlStage {
        if self.error.is_some() {
            CrawlStage::Failed
        } else {
            self.last_stage
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Collapses the outcome into the record or its error
    pub fn into_result(self) -> Result<CrawlResult, ProbeError> {
        match self.error {
            None => Ok(self.record),
            Some(error) => Err(error),
        }
    }
}

/// Runs crawls and records their results
///
/// The store is shared behind a mutex; the lock is only taken for a single
/// store call and never held across an await point.
pub struct Assembler<S: ResultStore> {
    client: Client,
    store: Arc<Mutex<S>>,
    policy: ExtractionConfig,
}

impl<S: ResultStore> Assembler<S> {
    pub fn new(client: Client, store: Arc<Mutex<S>>, policy: ExtractionConfig) -> Self {
        Self {
            client,
            store,
            policy,
        }
    }

    /// Creates an assembler with an HTTP client built from the configuration
    pub fn from_config(config: &Config, store: Arc<Mutex<S>>) -> Result<Self, ProbeError> {
        let client = build_http_client(&config.fetcher, &config.user_agent)?;
        Ok(Self::new(client, store, config.extraction))
    }

    /// Returns a handle to the shared store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Crawls one URL
    ///
    /// | Failure | Persisted | Error |
    /// |---------|-----------|-------|
    /// | URL does not parse | no | `InvalidUrlFormat` |
    /// | Transport error, status >= 400, body read error | best-effort | `UrlFetchFailed` |
    /// | Body is not a document | best-effort | `HtmlParseFailed` |
    /// | Store rejects a successful result | no | `Storage` (record still returned) |
    pub async fn crawl(&self, input: &str) -> CrawlOutcome {
        let mut record = CrawlResult::new(input);

        let url = match parse_crawl_target(input) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(url = input, error = %e, "Rejected crawl request");
                let error = ProbeError::from(e);
                record.error = error.to_string();
                return CrawlOutcome {
                    record,
                    id: None,
                    last_stage: CrawlStage::Init,
                    error: Some(error),
                };
            }
        };
        tracing::debug!(%url, stage = %CrawlStage::UrlParsed, "Crawl started");

        let page = match fetch_url(&self.client, &url).await {
            Ok(page) => page,
            Err(e) => {
                let last_stage = if e.is_body_error() {
                    CrawlStage::Fetched
                } else {
                    CrawlStage::UrlParsed
                };
                let message = fetch_failure_message(&e);
                return self.record_failure(record, last_stage, fetch_failed(input, message));
            }
        };

        if page.is_http_error() {
            let message = format!("URL returned status code: {}", page.status_code);
            return self.record_failure(
                record,
                CrawlStage::UrlParsed,
                fetch_failed(input, message),
            );
        }
        tracing::debug!(
            %url,
            status_code = page.status_code,
            bytes = page.body.len(),
            stage = %CrawlStage::BodyRead,
            "Body read"
        );

        let fields = match parse_document(&page.body, page.content_type.as_deref()) {
            Ok(document) => {
                tracing::debug!(%url, stage = %CrawlStage::Parsed, "Document parsed");
                extract(&document, &url, &self.policy)
            }
            Err(e) => {
                let error = ProbeError::HtmlParseFailed {
                    url: input.to_string(),
                    message: format!("failed to parse HTML: {}", e),
                };
                return self.record_failure(record, CrawlStage::BodyRead, error);
            }
        };
        fields.apply_to(&mut record);
        tracing::debug!(%url, stage = %CrawlStage::Extracted, "Fields extracted");

        match self.save(&record) {
            Ok(id) => {
                record.id = Some(id);
                tracing::info!(
                    %url,
                    id,
                    html_version = %record.html_version,
                    internal = record.internal_link_count,
                    external = record.external_link_count,
                    "Crawl saved"
                );
                CrawlOutcome {
                    record,
                    id: Some(id),
                    last_stage: CrawlStage::Saved,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(%url, error = %e, "Failed to save crawl result");
                record.error = format!("failed to save crawl result: {}", e);
                CrawlOutcome {
                    record,
                    id: None,
                    last_stage: CrawlStage::Extracted,
                    error: Some(ProbeError::Storage(e)),
                }
            }
        }
    }

    /// Zeroes the record, stores it best-effort and returns the failure
    fn record_failure(
        &self,
        mut record: CrawlResult,
        last_stage: CrawlStage,
        error: ProbeError,
    ) -> CrawlOutcome {
        record.mark_failed(error.to_string());
        tracing::warn!(
            url = record.url.as_deref().unwrap_or_default(),
            after = %last_stage,
            error = %record.error,
            "Crawl failed"
        );

        let id = match self.save(&record) {
            Ok(id) => {
                record.id = Some(id);
                Some(id)
            }
            Err(save_error) => {
                tracing::error!(
                    error = %save_error,
                    original_error = %error,
                    "Error saving failed crawl result"
                );
                None
            }
        };

        CrawlOutcome {
            record,
            id,
            last_stage,
            error: Some(error),
        }
    }

    fn save(&self, record: &CrawlResult) -> Result<i64, StorageError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| StorageError::Database("result store lock poisoned".to_string()))?;
        store.save(record)
    }
}

fn fetch_failed(url: &str, message: String) -> ProbeError {
    ProbeError::UrlFetchFailed {
        url: url.to_string(),
        message,
    }
}

fn fetch_failure_message(error: &FetchError) -> String {
    match error {
        FetchError::Body(_) => error.to_string(),
        _ => format!("failed to fetch URL: {}", error),
    }
}
