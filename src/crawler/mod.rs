//! Crawler module: the page-analysis pipeline
//!
//! This module contains the crawl logic, including:
//! - HTTP fetching with timeouts
//! - Charset-aware body decoding
//! - HTML parsing and structural extraction
//! - Orchestration of a crawl and recording of its result

mod assembler;
mod decode;
mod extractor;
mod fetcher;

pub use assembler::{Assembler, CrawlOutcome, CrawlStage};
pub use extractor::{extract, parse_document, ExtractedFields, ParseError, ParsedDocument};
pub use fetcher::{build_http_client, fetch_url, user_agent_string, FetchError, FetchedPage};

use crate::config::Config;
use crate::storage::SqliteStorage;
use crate::ProbeError;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Runs a single crawl against the configured database
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Open the result store
/// 2. Build the HTTP client
/// 3. Fetch, parse and extract the page
/// 4. Record the result
///
/// # Arguments
///
/// * `config` - The probe configuration
/// * `url` - The URL to analyze
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ran; inspect the outcome for its error
/// * `Err(ProbeError)` - Storage or HTTP client could not be initialized
pub async fn crawl(config: &Config, url: &str) -> Result<CrawlOutcome, ProbeError> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let assembler = Assembler::from_config(config, Arc::new(Mutex::new(storage)))?;
    Ok(assembler.crawl(url).await)
}
