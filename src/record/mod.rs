//! Crawl result records
//!
//! One `CrawlResult` is produced per crawl attempt, successful or not, and
//! persisted exactly once.
//!
//! # Components
//!
//! - `CrawlResult`: the persisted record
//! - `HtmlVersion`: the closed set of document version classifications

mod crawl_result;
mod html_version;

// Re-export main types
pub use crawl_result::{CrawlResult, FAILED_TITLE, NO_TITLE};
pub use html_version::HtmlVersion;
