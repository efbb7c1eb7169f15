//! URL handling module for Sumi-Probe
//!
//! This module validates crawl targets before any network activity and
//! compares URL authorities for link classification.

mod authority;
mod target;

// Re-export main functions
pub use authority::{same_authority, Authority};
pub use target::parse_crawl_target;
