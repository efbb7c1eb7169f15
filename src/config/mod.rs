//! Configuration module for Sumi-Probe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_probe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("probe.toml")).unwrap();
//! println!("Request timeout: {}s", config.fetcher.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, EmptyTitle, ExtractionConfig, FetcherConfig, HeadingCounts, OutputConfig,
    UnresolvableLinks, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
