//! Configuration module for Quarry
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every option has a default, so an empty file is a valid config.
//!
//! # Example
//!
//! ```no_run
//! use quarry::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Concurrency gate: {}", config.crawl.max_concurrent_requests);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, DedupScope, FilterConfig, GithubConfig, OutputConfig, PipelineConfig,
    RepoTarget,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
