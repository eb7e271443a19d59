//! Quarry: a source-file harvester and dataset builder
//!
//! This crate crawls repositories through the GitHub REST API under a strict
//! request budget, writes the fetched files to a newline-delimited JSON
//! stream, and refines that stream into a deduplicated, quality-scored
//! Parquet dataset.

pub mod config;
pub mod crawler;
pub mod github;
pub mod pipeline;
pub mod record;
pub mod sanitize;
pub mod shutdown;
pub mod stream;

use thiserror::Error;

/// Main error type for Quarry operations
#[derive(Debug, Error)]
pub enum QuarryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("GITHUB_TOKEN environment variable is not set")]
    MissingToken,

    #[error("GITHUB_TOKEN contains characters not allowed in a header")]
    InvalidToken,

    #[error("Fetch error: {0}")]
    Fetch(#[from] github::FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Raw stream not found: {0}")]
    RawStreamMissing(String),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{Annotations, FilteredRecord, Finding, RawRecord, ScoredRecord};
pub use sanitize::Sanitizer;
