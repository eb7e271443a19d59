use serde::Deserialize;

/// Main configuration structure for Quarry
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Explicit repository targets; when empty the crawl discovers
    /// repositories through the search endpoint instead.
    #[serde(default, rename = "repository")]
    pub repositories: Vec<RepoTarget>,
}

/// GitHub API and repository discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the REST API
    #[serde(rename = "api-url", default = "default_api_url")]
    pub api_url: String,

    /// Language qualifier for the repository search
    #[serde(rename = "target-language", default = "default_language")]
    pub target_language: String,

    /// Minimum star count for the repository search
    #[serde(rename = "min-stars", default = "default_min_stars")]
    pub min_stars: u32,

    /// Only search repositories pushed within this many days
    #[serde(rename = "max-age-days", default = "default_max_age_days")]
    pub max_age_days: u32,

    /// Allowed SPDX license ids (lowercase). Empty means any license;
    /// "NOASSERTION" repositories are always let through.
    #[serde(rename = "required-licenses", default)]
    pub required_licenses: Vec<String>,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of concurrent API requests (the concurrency gate)
    #[serde(rename = "max-concurrent-requests", default = "default_concurrency")]
    pub max_concurrent_requests: u32,

    /// Polite delay applied before every request (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Extra seconds slept past the quota reset time
    #[serde(rename = "rate-limit-buffer-secs", default = "default_rate_buffer")]
    pub rate_limit_buffer_secs: u64,

    /// Per-blob fetch timeout (seconds)
    #[serde(rename = "blob-timeout-secs", default = "default_blob_timeout")]
    pub blob_timeout_secs: u64,

    /// Maximum number of repositories processed in one run
    #[serde(rename = "max-repositories", default = "default_max_repos")]
    pub max_repositories: usize,

    /// Maximum number of files fetched per repository (tree order)
    #[serde(rename = "max-files-per-repo", default = "default_max_files")]
    pub max_files_per_repo: usize,
}

/// Tree-entry filtering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Path suffixes that qualify a file for harvesting
    #[serde(rename = "target-extensions", default = "default_extensions")]
    pub target_extensions: Vec<String>,

    /// Directory names excluded wherever they appear as a path segment
    #[serde(rename = "excluded-dirs", default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Minimum file size in bytes (inclusive)
    #[serde(rename = "min-file-size", default = "default_min_file_size")]
    pub min_file_size: u64,

    /// Maximum file size in bytes (inclusive)
    #[serde(rename = "max-file-size", default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Minimum number of newlines a record must contain (inclusive)
    #[serde(rename = "min-file-lines", default = "default_min_lines")]
    pub min_file_lines: u64,
}

/// Pipeline stage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Boundary within which identical contents count as duplicates
    #[serde(rename = "dedup-scope", default)]
    pub dedup_scope: DedupScope,
}

/// Dedup scope: where two identical contents are considered duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum DedupScope {
    #[default]
    #[serde(rename = "global")]
    Global,
    #[serde(rename = "per-repository")]
    PerRepository,
}

/// Output file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the newline-delimited JSON raw record stream
    #[serde(rename = "raw-path", default = "default_raw_path")]
    pub raw_path: String,

    /// Path of the final Parquet dataset
    #[serde(rename = "dataset-path", default = "default_dataset_path")]
    pub dataset_path: String,
}

/// An explicit repository target
#[derive(Debug, Clone, Deserialize)]
pub struct RepoTarget {
    pub owner: String,
    pub name: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_language() -> String {
    "python".to_string()
}

fn default_min_stars() -> u32 {
    50
}

fn default_max_age_days() -> u32 {
    730
}

fn default_concurrency() -> u32 {
    10
}

fn default_request_delay() -> u64 {
    50
}

fn default_rate_buffer() -> u64 {
    5
}

fn default_blob_timeout() -> u64 {
    60
}

fn default_max_repos() -> usize {
    10
}

fn default_max_files() -> usize {
    10
}

fn default_extensions() -> Vec<String> {
    vec![".py".to_string(), ".md".to_string(), ".txt".to_string()]
}

fn default_excluded_dirs() -> Vec<String> {
    [
        "site-packages",
        "node_modules",
        "vendor",
        ".git",
        "dist",
        "build",
        "__pycache__",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_min_file_size() -> u64 {
    1
}

fn default_max_file_size() -> u64 {
    1024 * 1024
}

fn default_min_lines() -> u64 {
    5
}

fn default_raw_path() -> String {
    "./raw_records.jsonl".to_string()
}

fn default_dataset_path() -> String {
    "./dataset.parquet".to_string()
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            target_language: default_language(),
            min_stars: default_min_stars(),
            max_age_days: default_max_age_days(),
            required_licenses: Vec::new(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_concurrency(),
            request_delay_ms: default_request_delay(),
            rate_limit_buffer_secs: default_rate_buffer(),
            blob_timeout_secs: default_blob_timeout(),
            max_repositories: default_max_repos(),
            max_files_per_repo: default_max_files(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            target_extensions: default_extensions(),
            excluded_dirs: default_excluded_dirs(),
            min_file_size: default_min_file_size(),
            max_file_size: default_max_file_size(),
            min_file_lines: default_min_lines(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dedup_scope: DedupScope::Global,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_path: default_raw_path(),
            dataset_path: default_dataset_path(),
        }
    }
}
