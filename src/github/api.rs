//! Typed wrappers around the REST endpoints the crawl uses
//!
//! Each method issues one logical fetch through the [`Fetcher`] and maps the
//! dynamic JSON into the endpoint's model. A payload that doesn't match the
//! expected shape is logged and treated as absent rather than as a fatal
//! error — the caller's skip logic handles the rest.

use crate::config::GithubConfig;
use crate::github::fetcher::{FetchError, Fetcher};
use crate::github::types::{BlobResponse, RepoInfo, RepoSummary, SearchResponse, TreeResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::de::DeserializeOwned;
use url::Url;

/// GitHub REST API client
#[derive(Debug, Clone)]
pub struct GitHubApi {
    fetcher: Fetcher,
    base: String,
}

impl GitHubApi {
    pub fn new(fetcher: Fetcher, api_url: &str) -> Self {
        Self {
            fetcher,
            base: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Searches repositories, most-starred first
    ///
    /// An empty result list is a valid outcome, not an error.
    pub async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<RepoSummary>, FetchError> {
        let url = Url::parse_with_params(
            &format!("{}/search/repositories", self.base),
            &[
                ("q", query),
                ("per_page", per_page.to_string().as_str()),
                ("sort", "stars"),
                ("order", "desc"),
            ],
        )
        .map_err(|e| FetchError::InvalidUrl {
            message: e.to_string(),
        })?;

        let response: Option<SearchResponse> = self.fetch_typed(url.as_str()).await?;
        Ok(response.map(|r| r.items).unwrap_or_default())
    }

    /// Fetches repository metadata (default branch, license)
    pub async fn repo_info(&self, owner: &str, name: &str) -> Result<Option<RepoInfo>, FetchError> {
        let url = format!("{}/repos/{}/{}", self.base, owner, name);
        self.fetch_typed(&url).await
    }

    /// Fetches the recursive tree for a branch
    pub async fn tree(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Option<TreeResponse>, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.base, owner, name, branch
        );
        self.fetch_typed(&url).await
    }

    /// Fetches a blob and decodes its text content
    ///
    /// Undecodable base64 is logged and reported as absent; the rare
    /// non-base64 blob body is passed through as-is.
    pub async fn blob_text(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<Option<String>, FetchError> {
        let url = format!("{}/repos/{}/{}/git/blobs/{}", self.base, owner, name, sha);
        let blob: Option<BlobResponse> = self.fetch_typed(&url).await?;

        Ok(blob.and_then(|b| decode_blob(&b, sha)))
    }

    async fn fetch_typed<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, FetchError> {
        let Some(value) = self.fetcher.fetch_json(url).await? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(e) => {
                tracing::warn!("Unexpected payload shape from {}: {}", url, e);
                Ok(None)
            }
        }
    }
}

/// Builds the repository search query from the configured criteria
///
/// Mirrors the search qualifier syntax: `language:`, `stars:>`, `pushed:>`
/// and one `license:` qualifier per allowed license.
pub fn build_search_query(config: &GithubConfig, now: DateTime<Utc>) -> String {
    let mut parts = Vec::new();

    if !config.target_language.is_empty() {
        parts.push(format!("language:{}", config.target_language));
    }
    parts.push(format!("stars:>{}", config.min_stars));

    let min_push = now - ChronoDuration::days(i64::from(config.max_age_days));
    parts.push(format!("pushed:>{}", min_push.format("%Y-%m-%d")));

    for license in &config.required_licenses {
        parts.push(format!("license:{}", license));
    }

    parts.join(" ")
}

fn decode_blob(blob: &BlobResponse, sha: &str) -> Option<String> {
    let content = blob.content.as_ref()?;

    if blob.encoding.as_deref() == Some("base64") {
        // Blob bodies arrive base64 with embedded newlines
        let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        match BASE64.decode(compact.as_bytes()) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!("Failed to decode base64 content for blob {}: {}", sha, e);
                None
            }
        }
    } else {
        tracing::warn!("Blob {} was not base64 encoded", sha);
        Some(content.clone())
    }
}
