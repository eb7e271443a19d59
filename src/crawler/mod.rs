//! Crawl phase: repository discovery and content harvesting
//!
//! `run_crawl` wires the pieces together: builds the HTTP client from the
//! environment token, resolves targets (explicit config entries or a
//! repository search), opens the raw stream, and hands everything to the
//! coordinator.

mod coordinator;
mod filter;

pub use coordinator::{
    license_allowed, Coordinator, CrawlSummary, CrawlTarget, RepoPhase, RepoReport, SkipReason,
};
pub use filter::is_relevant;

use crate::config::Config;
use crate::github::{build_http_client, build_search_query, Fetcher, GitHubApi, RateLimiter};
use crate::shutdown::ShutdownHandle;
use crate::stream::RawStreamWriter;
use crate::QuarryError;
use chrono::Utc;
use std::path::Path;
use std::time::Duration;

/// Runs the crawl phase end to end
///
/// Reads `GITHUB_TOKEN` from the environment; its absence is fatal.
pub async fn run_crawl(config: Config, shutdown: ShutdownHandle) -> crate::Result<CrawlSummary> {
    let token = std::env::var("GITHUB_TOKEN").map_err(|_| QuarryError::MissingToken)?;

    let client = build_http_client(&token)?;
    let limiter = RateLimiter::new(Duration::from_secs(config.crawl.rate_limit_buffer_secs));
    let fetcher = Fetcher::new(
        client,
        config.crawl.max_concurrent_requests as usize,
        limiter,
        Duration::from_millis(config.crawl.request_delay_ms),
    );
    let api = GitHubApi::new(fetcher, &config.github.api_url);

    let targets = resolve_targets(&config, &api).await?;
    if targets.is_empty() {
        tracing::info!("No repositories found matching the criteria");
        return Ok(CrawlSummary::default());
    }
    tracing::info!("Found {} candidate repositories", targets.len());

    let writer = RawStreamWriter::create(Path::new(&config.output.raw_path))?;

    let start = std::time::Instant::now();
    let coordinator = Coordinator::new(config, api, writer, shutdown);
    let summary = coordinator.run(targets).await;

    tracing::info!("Crawling finished in {:.2?}", start.elapsed());
    tracing::info!(
        "Attempted {} repositories: {} processed, {} skipped, {} failed",
        summary.attempted,
        summary.processed,
        summary.skipped,
        summary.failed
    );
    if summary.truncated_trees > 0 {
        tracing::warn!(
            "{} repositories had truncated trees (files may be missing)",
            summary.truncated_trees
        );
    }
    tracing::info!("Total files written: {}", summary.files_written);

    Ok(summary)
}

/// Resolves crawl targets from config or the search endpoint
async fn resolve_targets(config: &Config, api: &GitHubApi) -> crate::Result<Vec<CrawlTarget>> {
    if !config.repositories.is_empty() {
        return Ok(config
            .repositories
            .iter()
            .map(|r| CrawlTarget {
                owner: r.owner.clone(),
                name: r.name.clone(),
            })
            .collect());
    }

    let query = build_search_query(&config.github, Utc::now());
    tracing::info!("Searching repos with query: {}", query);

    let found = api.search_repositories(&query, 100).await?;
    Ok(found
        .into_iter()
        .map(|r| CrawlTarget {
            owner: r.owner.login,
            name: r.name,
        })
        .collect())
}
