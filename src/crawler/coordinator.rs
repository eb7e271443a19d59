//! Crawl coordinator - per-repository orchestration
//!
//! Drives each repository through its fetch sequence:
//! metadata → recursive tree → filtered file list → blob contents,
//! emitting one raw record per successfully fetched file. Repositories run
//! concurrently in a `JoinSet`; all of their requests share the one
//! concurrency gate owned by the fetcher, so many repositories in flight
//! still respect the global request budget.
//!
//! Failure domains are per repository and per file: a failed repository
//! never aborts its siblings, and a failed or timed-out blob drops only
//! that file.

use crate::config::Config;
use crate::crawler::filter;
use crate::github::{GitHubApi, TreeEntry};
use crate::record::RawRecord;
use crate::sanitize::Sanitizer;
use crate::shutdown::ShutdownHandle;
use crate::stream::RawStreamWriter;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;

/// Phases a repository passes through while being crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPhase {
    Init,
    TreeFetched,
    Filtered,
    ContentFetched,
    Done,
    Skipped,
}

/// Why a repository produced no records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Metadata endpoint returned nothing usable (404 included)
    RepoInfoUnavailable,

    /// Metadata carried no default branch
    NoDefaultBranch,

    /// License not in the configured allow-list
    LicenseRejected(String),

    /// Tree endpoint returned nothing usable
    TreeUnavailable,

    /// Shutdown was requested before this repository started
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RepoInfoUnavailable => write!(f, "repository info unavailable"),
            Self::NoDefaultBranch => write!(f, "default branch unknown"),
            Self::LicenseRejected(license) => write!(f, "license '{}' not allowed", license),
            Self::TreeUnavailable => write!(f, "tree unavailable"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One repository to crawl
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Outcome of crawling one repository
///
/// Zero files written is a valid, non-error outcome (empty or fully
/// filtered repository).
#[derive(Debug)]
pub struct RepoReport {
    pub repo: String,
    pub files_written: usize,
    pub truncated_tree: bool,
    pub skipped: Option<SkipReason>,
}

/// Aggregated results of a crawl run
#[derive(Debug, Default)]
pub struct CrawlSummary {
    pub attempted: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files_written: usize,
    pub truncated_trees: usize,
}

/// Coordinates concurrent per-repository crawls
pub struct Coordinator {
    config: Arc<Config>,
    api: GitHubApi,
    sanitizer: Arc<Sanitizer>,
    writer: Arc<Mutex<RawStreamWriter>>,
    shutdown: ShutdownHandle,
}

impl Coordinator {
    pub fn new(
        config: Config,
        api: GitHubApi,
        writer: RawStreamWriter,
        shutdown: ShutdownHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            api,
            sanitizer: Arc::new(Sanitizer::new()),
            writer: Arc::new(Mutex::new(writer)),
            shutdown,
        }
    }

    /// Crawls the given targets, capped at `max-repositories`
    ///
    /// Every repository runs in its own task with an isolated failure
    /// domain; the summary aggregates per-repository reports.
    pub async fn run(&self, mut targets: Vec<CrawlTarget>) -> CrawlSummary {
        targets.truncate(self.config.crawl.max_repositories);

        let mut summary = CrawlSummary {
            attempted: targets.len(),
            ..CrawlSummary::default()
        };

        let mut tasks = JoinSet::new();
        for target in targets {
            let config = Arc::clone(&self.config);
            let api = self.api.clone();
            let sanitizer = Arc::clone(&self.sanitizer);
            let writer = Arc::clone(&self.writer);
            let shutdown = self.shutdown.clone();

            tasks.spawn(async move {
                process_repo(config, api, sanitizer, writer, shutdown, target).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => {
                    if let Some(reason) = &report.skipped {
                        tracing::warn!("Skipping repo {} ({})", report.repo, reason);
                        summary.skipped += 1;
                    } else {
                        summary.processed += 1;
                        summary.files_written += report.files_written;
                    }
                    if report.truncated_tree {
                        summary.truncated_trees += 1;
                    }
                }
                Err(e) => {
                    // A panicked repository task is contained here
                    tracing::error!("Repository task failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

/// Crawls a single repository end to end
async fn process_repo(
    config: Arc<Config>,
    api: GitHubApi,
    sanitizer: Arc<Sanitizer>,
    writer: Arc<Mutex<RawStreamWriter>>,
    shutdown: ShutdownHandle,
    target: CrawlTarget,
) -> RepoReport {
    let repo = target.to_string();
    let mut phase = RepoPhase::Init;
    tracing::info!("Processing repository: {}", repo);
    tracing::debug!("{}: {:?}", repo, phase);

    let skip = |reason: SkipReason| RepoReport {
        repo: repo.clone(),
        files_written: 0,
        truncated_tree: false,
        skipped: Some(reason),
    };

    if shutdown.is_triggered() {
        return skip(SkipReason::Cancelled);
    }

    // 1. Metadata: default branch + license, fetched once for the whole repo
    let info = match api.repo_info(&target.owner, &target.name).await {
        Ok(Some(info)) => info,
        Ok(None) => return skip(SkipReason::RepoInfoUnavailable),
        Err(e) => {
            tracing::error!("Failed to get repo info for {}: {}", repo, e);
            return skip(SkipReason::RepoInfoUnavailable);
        }
    };

    let license = info.license_id();
    if !license_allowed(&license, &config.github.required_licenses) {
        return skip(SkipReason::LicenseRejected(license));
    }

    let Some(branch) = info.default_branch.clone() else {
        return skip(SkipReason::NoDefaultBranch);
    };

    // 2. Recursive tree for the default branch
    let tree = match api.tree(&target.owner, &target.name, &branch).await {
        Ok(Some(tree)) => tree,
        Ok(None) => return skip(SkipReason::TreeUnavailable),
        Err(e) => {
            tracing::error!("Failed to get tree for {}: {}", repo, e);
            return skip(SkipReason::TreeUnavailable);
        }
    };
    phase = RepoPhase::TreeFetched;
    tracing::debug!("{}: {:?}, {} entries", repo, phase, tree.tree.len());

    let truncated = tree.truncated;
    if truncated {
        // Best-effort limitation: large trees lose files, flagged not fixed
        tracing::warn!("Tree for {} was truncated; some files may be missed", repo);
    }

    // 3-4. Filter entries, cap at max-files-per-repo in tree order
    let files: Vec<TreeEntry> = tree
        .tree
        .into_iter()
        .filter(|entry| filter::is_relevant(entry, &config.filter))
        .take(config.crawl.max_files_per_repo)
        .collect();
    phase = RepoPhase::Filtered;
    tracing::debug!("{}: {:?}, {} relevant files", repo, phase, files.len());

    if files.is_empty() {
        tracing::info!("No relevant files found in {}", repo);
        return RepoReport {
            repo,
            files_written: 0,
            truncated_tree: truncated,
            skipped: None,
        };
    }

    tracing::info!("Fetching content for {} files in {}", files.len(), repo);

    // 5. Fetch blob contents concurrently; the fetcher's shared gate keeps
    //    the whole run inside the request budget
    let blob_timeout = Duration::from_secs(config.crawl.blob_timeout_secs);
    let mut fetches = JoinSet::new();
    for entry in files {
        let api = api.clone();
        let owner = target.owner.clone();
        let name = target.name.clone();
        fetches.spawn(async move {
            let result =
                tokio::time::timeout(blob_timeout, api.blob_text(&owner, &name, &entry.sha)).await;
            (entry, result)
        });
    }

    // 6. Emit one record per decoded blob, in completion order
    let mut files_written = 0;
    let mut shutdown = shutdown;
    loop {
        let joined = tokio::select! {
            joined = fetches.join_next() => joined,
            _ = shutdown.triggered() => {
                tracing::info!("{}: cancelling remaining blob fetches", repo);
                fetches.abort_all();
                break;
            }
        };
        let Some(joined) = joined else {
            break;
        };

        match joined {
            Ok((entry, Ok(Ok(Some(content))))) => {
                let findings = sanitizer.scan(&content);
                let record = RawRecord {
                    repo_url: info.html_url.clone(),
                    path: entry.path,
                    size: entry.size,
                    license: license.clone(),
                    content_sha: entry.sha,
                    content: Some(content),
                    findings,
                };

                let result = writer.lock().unwrap().append(&record);
                match result {
                    Ok(()) => files_written += 1,
                    Err(e) => tracing::error!("Failed to write record for {}: {}", repo, e),
                }
            }
            Ok((entry, Ok(Ok(None)))) => {
                tracing::warn!(
                    "Could not fetch or decode content for {} in {}",
                    entry.path,
                    repo
                );
            }
            Ok((entry, Ok(Err(e)))) => {
                tracing::error!("Error fetching blob for {} in {}: {}", entry.path, repo, e);
            }
            Ok((entry, Err(_))) => {
                tracing::error!(
                    "Timeout fetching blob {} for {} in {}",
                    entry.sha,
                    entry.path,
                    repo
                );
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                tracing::error!("Blob task failed in {}: {}", repo, e);
            }
        }
    }
    phase = RepoPhase::ContentFetched;
    tracing::debug!("{}: {:?}", repo, phase);

    phase = RepoPhase::Done;
    tracing::info!(
        "Finished processing {} ({} files written, {:?})",
        repo,
        files_written,
        phase
    );

    RepoReport {
        repo,
        files_written,
        truncated_tree: truncated,
        skipped: None,
    }
}

/// License allow-list check
///
/// Empty allow-list admits everything. Comparison is case-insensitive and
/// "NOASSERTION" is always admitted as "unknown, caller's risk".
pub fn license_allowed(license: &str, allow_list: &[String]) -> bool {
    if allow_list.is_empty() {
        return true;
    }

    if license.eq_ignore_ascii_case("NOASSERTION") {
        return true;
    }

    allow_list
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(license))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_allowed_empty_list() {
        assert!(license_allowed("GPL-3.0", &[]));
    }

    #[test]
    fn test_license_allowed_case_insensitive() {
        let allowed = vec!["mit".to_string(), "apache-2.0".to_string()];

        assert!(license_allowed("MIT", &allowed));
        assert!(license_allowed("mit", &allowed));
        assert!(license_allowed("Apache-2.0", &allowed));
        assert!(!license_allowed("GPL-3.0", &allowed));
    }

    #[test]
    fn test_noassertion_always_allowed() {
        let allowed = vec!["mit".to_string()];
        assert!(license_allowed("NOASSERTION", &allowed));
        assert!(license_allowed("noassertion", &allowed));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::LicenseRejected("GPL-3.0".to_string()).to_string(),
            "license 'GPL-3.0' not allowed"
        );
        assert_eq!(SkipReason::TreeUnavailable.to_string(), "tree unavailable");
    }

    #[test]
    fn test_crawl_target_display() {
        let target = CrawlTarget {
            owner: "octocat".to_string(),
            name: "hello-world".to_string(),
        };
        assert_eq!(target.to_string(), "octocat/hello-world");
    }

    // End-to-end coordinator behavior (skips, sibling isolation, record
    // emission) is covered with wiremock in tests/crawl_tests.rs.
}
