//! GitHub REST API boundary
//!
//! This module owns everything that talks to the platform:
//! - typed payload models per endpoint
//! - rate-limit signal parsing and sleep computation
//! - the gated, retry-once HTTP fetcher
//! - endpoint wrappers (search, repo metadata, tree, blob)
//!
//! Nothing outside this module performs network I/O.

mod api;
mod fetcher;
mod rate_limit;
mod types;

pub use api::{build_search_query, GitHubApi};
pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use rate_limit::{RateLimitSignals, RateLimiter, REMAINING_HEADER, RESET_HEADER};
pub use types::{BlobResponse, LicenseInfo, RepoInfo, RepoOwner, RepoSummary, TreeEntry, TreeResponse};
