//! Typed payload models for the GitHub REST endpoints we touch
//!
//! The API's loosely-typed JSON is mapped to explicit structs per endpoint;
//! fields the API may omit are explicit `Option`s. Unknown fields are
//! ignored on purpose — the payloads carry far more than we consume.

use serde::Deserialize;

/// One repository as returned by the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub owner: RepoOwner,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// Search endpoint envelope
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<RepoSummary>,
}

/// Repository metadata endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub html_url: String,
    pub default_branch: Option<String>,
    pub license: Option<LicenseInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseInfo {
    pub spdx_id: Option<String>,
}

/// Recursive git tree endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,

    /// Set by the API when the tree was too large to return completely
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a git tree
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub sha: String,

    /// "blob", "tree", or "commit" (submodule)
    #[serde(rename = "type")]
    pub kind: String,

    /// Present for blobs only
    pub size: Option<u64>,
}

/// Git blob endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct BlobResponse {
    pub content: Option<String>,
    pub encoding: Option<String>,
}

impl RepoInfo {
    /// SPDX id of the repository license, defaulting to "NOASSERTION"
    /// when the API reports no license or an unresolvable one.
    pub fn license_id(&self) -> String {
        self.license
            .as_ref()
            .and_then(|l| l.spdx_id.clone())
            .unwrap_or_else(|| "NOASSERTION".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_entry_parses_api_shape() {
        let json = r#"{"path":"src/main.py","mode":"100644","type":"blob","sha":"abc","size":120,"url":"https://example"}"#;
        let entry: TreeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.path, "src/main.py");
        assert_eq!(entry.kind, "blob");
        assert_eq!(entry.size, Some(120));
    }

    #[test]
    fn test_tree_entry_without_size() {
        let json = r#"{"path":"src","type":"tree","sha":"def"}"#;
        let entry: TreeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, "tree");
        assert!(entry.size.is_none());
    }

    #[test]
    fn test_license_id_fallbacks() {
        let no_license: RepoInfo =
            serde_json::from_str(r#"{"html_url":"u","default_branch":"main"}"#).unwrap();
        assert_eq!(no_license.license_id(), "NOASSERTION");

        let null_spdx: RepoInfo = serde_json::from_str(
            r#"{"html_url":"u","default_branch":"main","license":{"spdx_id":null}}"#,
        )
        .unwrap();
        assert_eq!(null_spdx.license_id(), "NOASSERTION");

        let mit: RepoInfo = serde_json::from_str(
            r#"{"html_url":"u","default_branch":"main","license":{"spdx_id":"MIT"}}"#,
        )
        .unwrap();
        assert_eq!(mit.license_id(), "MIT");
    }

    #[test]
    fn test_search_response_defaults_items() {
        let response: SearchResponse = serde_json::from_str(r#"{"total_count":0}"#).unwrap();
        assert!(response.items.is_empty());
    }
}
