//! Tree-entry relevance filtering
//!
//! A tree entry survives iff it is a blob, its size is within
//! `[min_file_size, max_file_size]`, its lowercased path ends with one of
//! the target extensions, and no path segment equals an excluded directory
//! name.
//! The directory check compares whole segments, never substrings, so
//! `not_node_modules/` is not excluded by `node_modules`.

use crate::config::FilterConfig;
use crate::github::TreeEntry;

/// Returns true when the entry qualifies for content fetching
pub fn is_relevant(entry: &TreeEntry, config: &FilterConfig) -> bool {
    if entry.kind != "blob" {
        return false;
    }

    let Some(size) = entry.size else {
        return false;
    };
    if size < config.min_file_size || size > config.max_file_size {
        return false;
    }

    let path = entry.path.to_lowercase();

    if !config
        .target_extensions
        .iter()
        .any(|ext| path.ends_with(ext.as_str()))
    {
        return false;
    }

    if path
        .split('/')
        .any(|segment| config.excluded_dirs.iter().any(|dir| segment == dir.as_str()))
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FilterConfig {
        FilterConfig {
            target_extensions: vec![".py".to_string(), ".md".to_string()],
            excluded_dirs: vec!["node_modules".to_string(), "vendor".to_string()],
            min_file_size: 1,
            max_file_size: 1000,
            min_file_lines: 5,
        }
    }

    fn blob(path: &str, size: Option<u64>) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            sha: "sha".to_string(),
            kind: "blob".to_string(),
            size,
        }
    }

    #[test]
    fn test_accepts_matching_blob() {
        assert!(is_relevant(&blob("src/app.py", Some(500)), &test_config()));
    }

    #[test]
    fn test_rejects_non_blob() {
        let mut entry = blob("src", Some(500));
        entry.kind = "tree".to_string();
        assert!(!is_relevant(&entry, &test_config()));
    }

    #[test]
    fn test_size_boundaries() {
        let config = test_config();

        // max_file_size is inclusive
        assert!(is_relevant(&blob("a.py", Some(1000)), &config));
        assert!(!is_relevant(&blob("a.py", Some(1001)), &config));

        // empty and size-less files are rejected
        assert!(!is_relevant(&blob("a.py", Some(0)), &config));
        assert!(!is_relevant(&blob("a.py", None), &config));

        // min_file_size is inclusive too
        let mut config = config;
        config.min_file_size = 10;
        assert!(is_relevant(&blob("a.py", Some(10)), &config));
        assert!(!is_relevant(&blob("a.py", Some(9)), &config));
    }

    #[test]
    fn test_extension_allow_list() {
        let config = test_config();

        assert!(is_relevant(&blob("README.md", Some(10)), &config));
        assert!(!is_relevant(&blob("main.rs", Some(10)), &config));

        // extension matching is case-insensitive via path lowercasing
        assert!(is_relevant(&blob("SETUP.PY", Some(10)), &config));
    }

    #[test]
    fn test_excluded_dir_matches_whole_segment() {
        let config = test_config();

        assert!(!is_relevant(&blob("node_modules/a.py", Some(10)), &config));
        assert!(!is_relevant(
            &blob("pkg/vendor/deep/a.py", Some(10)),
            &config
        ));

        // substring of a segment is not a match
        assert!(is_relevant(
            &blob("not_node_modules/a.py", Some(10)),
            &config
        ));
        assert!(is_relevant(&blob("vendored/a.py", Some(10)), &config));
    }

    #[test]
    fn test_excluded_dir_anywhere_in_path() {
        let config = test_config();
        assert!(!is_relevant(
            &blob("node_modules/nested/deep/a.py", Some(10)),
            &config
        ));
        assert!(!is_relevant(&blob("a/b/node_modules/c.md", Some(10)), &config));
    }
}
