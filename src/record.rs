//! Record types flowing through the harvest and pipeline stages
//!
//! A `RawRecord` is created exactly once per successfully fetched file and
//! appended to the newline-delimited JSON stream. The pipeline upgrades it to
//! a `FilteredRecord` (fingerprint + line count) and finally a `ScoredRecord`
//! (quality score + annotations). Records are never mutated after creation;
//! each stage produces the next type.

use serde::{Deserialize, Serialize};

/// A single harvested file, as written to the raw stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// HTML URL of the owning repository
    pub repo_url: String,

    /// Path of the file within the repository tree
    pub path: String,

    /// Size in bytes as reported by the tree endpoint (may be absent)
    pub size: Option<u64>,

    /// SPDX license id of the repository, or "NOASSERTION"
    pub license: String,

    /// Git blob sha of the file content
    pub content_sha: String,

    /// Decoded text content; `None` when the blob could not be decoded
    pub content: Option<String>,

    /// Scanner findings for this content
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// A single secret/PII finding reported by the content scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Finding {
    /// Email addresses matched in the content (first-seen order, unique)
    PiiEmail { matches: Vec<String> },

    /// PEM private key headers matched in the content
    PotentialPrivateKey { count: usize },

    /// Strings shaped like cloud access key ids
    ApiKeyPattern { count: usize },
}

/// A raw record that passed filtering and deduplication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredRecord {
    #[serde(flatten)]
    pub raw: RawRecord,

    /// Hex SHA-256 fingerprint of the raw content bytes
    pub content_hash: String,

    /// Number of newline characters in the content
    pub line_count: u64,
}

/// A filtered record with its quality score and annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub filtered: FilteredRecord,

    /// Quality score in [0, 1], rounded to 3 decimal places
    pub quality_score: f64,

    pub annotations: Annotations,
}

/// Scoring annotations
///
/// The ratio fields are absent for content with zero lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_ratio: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_density: Option<f64>,

    pub has_tests_keyword: bool,
}

impl ScoredRecord {
    /// Convenience accessor for the underlying raw record
    pub fn raw(&self) -> &RawRecord {
        &self.filtered.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawRecord {
        RawRecord {
            repo_url: "https://github.com/octocat/hello".to_string(),
            path: "src/app.py".to_string(),
            size: Some(42),
            license: "MIT".to_string(),
            content_sha: "abc123".to_string(),
            content: Some("print('hi')\n".to_string()),
            findings: vec![Finding::PiiEmail {
                matches: vec!["a@example.com".to_string()],
            }],
        }
    }

    #[test]
    fn test_raw_record_json_roundtrip() {
        let record = sample_raw();
        let json = serde_json::to_string(&record).unwrap();
        let back: RawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_finding_tagged_representation() {
        let finding = Finding::PotentialPrivateKey { count: 2 };
        let json = serde_json::to_string(&finding).unwrap();
        assert_eq!(json, r#"{"type":"potential_private_key","count":2}"#);

        let email = Finding::PiiEmail {
            matches: vec!["x@y.io".to_string()],
        };
        let json = serde_json::to_string(&email).unwrap();
        assert!(json.contains(r#""type":"pii_email""#));
    }

    #[test]
    fn test_scored_record_serializes_flat() {
        let scored = ScoredRecord {
            filtered: FilteredRecord {
                raw: sample_raw(),
                content_hash: "deadbeef".to_string(),
                line_count: 1,
            },
            quality_score: 0.5,
            annotations: Annotations {
                comment_ratio: Some(0.1),
                code_density: Some(0.9),
                has_tests_keyword: false,
            },
        };

        let value: serde_json::Value = serde_json::to_value(&scored).unwrap();
        // Flattened: raw fields, filter fields, and score live at the top level
        assert_eq!(value["path"], "src/app.py");
        assert_eq!(value["content_hash"], "deadbeef");
        assert_eq!(value["quality_score"], 0.5);
        assert_eq!(value["annotations"]["has_tests_keyword"], false);
    }

    #[test]
    fn test_annotations_omitted_when_absent() {
        let annotations = Annotations {
            comment_ratio: None,
            code_density: None,
            has_tests_keyword: true,
        };
        let json = serde_json::to_string(&annotations).unwrap();
        assert!(!json.contains("comment_ratio"));
        assert!(!json.contains("code_density"));
        assert!(json.contains("has_tests_keyword"));
    }

    #[test]
    fn test_raw_record_missing_findings_defaults_empty() {
        let json = r#"{"repo_url":"u","path":"p","size":null,"license":"MIT","content_sha":"s","content":null}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert!(record.findings.is_empty());
        assert!(record.content.is_none());
    }
}
