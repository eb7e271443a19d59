//! Filtering and exact deduplication
//!
//! This stage is strictly sequential: the seen-fingerprint set is owned by
//! one `DedupFilter` instance and records pass through it one at a time, in
//! stream order. Parallelizing it would need a synchronized set or a
//! partition-and-merge strategy; neither is worth it for a stage this cheap.
//!
//! An accepted fingerprint is inserted before the next record is examined,
//! so a later duplicate — from any repository, under global scope — is
//! always rejected.

use crate::config::DedupScope;
use crate::record::{FilteredRecord, RawRecord};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Why the stage dropped a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Content missing or zero-length; rejected before any hashing
    EmptyContent,

    /// Fewer newlines than the configured minimum
    TooFewLines,

    /// Fingerprint already seen within the configured scope
    Duplicate,
}

/// Sequential single-pass dedup/filter stage
#[derive(Debug)]
pub struct DedupFilter {
    min_lines: u64,
    scope: DedupScope,
    seen_global: HashSet<String>,
    seen_by_repo: HashMap<String, HashSet<String>>,
}

impl DedupFilter {
    pub fn new(min_lines: u64, scope: DedupScope) -> Self {
        Self {
            min_lines,
            scope,
            seen_global: HashSet::new(),
            seen_by_repo: HashMap::new(),
        }
    }

    /// Hex SHA-256 fingerprint of the raw content bytes
    pub fn fingerprint(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Applies filters and dedup to one record
    ///
    /// The line count is the number of newline characters; a record needs at
    /// least `min_lines` of them (the minimum itself is accepted).
    pub fn apply(&mut self, record: RawRecord) -> Result<FilteredRecord, Rejection> {
        let Some(content) = record.content.as_deref() else {
            return Err(Rejection::EmptyContent);
        };
        if content.is_empty() {
            return Err(Rejection::EmptyContent);
        }

        let line_count = content.bytes().filter(|b| *b == b'\n').count() as u64;
        if line_count < self.min_lines {
            return Err(Rejection::TooFewLines);
        }

        let content_hash = Self::fingerprint(content);

        let seen = match self.scope {
            DedupScope::Global => &mut self.seen_global,
            // One independent set per repository lifetime, never shared
            DedupScope::PerRepository => self
                .seen_by_repo
                .entry(record.repo_url.clone())
                .or_default(),
        };

        if !seen.insert(content_hash.clone()) {
            return Err(Rejection::Duplicate);
        }

        Ok(FilteredRecord {
            raw: record,
            content_hash,
            line_count,
        })
    }
}
