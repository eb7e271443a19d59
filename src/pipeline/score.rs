//! Quality scoring heuristics
//!
//! Pure per-record functions with no shared state. The score favors dense
//! code with a moderate amount of comments and rewards files that look like
//! they carry tests.

use crate::record::{Annotations, FilteredRecord, ScoredRecord};

/// Line prefixes treated as comments
const COMMENT_PREFIXES: &[&str] = &["#", "//"];

/// Substrings (matched on lowercased content) that suggest test code
const TEST_KEYWORDS: &[&str] = &["import unittest", "import pytest", " test", " assert "];

const DENSITY_WEIGHT: f64 = 0.5;
const COMMENT_BONUS: f64 = 0.2;
const TEST_BONUS: f64 = 0.3;

/// Scores one filtered record
pub fn score_record(record: FilteredRecord) -> ScoredRecord {
    let content = record.raw.content.as_deref().unwrap_or("");
    let (quality_score, annotations) = score_content(content);

    ScoredRecord {
        filtered: record,
        quality_score,
        annotations,
    }
}

/// Computes the quality score and annotations for a piece of content
///
/// With zero lines the ratio annotations are omitted and the score comes
/// only from the test-keyword bonus. The final score is clamped to [0, 1]
/// and rounded to 3 decimal places.
pub fn score_content(content: &str) -> (f64, Annotations) {
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();

    let mut score = 0.0;
    let mut comment_ratio = None;
    let mut code_density = None;

    if total > 0 {
        let comment_lines = lines.iter().filter(|line| is_comment(line)).count();
        let code_lines = lines
            .iter()
            .filter(|line| !line.trim().is_empty() && !is_comment(line))
            .count();

        let ratio = comment_lines as f64 / total as f64;
        let density = code_lines as f64 / total as f64;
        comment_ratio = Some(round3(ratio));
        code_density = Some(round3(density));

        score += density * DENSITY_WEIGHT;
        if ratio > 0.05 && ratio < 0.3 {
            score += COMMENT_BONUS;
        }
    }

    let lowered = content.to_lowercase();
    let has_tests_keyword = TEST_KEYWORDS.iter().any(|kw| lowered.contains(kw));
    if has_tests_keyword {
        score += TEST_BONUS;
    }

    (
        round3(score.clamp(0.0, 1.0)),
        Annotations {
            comment_ratio,
            code_density,
            has_tests_keyword,
        },
    )
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    COMMENT_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
