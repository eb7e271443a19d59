//! Pipeline phase: raw stream → filtered → scored → Parquet
//!
//! A single sequential pass over the NDJSON raw stream. The dedup stage owns
//! the only mutable state and must see records in order; scoring is pure and
//! the writer batches rows incrementally. Every dropped record lands in a
//! counter, so the summary always adds up to the number of lines read.

mod dedup;
mod score;
mod writer;

pub use dedup::{DedupFilter, Rejection};
pub use score::{score_content, score_record};
pub use writer::{dataset_schema, DatasetWriter};

use crate::config::Config;
use crate::stream::{RawStreamReader, StreamLine};
use crate::QuarryError;
use std::path::Path;

/// Counters for one pipeline run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Lines consumed from the raw stream (malformed ones included)
    pub lines_read: usize,

    /// Lines that were not valid records and were skipped
    pub parse_failures: usize,

    /// Records dropped by the content/line-count filters
    pub filtered: usize,

    /// Records dropped as exact duplicates
    pub deduplicated: usize,

    /// Records that reached the scored dataset
    pub kept: usize,

    /// Rows confirmed written by the dataset writer
    pub rows_written: usize,
}

/// Runs the pipeline over the configured raw stream
///
/// The stream file must exist; re-running over the same file with a fresh
/// process produces an identical dataset.
pub fn run_pipeline(config: &Config) -> crate::Result<PipelineSummary> {
    let raw_path = Path::new(&config.output.raw_path);
    if !raw_path.exists() {
        return Err(QuarryError::RawStreamMissing(config.output.raw_path.clone()));
    }

    tracing::info!("Starting data processing pipeline");
    tracing::info!(
        "Reading '{}', filtering, deduplicating ({:?} scope), scoring",
        config.output.raw_path,
        config.pipeline.dedup_scope
    );

    let reader = RawStreamReader::open(raw_path)?;
    let mut stage = DedupFilter::new(config.filter.min_file_lines, config.pipeline.dedup_scope);
    let mut writer = DatasetWriter::create(Path::new(&config.output.dataset_path))?;

    let mut summary = PipelineSummary::default();

    for line in reader {
        summary.lines_read += 1;

        match line? {
            StreamLine::Malformed { line_number, error } => {
                tracing::warn!("Skipping invalid JSON line {}: {}", line_number, error);
                summary.parse_failures += 1;
            }
            StreamLine::Record(record) => match stage.apply(*record) {
                Ok(filtered) => {
                    let scored = score_record(filtered);
                    writer.append(scored)?;
                    summary.kept += 1;
                }
                Err(Rejection::Duplicate) => summary.deduplicated += 1,
                Err(Rejection::EmptyContent) | Err(Rejection::TooFewLines) => {
                    summary.filtered += 1;
                }
            },
        }

        if summary.lines_read % 1000 == 0 {
            tracing::debug!(
                "Read: {}, Filtered: {}, Deduplicated: {}, Kept: {}",
                summary.lines_read,
                summary.filtered,
                summary.deduplicated,
                summary.kept
            );
        }
    }

    summary.rows_written = writer.finish()?;

    tracing::info!(
        "Pipeline finished. Read: {} ({} invalid), Filtered: {}, Deduplicated: {}, Kept: {}",
        summary.lines_read,
        summary.parse_failures,
        summary.filtered,
        summary.deduplicated,
        summary.kept
    );
    tracing::info!(
        "Final dataset saved to '{}' ({} rows)",
        config.output.dataset_path,
        summary.rows_written
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use crate::stream::RawStreamWriter;
    use tempfile::TempDir;

    fn record(path: &str, content: &str) -> RawRecord {
        RawRecord {
            repo_url: "https://github.com/octocat/hello".to_string(),
            path: path.to_string(),
            size: Some(content.len() as u64),
            license: "MIT".to_string(),
            content_sha: "sha".to_string(),
            content: Some(content.to_string()),
            findings: Vec::new(),
        }
    }

    fn config_in(dir: &TempDir) -> Config {
        let mut config: Config = toml::from_str("").unwrap();
        config.output.raw_path = dir
            .path()
            .join("raw.jsonl")
            .to_string_lossy()
            .into_owned();
        config.output.dataset_path = dir
            .path()
            .join("dataset.parquet")
            .to_string_lossy()
            .into_owned();
        config.filter.min_file_lines = 2;
        config
    }

    const GOOD: &str = "a = 1\nb = 2\nc = 3\n";

    #[test]
    fn test_missing_raw_stream_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let result = run_pipeline(&config);
        assert!(matches!(result, Err(QuarryError::RawStreamMissing(_))));
    }

    #[test]
    fn test_counters_add_up() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let mut writer = RawStreamWriter::create(Path::new(&config.output.raw_path)).unwrap();
        writer.append(&record("a.py", GOOD)).unwrap();
        writer.append(&record("b.py", GOOD)).unwrap(); // duplicate content
        writer.append(&record("short.py", "x\n")).unwrap(); // too few lines
        let mut none = record("none.py", "");
        none.content = None;
        writer.append(&none).unwrap(); // empty content
        drop(writer);

        let summary = run_pipeline(&config).unwrap();

        assert_eq!(summary.lines_read, 4);
        assert_eq!(summary.parse_failures, 0);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.deduplicated, 1);
        assert_eq!(summary.filtered, 2);
        assert_eq!(summary.rows_written, 1);
        assert_eq!(
            summary.lines_read,
            summary.kept + summary.deduplicated + summary.filtered + summary.parse_failures
        );
    }

    #[test]
    fn test_invalid_json_line_skipped_run_continues() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let mut writer = RawStreamWriter::create(Path::new(&config.output.raw_path)).unwrap();
        writer.append(&record("a.py", GOOD)).unwrap();
        drop(writer);

        use std::io::Write as _;
        let mut raw = std::fs::OpenOptions::new()
            .append(true)
            .open(&config.output.raw_path)
            .unwrap();
        writeln!(raw, "garbage line").unwrap();
        writeln!(
            raw,
            "{}",
            serde_json::to_string(&record("b.py", "x\ny\nz\n")).unwrap()
        )
        .unwrap();

        let summary = run_pipeline(&config).unwrap();

        assert_eq!(summary.lines_read, 3);
        assert_eq!(summary.parse_failures, 1);
        assert_eq!(summary.kept, 2);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let mut writer = RawStreamWriter::create(Path::new(&config.output.raw_path)).unwrap();
        writer.append(&record("a.py", GOOD)).unwrap();
        writer.append(&record("b.py", "q\nw\ne\nr\n")).unwrap();
        writer.append(&record("c.py", GOOD)).unwrap();
        drop(writer);

        let first = run_pipeline(&config).unwrap();
        let second = run_pipeline(&config).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.kept, 2);
    }
}
