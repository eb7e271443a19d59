//! Columnar dataset writer
//!
//! Writes scored records to a single Parquet file with a fixed, explicit
//! schema. Nested sub-records are flattened up front: `findings` is stored
//! as a JSON-encoded string column and the annotations become typed nullable
//! columns. Schema inference over heterogeneous nested fields is exactly the
//! failure mode this avoids.
//!
//! Writing is incremental: records are buffered and flushed as a
//! `RecordBatch` every `BATCH_SIZE` rows, so a late write failure loses at
//! most one batch of work rather than the whole scored set.

use crate::record::ScoredRecord;
use arrow_array::{ArrayRef, BooleanArray, Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const BATCH_SIZE: usize = 1024;

/// The fixed output schema
pub fn dataset_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("repo_url", DataType::Utf8, false),
        Field::new("path", DataType::Utf8, false),
        Field::new("size", DataType::UInt64, true),
        Field::new("license", DataType::Utf8, false),
        Field::new("content_sha", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("findings", DataType::Utf8, false),
        Field::new("content_hash", DataType::Utf8, false),
        Field::new("line_count", DataType::UInt64, false),
        Field::new("quality_score", DataType::Float64, false),
        Field::new("comment_ratio", DataType::Float64, true),
        Field::new("code_density", DataType::Float64, true),
        Field::new("has_tests_keyword", DataType::Boolean, false),
    ]))
}

/// Incremental Parquet writer for scored records
pub struct DatasetWriter {
    writer: ArrowWriter<File>,
    schema: Arc<Schema>,
    pending: Vec<ScoredRecord>,
    rows_written: usize,
}

impl DatasetWriter {
    /// Creates (truncating) the dataset file
    pub fn create(path: &Path) -> crate::Result<Self> {
        let schema = dataset_schema();
        let file = File::create(path)?;
        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), None)?;

        Ok(Self {
            writer,
            schema,
            pending: Vec::with_capacity(BATCH_SIZE),
            rows_written: 0,
        })
    }

    /// Buffers one record, flushing a batch when full
    pub fn append(&mut self, record: ScoredRecord) -> crate::Result<()> {
        self.pending.push(record);
        if self.pending.len() >= BATCH_SIZE {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Flushes the trailing batch and closes the file
    ///
    /// Returns the total number of rows written.
    pub fn finish(mut self) -> crate::Result<usize> {
        self.flush_batch()?;
        self.writer.close()?;
        Ok(self.rows_written)
    }

    fn flush_batch(&mut self) -> crate::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let batch = to_record_batch(&self.schema, &self.pending)?;
        self.writer.write(&batch)?;
        self.rows_written += self.pending.len();
        self.pending.clear();
        Ok(())
    }
}

fn to_record_batch(schema: &Arc<Schema>, records: &[ScoredRecord]) -> crate::Result<RecordBatch> {
    let findings: Vec<String> = records
        .iter()
        .map(|r| serde_json::to_string(&r.raw().findings))
        .collect::<Result<_, _>>()?;

    let repo_urls = StringArray::from_iter_values(records.iter().map(|r| r.raw().repo_url.as_str()));
    let paths = StringArray::from_iter_values(records.iter().map(|r| r.raw().path.as_str()));
    let sizes = UInt64Array::from(records.iter().map(|r| r.raw().size).collect::<Vec<_>>());
    let licenses = StringArray::from_iter_values(records.iter().map(|r| r.raw().license.as_str()));
    let shas = StringArray::from_iter_values(records.iter().map(|r| r.raw().content_sha.as_str()));
    // Filtered records always carry content; the fallback never fires in the pipeline
    let contents = StringArray::from_iter_values(
        records
            .iter()
            .map(|r| r.raw().content.as_deref().unwrap_or("")),
    );
    let findings = StringArray::from_iter_values(findings.iter().map(|s| s.as_str()));
    let hashes =
        StringArray::from_iter_values(records.iter().map(|r| r.filtered.content_hash.as_str()));
    let line_counts =
        UInt64Array::from(records.iter().map(|r| r.filtered.line_count).collect::<Vec<_>>());
    let scores =
        Float64Array::from(records.iter().map(|r| r.quality_score).collect::<Vec<_>>());
    let comment_ratios = Float64Array::from(
        records
            .iter()
            .map(|r| r.annotations.comment_ratio)
            .collect::<Vec<_>>(),
    );
    let code_densities = Float64Array::from(
        records
            .iter()
            .map(|r| r.annotations.code_density)
            .collect::<Vec<_>>(),
    );
    let has_tests = BooleanArray::from(
        records
            .iter()
            .map(|r| r.annotations.has_tests_keyword)
            .collect::<Vec<_>>(),
    );

    let batch = RecordBatch::try_new(
        Arc::clone(schema),
        vec![
            Arc::new(repo_urls) as ArrayRef,
            Arc::new(paths),
            Arc::new(sizes),
            Arc::new(licenses),
            Arc::new(shas),
            Arc::new(contents),
            Arc::new(findings),
            Arc::new(hashes),
            Arc::new(line_counts),
            Arc::new(scores),
            Arc::new(comment_ratios),
            Arc::new(code_densities),
            Arc::new(has_tests),
        ],
    )?;

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Annotations, FilteredRecord, Finding, RawRecord};
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::NamedTempFile;

    fn scored(path: &str, hash: &str) -> ScoredRecord {
        ScoredRecord {
            filtered: FilteredRecord {
                raw: RawRecord {
                    repo_url: "https://github.com/octocat/hello".to_string(),
                    path: path.to_string(),
                    size: Some(10),
                    license: "MIT".to_string(),
                    content_sha: "sha".to_string(),
                    content: Some("x = 1\n".to_string()),
                    findings: vec![Finding::PotentialPrivateKey { count: 1 }],
                },
                content_hash: hash.to_string(),
                line_count: 1,
            },
            quality_score: 0.5,
            annotations: Annotations {
                comment_ratio: Some(0.1),
                code_density: Some(0.9),
                has_tests_keyword: false,
            },
        }
    }

    fn read_row_count(path: &Path) -> i64 {
        let file = File::open(path).unwrap();
        let reader = SerializedFileReader::new(file).unwrap();
        reader.metadata().file_metadata().num_rows()
    }

    #[test]
    fn test_rows_written_matches_appends() {
        let file = NamedTempFile::new().unwrap();

        let mut writer = DatasetWriter::create(file.path()).unwrap();
        for i in 0..10 {
            writer.append(scored(&format!("f{}.py", i), &format!("h{}", i))).unwrap();
        }
        let rows = writer.finish().unwrap();

        assert_eq!(rows, 10);
        assert_eq!(read_row_count(file.path()), 10);
    }

    #[test]
    fn test_multiple_batches() {
        let file = NamedTempFile::new().unwrap();

        let mut writer = DatasetWriter::create(file.path()).unwrap();
        for i in 0..(BATCH_SIZE + 5) {
            writer.append(scored(&format!("f{}.py", i), &format!("h{}", i))).unwrap();
        }
        let rows = writer.finish().unwrap();

        assert_eq!(rows, BATCH_SIZE + 5);
        assert_eq!(read_row_count(file.path()) as usize, BATCH_SIZE + 5);
    }

    #[test]
    fn test_empty_dataset_is_valid() {
        let file = NamedTempFile::new().unwrap();

        let writer = DatasetWriter::create(file.path()).unwrap();
        let rows = writer.finish().unwrap();

        assert_eq!(rows, 0);
        assert_eq!(read_row_count(file.path()), 0);
    }

    #[test]
    fn test_absent_annotations_are_null_columns() {
        let file = NamedTempFile::new().unwrap();

        let mut record = scored("f.py", "h");
        record.annotations.comment_ratio = None;
        record.annotations.code_density = None;

        let mut writer = DatasetWriter::create(file.path()).unwrap();
        writer.append(record).unwrap();
        assert_eq!(writer.finish().unwrap(), 1);
    }

    #[test]
    fn test_schema_field_names() {
        let schema = dataset_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "repo_url",
                "path",
                "size",
                "license",
                "content_sha",
                "content",
                "findings",
                "content_hash",
                "line_count",
                "quality_score",
                "comment_ratio",
                "code_density",
                "has_tests_keyword",
            ]
        );
    }
}
