//! The raw record stream: newline-delimited JSON, one record per line
//!
//! The stream is both the crawl's output and the pipeline's input, which
//! makes it a recovery checkpoint: the pipeline can be re-run any number of
//! times without re-crawling. Writes are flushed per record so a crashed
//! crawl still leaves a usable prefix behind.

use crate::record::RawRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

/// Incremental writer for the raw stream
#[derive(Debug)]
pub struct RawStreamWriter {
    inner: BufWriter<File>,
    records_written: usize,
}

impl RawStreamWriter {
    /// Creates (truncating) the stream file
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Appends one record as a single JSON line and flushes it
    pub fn append(&mut self, record: &RawRecord) -> crate::Result<()> {
        let line = serde_json::to_string(record)?;
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

/// One line of the raw stream, parsed or not
#[derive(Debug)]
pub enum StreamLine {
    Record(Box<RawRecord>),

    /// The line was not valid JSON for a record; the pipeline skips it and
    /// keeps going.
    Malformed {
        line_number: usize,
        error: serde_json::Error,
    },
}

/// Buffered line-by-line reader over the raw stream
#[derive(Debug)]
pub struct RawStreamReader {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl RawStreamReader {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

impl Iterator for RawStreamReader {
    type Item = std::io::Result<StreamLine>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        self.line_number += 1;

        match serde_json::from_str::<RawRecord>(&line) {
            Ok(record) => Some(Ok(StreamLine::Record(Box::new(record)))),
            Err(error) => Some(Ok(StreamLine::Malformed {
                line_number: self.line_number,
                error,
            })),
        }
    }
}
