//! Batched streaming reader for one input file.
//!
//! Accepted records are buffered into batches of `batch_size` so the
//! aggregator lock is taken once per batch rather than once per record.
//! Re-opening the same file yields the same sequence of batches.
//!
//! Lines are read as raw bytes: a line that is not valid UTF-8 is a
//! rejected record, while a failing read ends the stream with an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::EtlError;

use super::record::TradeRecord;
use super::validator::{LineOutcome, RecordValidator, SourceLocation};

/// Default number of records per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Lazy, finite iterator of record batches read from one input.
///
/// Yields `Err` once and then stops if the underlying read fails.
#[derive(Debug)]
pub struct BatchReader<R = BufReader<File>> {
    path: PathBuf,
    input: R,
    line: Vec<u8>,
    batch_size: usize,
    line_number: u64,
    rejected: u64,
    validator: RecordValidator,
    done: bool,
}

impl BatchReader {
    /// Open `path` for batched reading.
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self, EtlError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EtlError::io(path, e))?;
        Ok(Self::from_reader(path, BufReader::new(file), batch_size))
    }
}

impl<R: BufRead> BatchReader<R> {
    /// Read batches from `input`. `path` only labels diagnostics and errors.
    pub fn from_reader(path: impl Into<PathBuf>, input: R, batch_size: usize) -> Self {
        Self {
            path: path.into(),
            input,
            line: Vec::new(),
            batch_size: batch_size.max(1),
            line_number: 0,
            rejected: 0,
            validator: RecordValidator::new(),
            done: false,
        }
    }

    /// Input being read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines consumed so far.
    #[must_use]
    pub const fn lines_read(&self) -> u64 {
        self.line_number
    }

    /// Records rejected so far.
    #[must_use]
    pub const fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl<R: BufRead> Iterator for BatchReader<R> {
    type Item = Result<Vec<TradeRecord>, EtlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size.min(DEFAULT_BATCH_SIZE));
        while batch.len() < self.batch_size {
            self.line.clear();
            match self.input.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(EtlError::io(&self.path, e)));
                }
            }
            self.line_number += 1;

            let location = SourceLocation {
                file: &self.path,
                line: self.line_number,
            };
            match self.validator.validate_bytes(&self.line, location) {
                LineOutcome::Accepted(record) => batch.push(record),
                LineOutcome::Rejected(_) => self.rejected += 1,
                LineOutcome::Blank => {}
            }
        }

        if batch.is_empty() { None } else { Some(Ok(batch)) }
    }
}
