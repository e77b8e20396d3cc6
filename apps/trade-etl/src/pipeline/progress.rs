//! Progress tracking for parallel file ingestion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Progress tracker shared by ingestion workers.
#[derive(Debug)]
pub struct IngestProgress {
    total_files: u64,
    completed_files: AtomicU64,
    rejected_rows: AtomicU64,
    start_time: Instant,
}

impl IngestProgress {
    /// Create a tracker for `total_files` files.
    #[must_use]
    pub fn new(total_files: u64) -> Self {
        Self {
            total_files,
            completed_files: AtomicU64::new(0),
            rejected_rows: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Mark a file as fully ingested.
    pub fn file_completed(&self, rejected_rows: u64) {
        self.completed_files.fetch_add(1, Ordering::Relaxed);
        self.rejected_rows.fetch_add(rejected_rows, Ordering::Relaxed);
    }

    /// Rejected rows across completed files.
    #[must_use]
    pub fn rejected_rows(&self) -> u64 {
        self.rejected_rows.load(Ordering::Relaxed)
    }

    /// Get current progress.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            total_files: self.total_files,
            completed_files: self.completed_files.load(Ordering::Relaxed),
            rejected_rows: self.rejected_rows(),
            elapsed_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Files to ingest.
    pub total_files: u64,
    /// Files fully ingested.
    pub completed_files: u64,
    /// Rows rejected so far.
    pub rejected_rows: u64,
    /// Time since ingestion started.
    pub elapsed_ms: u64,
}

impl Progress {
    /// Get completion percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            100.0
        } else {
            (self.completed_files as f64 / self.total_files as f64) * 100.0
        }
    }
}
