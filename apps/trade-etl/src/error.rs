//! Run-level error types for the ETL pipeline.
//!
//! Record-level problems never surface here: they are recovered inside the
//! ingest layer (see [`crate::ingest::RejectReason`]). Everything in
//! [`EtlError`] aborts the run before any report is written.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort an ETL run.
#[derive(Debug, Error)]
pub enum EtlError {
    /// No usable input files were supplied.
    #[error("No input files found")]
    NoInputFiles,

    /// An input path was named but does not exist.
    #[error("No such file \"{}\"", path.display())]
    MissingInput {
        /// The missing path.
        path: PathBuf,
    },

    /// Reading an input file failed after it was opened.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Writing a report failed.
    #[error("Failed to write report '{}': {source}", path.display())]
    Report {
        /// Report being written.
        path: PathBuf,
        /// The underlying CSV error.
        source: csv::Error,
    },

    /// A phase worker pool could not be built.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EtlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn report(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Report {
            path: path.into(),
            source,
        }
    }

    /// Whether the run was rejected before any input was read.
    #[must_use]
    pub const fn is_fatal_input(&self) -> bool {
        matches!(self, Self::NoInputFiles | Self::MissingInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_input_classification() {
        assert!(EtlError::NoInputFiles.is_fatal_input());
        assert!(
            EtlError::MissingInput {
                path: PathBuf::from("D0.csv")
            }
            .is_fatal_input()
        );
        assert!(
            !EtlError::ThreadPool {
                message: "boom".to_string()
            }
            .is_fatal_input()
        );
    }

    #[test]
    fn test_missing_input_message() {
        let err = EtlError::MissingInput {
            path: PathBuf::from("D3.csv"),
        };
        assert_eq!(err.to_string(), "No such file \"D3.csv\"");
    }
}
