//! Orchestration of the ingest → resolve → write phases.
//!
//! # Example
//!
//! ```ignore
//! use trade_etl::config::EtlConfig;
//! use trade_etl::pipeline::EtlPipeline;
//!
//! let pipeline = EtlPipeline::new(EtlConfig::default());
//! let outcome = pipeline.run_inputs(&["D0.csv".into(), "D1.csv".into()])?;
//! println!("{} rows", outcome.rows_read());
//! ```

mod executor;
mod progress;
mod summary;

pub use executor::{EtlPipeline, REPORT_GROUPS};
pub use progress::{IngestProgress, Progress};
pub use summary::{Period, PhaseWorkers, RunOutcome, RunSummary};
