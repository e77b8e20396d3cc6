// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines
    )
)]

//! Trade ETL - Rust Core Library
//!
//! Batch extract-transform-load over partitioned daily trade records.
//!
//! # Pipeline
//!
//! - **Ingest** (`ingest`, `aggregate`): every input file is streamed by its
//!   own worker, validated line by line, and folded into a shared sparse
//!   aggregation of average price and summed volume per (day, instrument).
//! - **Resolve** (`resolve`): the distinct days are sorted once and each
//!   instrument's first traded price is found.
//! - **Write** (`report`): dense `PRICE.csv`, `GAINS.csv` and `VOLUME.csv`,
//!   one row per day and one column per instrument, with prices forward
//!   filled across days without trades.
//!
//! `pipeline::EtlPipeline` sequences the phases; each run owns its own
//! state, so independent runs never interfere.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Sparse per-day, per-instrument aggregation.
pub mod aggregate;

/// Run configuration.
pub mod config;

/// Run-level errors.
pub mod error;

/// Input validation and batched reading.
pub mod ingest;

/// Phase orchestration.
pub mod pipeline;

/// Dense report output.
pub mod report;

/// Day index and first-price resolution.
pub mod resolve;

/// Synthetic input generation.
pub mod synth;

/// Tracing subscriber setup.
pub mod telemetry;

pub use aggregate::{Aggregator, DailyAggregates, RunningAverage};
pub use config::{EtlConfig, load_config};
pub use error::EtlError;
pub use ingest::{InstrumentId, TradeDay, TradeRecord};
pub use pipeline::{EtlPipeline, RunOutcome, RunSummary};
pub use report::PeriodGains;
pub use resolve::{DayIndex, FirstPrices};
