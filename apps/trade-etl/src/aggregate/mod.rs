//! Thread-safe sparse aggregation of trades by day and instrument.

mod aggregator;
mod average;

pub use aggregator::{Aggregator, DailyAggregates, PriceCells, VolumeCells};
pub use average::RunningAverage;
