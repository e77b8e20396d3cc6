//! Sparse per-day, per-instrument aggregation.
//!
//! [`Aggregator`] is the only state shared mutably between ingestion
//! workers. It wraps [`DailyAggregates`] in one mutex and applies a whole
//! batch per lock acquisition. Once ingestion is over the aggregator is
//! consumed with [`Aggregator::into_inner`], leaving a plain
//! `DailyAggregates` that later phases can only read.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use super::average::RunningAverage;
use crate::ingest::{InstrumentId, TradeDay, TradeRecord};

/// Day → instrument → running price average.
pub type PriceCells = HashMap<TradeDay, HashMap<InstrumentId, RunningAverage>>;

/// Day → instrument → summed volume.
pub type VolumeCells = HashMap<TradeDay, HashMap<InstrumentId, i64>>;

/// Sparse aggregation of every accepted trade in a run.
///
/// A `(day, id)` cell exists iff at least one trade for it was applied.
/// Cells are only ever extended, never removed.
#[derive(Debug, Default, Clone)]
pub struct DailyAggregates {
    prices: PriceCells,
    volumes: VolumeCells,
    rows: u64,
}

impl DailyAggregates {
    /// Empty aggregation state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `price` into the `(day, id)` average, creating the cell if needed.
    pub fn record_price(&mut self, day: &TradeDay, id: InstrumentId, price: f64) {
        self.prices
            .entry(day.clone())
            .or_default()
            .entry(id)
            .or_default()
            .add(price);
    }

    /// Add `volume` to the `(day, id)` total, creating the cell at zero if needed.
    pub fn record_volume(&mut self, day: &TradeDay, id: InstrumentId, volume: i64) {
        let cell = self
            .volumes
            .entry(day.clone())
            .or_default()
            .entry(id)
            .or_insert(0);
        *cell = cell.saturating_add(volume);
    }

    /// Apply one accepted record to both maps and count it.
    pub fn apply(&mut self, record: &TradeRecord) {
        self.record_price(&record.day, record.instrument_id, record.price);
        self.record_volume(&record.day, record.instrument_id, record.volume);
        self.rows += 1;
    }

    /// Rows applied so far.
    #[must_use]
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Whether no trade has been applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Every day with at least one trade, in no particular order.
    pub fn days(&self) -> impl Iterator<Item = &TradeDay> {
        self.prices.keys()
    }

    /// The price cell for `(day, id)`.
    #[must_use]
    pub fn price_cell(&self, day: &TradeDay, id: InstrumentId) -> Option<&RunningAverage> {
        self.prices.get(day).and_then(|cells| cells.get(&id))
    }

    /// Average price for `(day, id)` if the instrument traded that day.
    #[must_use]
    pub fn price(&self, day: &TradeDay, id: InstrumentId) -> Option<f64> {
        self.price_cell(day, id).and_then(RunningAverage::value)
    }

    /// Summed volume for `(day, id)` if the instrument traded that day.
    #[must_use]
    pub fn volume(&self, day: &TradeDay, id: InstrumentId) -> Option<i64> {
        self.volumes.get(day).and_then(|cells| cells.get(&id)).copied()
    }

    /// Number of populated `(day, id)` cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.prices.values().map(HashMap::len).sum()
    }
}

/// Thread-safe aggregator shared by ingestion workers.
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<DailyAggregates>,
}

impl Aggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one price observation in.
    pub fn record_price(&self, day: &TradeDay, id: InstrumentId, price: f64) {
        self.state.lock().record_price(day, id, price);
    }

    /// Add one volume observation.
    pub fn record_volume(&self, day: &TradeDay, id: InstrumentId, volume: i64) {
        self.state.lock().record_volume(day, id, volume);
    }

    /// Apply a batch under a single critical section.
    ///
    /// Returns the run's total row count after the batch.
    pub fn apply_batch(&self, batch: &[TradeRecord]) -> u64 {
        let mut state = self.state.lock();
        for record in batch {
            state.apply(record);
        }
        let rows = state.rows();
        drop(state);

        debug!(batch = batch.len(), rows, "Applied batch");
        rows
    }

    /// Rows aggregated so far.
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.state.lock().rows()
    }

    /// Freeze the aggregation. No further mutation is possible.
    #[must_use]
    pub fn into_inner(self) -> DailyAggregates {
        self.state.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn day(s: &str) -> TradeDay {
        crate::ingest::parse_day(s).unwrap()
    }

    fn trade(d: &str, id: InstrumentId, price: f64, volume: i64) -> TradeRecord {
        TradeRecord::new(day(d), id, price, volume)
    }

    #[test]
    fn test_cells_exist_only_for_observed_trades() {
        let mut agg = DailyAggregates::new();
        agg.apply(&trade("1999-04-01", 111, 3.0, 1));

        assert!(agg.price_cell(&day("1999-04-01"), 111).is_some());
        assert!(agg.price_cell(&day("1999-04-01"), 7).is_none());
        assert!(agg.volume(&day("2001-01-01"), 111).is_none());
        assert_eq!(agg.cell_count(), 1);
    }

    #[test]
    fn test_price_averages_and_volume_sums() {
        let mut agg = DailyAggregates::new();
        agg.apply(&trade("1999-04-01", 111, 3.0, 1));
        agg.apply(&trade("1999-04-01", 111, 9.0, 1));

        assert_eq!(agg.price(&day("1999-04-01"), 111), Some(6.0));
        assert_eq!(agg.volume(&day("1999-04-01"), 111), Some(2));
        assert_eq!(agg.rows(), 2);
    }

    #[test]
    fn test_record_volume_starts_at_zero() {
        let agg = Aggregator::new();
        agg.record_volume(&day("2024-01-01"), 5, 40);
        agg.record_volume(&day("2024-01-01"), 5, 2);
        agg.record_price(&day("2024-01-01"), 5, 10.0);

        let frozen = agg.into_inner();
        assert_eq!(frozen.volume(&day("2024-01-01"), 5), Some(42));
        assert_eq!(frozen.price(&day("2024-01-01"), 5), Some(10.0));
        // Single-cell operations do not count rows.
        assert_eq!(frozen.rows(), 0);
    }

    #[test]
    fn test_apply_batch_returns_running_total() {
        let agg = Aggregator::new();
        let batch = vec![trade("2024-01-01", 1, 1.0, 1), trade("2024-01-02", 1, 2.0, 1)];
        assert_eq!(agg.apply_batch(&batch), 2);
        assert_eq!(agg.apply_batch(&batch), 4);
        assert_eq!(agg.rows(), 4);
    }

    #[test]
    fn test_concurrent_batches_are_not_lost() {
        let agg = Aggregator::new();
        let batch: Vec<TradeRecord> = (0..100).map(|i| trade("2024-01-01", i % 5, 2.0, 1)).collect();

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10 {
                        agg.apply_batch(&batch);
                    }
                });
            }
        });

        let frozen = agg.into_inner();
        assert_eq!(frozen.rows(), 8 * 10 * 100);
        for id in 0..5 {
            assert_eq!(frozen.volume(&day("2024-01-01"), id), Some(8 * 10 * 20));
            assert_eq!(frozen.price_cell(&day("2024-01-01"), id).unwrap().count(), 8 * 10 * 20);
        }
    }
}
