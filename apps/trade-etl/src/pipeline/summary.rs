//! Run-level results.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::DailyAggregates;
use crate::ingest::TradeDay;
use crate::report::PeriodGains;
use crate::resolve::{DayIndex, FirstPrices};

/// Observed trading period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    /// Earliest day with a trade.
    pub first: TradeDay,
    /// Latest day with a trade.
    pub last: TradeDay,
}

/// Worker counts chosen for each phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseWorkers {
    /// One unit per input file.
    pub ingest: usize,
    /// One unit per instrument.
    pub resolve: usize,
    /// One unit per report group.
    pub write: usize,
}

/// Statistics reported at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Input files ingested.
    pub files_read: usize,
    /// Valid rows aggregated.
    pub rows_read: u64,
    /// Rows dropped by validation.
    pub rows_rejected: u64,
    /// Worker counts per phase.
    pub workers: PhaseWorkers,
    /// Time spent ingesting and resolving, in milliseconds.
    pub read_elapsed_ms: u64,
    /// Time for the whole run, in milliseconds.
    pub total_elapsed_ms: u64,
    /// Distinct trading days.
    pub days: usize,
    /// Observed period, if any trade was read.
    pub period: Option<Period>,
    /// Gain per instrument on the last day, if any trade was read.
    pub period_gains: Option<PeriodGains>,
    /// Report files written.
    pub reports: Vec<PathBuf>,
}

impl RunSummary {
    /// Log the headline numbers.
    pub fn log(&self) {
        info!(
            rows = self.rows_read,
            rejected = self.rows_rejected,
            files = self.files_read,
            "Read {} rows in {:.2} seconds.",
            self.rows_read,
            self.read_elapsed_ms as f64 / 1000.0
        );
        if let Some(period) = &self.period {
            info!("The period read was [{}, {}]", period.first, period.last);
        }
        if let Some(gains) = &self.period_gains {
            gains.log();
        }
        info!("Done in {:.2} seconds.", self.total_elapsed_ms as f64 / 1000.0);
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Run statistics.
    pub summary: RunSummary,
    /// Frozen sparse aggregates.
    pub aggregates: DailyAggregates,
    /// Day order used by the reports.
    pub days: DayIndex,
    /// First price per instrument.
    pub first_prices: FirstPrices,
}

impl RunOutcome {
    /// Valid rows aggregated.
    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.summary.rows_read
    }

    /// Gain per instrument on the last day.
    #[must_use]
    pub const fn period_gains(&self) -> Option<&PeriodGains> {
        self.summary.period_gains.as_ref()
    }
}
