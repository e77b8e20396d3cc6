//! Three-phase ETL executor using Rayon.
//!
//! 1. **Ingest**: one task per input file. Each task streams batches and
//!    applies them to the shared [`Aggregator`], one lock per batch.
//! 2. **Resolve**: the aggregator is frozen, the [`DayIndex`] is built once,
//!    then first prices are resolved with one task per instrument.
//! 3. **Write**: the volume report and the price + gains reports are
//!    written concurrently.
//!
//! Each phase runs on its own pool sized `min(thread limit, units)`, and a
//! phase only starts once the previous one has returned.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{Level, debug, info, span};

use super::progress::IngestProgress;
use super::summary::{Period, PhaseWorkers, RunOutcome, RunSummary};
use crate::aggregate::{Aggregator, DailyAggregates};
use crate::config::EtlConfig;
use crate::error::EtlError;
use crate::ingest::{BatchReader, resolve_inputs};
use crate::report::{GAINS_FILE, PRICE_FILE, ReportInputs, ReportWriter, VOLUME_FILE};
use crate::resolve::{DayIndex, FirstPrices};

/// Number of independent report groups written in phase 3.
pub const REPORT_GROUPS: usize = 2;

/// Batch ETL pipeline. Every run starts from empty aggregation state.
#[derive(Debug, Clone)]
pub struct EtlPipeline {
    config: EtlConfig,
}

impl EtlPipeline {
    /// Create a pipeline.
    #[must_use]
    pub const fn new(config: EtlConfig) -> Self {
        Self { config }
    }

    /// Pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Run over the configured inputs.
    ///
    /// # Errors
    ///
    /// See [`EtlPipeline::run_inputs`].
    pub fn run(&self) -> Result<RunOutcome, EtlError> {
        self.run_inputs(&self.config.inputs)
    }

    /// Run one full batch pass over `paths`.
    ///
    /// # Errors
    ///
    /// Fails before any work with [`EtlError::NoInputFiles`] or
    /// [`EtlError::MissingInput`]; no report is written in that case. Any
    /// I/O error while reading or writing aborts the run.
    pub fn run_inputs(&self, paths: &[PathBuf]) -> Result<RunOutcome, EtlError> {
        let files = resolve_inputs(paths)?;
        self.run_files(&files)
    }

    /// Run over already resolved input files.
    fn run_files(&self, files: &[PathBuf]) -> Result<RunOutcome, EtlError> {
        let started_at = Utc::now();
        let start = Instant::now();

        // Phase 1: ingest
        let ingest_workers = self.config.workers.workers_for(files.len());
        info!(
            "Using {} workers to extract data from {} files ...",
            ingest_workers,
            files.len()
        );
        let (aggregates, rows_rejected) = self.ingest(files, ingest_workers)?;

        // Phase 2: index and resolve
        let days = DayIndex::build(&aggregates);
        let instrument_count = self.config.instrument_count;
        let resolve_workers = self.config.workers.workers_for(instrument_count as usize);
        let first_prices = build_pool("resolve", resolve_workers)?
            .install(|| FirstPrices::resolve(instrument_count, &days, &aggregates));
        debug!(
            workers = resolve_workers,
            traded = first_prices.traded_count(),
            "Resolved first prices"
        );
        let read_elapsed = start.elapsed();

        // Phase 3: write
        let writer = ReportWriter::new(&self.config.output_dir);
        writer.prepare()?;
        let inputs = ReportInputs {
            days: &days,
            aggregates: &aggregates,
            first_prices: &first_prices,
            instrument_count,
        };
        let write_workers = self.config.workers.workers_for(REPORT_GROUPS);
        let (volume, price_and_gains) = build_pool("write", write_workers)?.join(
            || writer.write_volume(&inputs),
            || writer.write_price_and_gains(&inputs),
        );
        volume?;
        let period_gains = price_and_gains?;

        let summary = RunSummary {
            started_at,
            files_read: files.len(),
            rows_read: aggregates.rows(),
            rows_rejected,
            workers: PhaseWorkers {
                ingest: ingest_workers,
                resolve: resolve_workers,
                write: write_workers,
            },
            read_elapsed_ms: read_elapsed.as_millis() as u64,
            total_elapsed_ms: start.elapsed().as_millis() as u64,
            days: days.len(),
            period: days.period().map(|(first, last)| Period {
                first: first.clone(),
                last: last.clone(),
            }),
            period_gains,
            reports: [PRICE_FILE, VOLUME_FILE, GAINS_FILE]
                .iter()
                .map(|name| writer.path_of(name))
                .collect(),
        };
        summary.log();

        Ok(RunOutcome {
            summary,
            aggregates,
            days,
            first_prices,
        })
    }

    /// Phase 1. Returns the frozen aggregates and the rejected-row count.
    fn ingest(
        &self,
        files: &[PathBuf],
        workers: usize,
    ) -> Result<(DailyAggregates, u64), EtlError> {
        let aggregator = Aggregator::new();
        let progress = IngestProgress::new(files.len() as u64);

        build_pool("ingest", workers)?.install(|| {
            files
                .par_iter()
                .try_for_each(|path| self.ingest_file(path, &aggregator, &progress))
        })?;

        let rejected = progress.rejected_rows();
        Ok((aggregator.into_inner(), rejected))
    }

    fn ingest_file(
        &self,
        path: &Path,
        aggregator: &Aggregator,
        progress: &IngestProgress,
    ) -> Result<(), EtlError> {
        let _span = span!(Level::DEBUG, "ingest_file", file = %path.display()).entered();
        info!("Reading {} ...", path.display());

        let mut reader = BatchReader::open(path, self.config.batch_size)?;
        for batch in &mut reader {
            let rows = aggregator.apply_batch(&batch?);
            debug!("Read {} rows ...", rows);
        }

        progress.file_completed(reader.rejected());
        let snapshot = progress.progress();
        debug!(
            rejected = reader.rejected(),
            "Done reading {} ({}/{} files, {:.0}%)",
            path.display(),
            snapshot.completed_files,
            snapshot.total_files,
            snapshot.percentage()
        );
        Ok(())
    }
}

fn build_pool(phase: &'static str, workers: usize) -> Result<ThreadPool, EtlError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("etl-{phase}-{i}"))
        .build()
        .map_err(|e| EtlError::ThreadPool {
            message: e.to_string(),
        })
}
