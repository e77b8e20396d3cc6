//! Trade ETL Binary
//!
//! Runs one batch pass over partitioned trade files and writes
//! `PRICE.csv`, `VOLUME.csv` and `GAINS.csv`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin trade-etl -- D0.csv D1.csv D2.csv
//! cargo run --bin trade-etl -- --config etl.yaml --output-dir reports data/
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: the configured level, `info`)

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use trade_etl::config::{EtlConfig, load_config};
use trade_etl::pipeline::EtlPipeline;
use trade_etl::telemetry::init_tracing;

/// Aggregate partitioned trade records into dense daily reports.
#[derive(Debug, Parser)]
#[command(name = "trade-etl", version, about)]
struct Cli {
    /// Input CSV files, or directories of CSV files.
    #[arg(value_name = "CSV_FILE")]
    files: Vec<PathBuf>,

    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the reports.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Accepted records per aggregation batch.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Number of instruments covered by the reports.
    #[arg(long)]
    instruments: Option<u32>,

    /// Upper bound on workers per phase (0 = available parallelism).
    #[arg(long)]
    max_workers: Option<usize>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(EtlConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EtlConfig::default(),
        };

        if !self.files.is_empty() {
            config.inputs = self.files;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(instruments) = self.instruments {
            config.instrument_count = instruments;
        }
        if let Some(max_workers) = self.max_workers {
            config.workers.max_threads = max_workers;
        }
        config.validate()?;

        Ok((config, self.json))
    }
}

fn main() -> anyhow::Result<()> {
    let (config, json) = Cli::parse().into_config()?;
    init_tracing(&config.logging);

    let pipeline = EtlPipeline::new(config);
    let outcome = match pipeline.run() {
        Ok(outcome) => outcome,
        Err(e) if e.is_fatal_input() => {
            tracing::error!("Missing input files.");
            return Err(e.into());
        }
        Err(e) => return Err(e).context("ETL run failed"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
    }
    Ok(())
}
