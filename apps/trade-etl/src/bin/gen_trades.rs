//! Synthetic trade generator.
//!
//! Writes `ROWS` random trade rows across `D0.csv..D9.csv`.
//!
//! ```bash
//! cargo run --bin gen-trades -- 100000 --dir data --seed 42
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use trade_etl::config::{DEFAULT_INSTRUMENT_COUNT, LoggingConfig};
use trade_etl::synth::{DEFAULT_FILE_COUNT, write_partitioned};
use trade_etl::telemetry::init_tracing;

/// Generate some rows of trade data.
#[derive(Debug, Parser)]
#[command(name = "gen-trades", version, about)]
struct Cli {
    /// Number of rows to generate.
    rows: u64,

    /// Output directory.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Number of partition files.
    #[arg(long, default_value_t = DEFAULT_FILE_COUNT)]
    files: usize,

    /// Number of instruments.
    #[arg(long, default_value_t = DEFAULT_INSTRUMENT_COUNT)]
    instruments: u32,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&LoggingConfig::default());

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    std::fs::create_dir_all(&cli.dir)
        .with_context(|| format!("creating {}", cli.dir.display()))?;
    tracing::info!("Writing {} rows to {} files ...", cli.rows, cli.files);

    let generated = write_partitioned(&cli.dir, cli.files, cli.rows, cli.instruments, &mut rng)
        .context("writing partition files")?;

    tracing::info!(
        files = generated.paths.len(),
        "Done. (Wrote {} bytes)",
        generated.bytes
    );
    Ok(())
}
