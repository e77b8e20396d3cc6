//! Synthetic trade data for load testing and tests.
//!
//! Rows follow the input grammar with non-padded days
//! (`2023-4-9,17,42.13,1532`) and are scattered uniformly across
//! `D0.csv..D{n-1}.csv`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::ingest::InstrumentId;

/// Default number of partition files.
pub const DEFAULT_FILE_COUNT: usize = 10;

/// Maximum relative move of a row price or volume from its base.
const MAX_DRIFT: f64 = 0.08;

/// Partition file names `D0.csv..D{count-1}.csv`.
#[must_use]
pub fn partition_file_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("D{i}.csv")).collect()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Generates plausible trade rows.
///
/// Each instrument gets a base price in `[2, 100)` and a base volume in
/// `[10_000, 50_000]` on first use; rows drift from those bases.
#[derive(Debug, Clone)]
pub struct TradeGenerator {
    instrument_count: u32,
    base_prices: HashMap<InstrumentId, f64>,
    base_volumes: HashMap<InstrumentId, f64>,
}

impl TradeGenerator {
    /// Generator over instruments `1..=instrument_count`.
    #[must_use]
    pub fn new(instrument_count: u32) -> Self {
        Self {
            instrument_count: instrument_count.max(1),
            base_prices: HashMap::new(),
            base_volumes: HashMap::new(),
        }
    }

    /// One raw input row.
    pub fn row<R: Rng>(&mut self, rng: &mut R) -> String {
        let day = Self::day(rng);
        let id = InstrumentId::from(rng.random_range(1..=self.instrument_count));
        let price = self.price(id, rng);
        let volume = self.volume(id, rng);
        format!("{day},{id},{price:.2},{volume}")
    }

    fn day<R: Rng>(rng: &mut R) -> String {
        let year = rng.random_range(2023..=2024);
        let month = rng.random_range(1..=12);
        let day = rng.random_range(1..=days_in_month(year, month));
        format!("{year}-{month}-{day}")
    }

    fn price<R: Rng>(&mut self, id: InstrumentId, rng: &mut R) -> f64 {
        let base = *self
            .base_prices
            .entry(id)
            .or_insert_with(|| rng.random_range(2.0..100.0));
        let sign: f64 = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        sign.mul_add(rng.random_range(0.0..MAX_DRIFT) * base, base)
    }

    fn volume<R: Rng>(&mut self, id: InstrumentId, rng: &mut R) -> i64 {
        let base = *self
            .base_volumes
            .entry(id)
            .or_insert_with(|| f64::from(rng.random_range(10_000..=50_000_u32)));
        (base * rng.random_range(0.0..MAX_DRIFT)) as i64
    }
}

/// Files written by [`write_partitioned`].
#[derive(Debug, Clone, Default)]
pub struct GeneratedFiles {
    /// Partition files, `D0.csv` first.
    pub paths: Vec<PathBuf>,
    /// Rows written.
    pub rows: u64,
    /// Bytes written, excluding newlines.
    pub bytes: u64,
}

/// Write `rows` generated rows into `file_count` partition files in `dir`.
///
/// Every file is created, even if it receives no rows.
pub fn write_partitioned<R: Rng>(
    dir: &Path,
    file_count: usize,
    rows: u64,
    instrument_count: u32,
    rng: &mut R,
) -> io::Result<GeneratedFiles> {
    let file_count = file_count.max(1);
    let paths: Vec<PathBuf> = partition_file_names(file_count)
        .into_iter()
        .map(|name| dir.join(name))
        .collect();
    let mut writers = paths
        .iter()
        .map(|path| File::create(path).map(BufWriter::new))
        .collect::<io::Result<Vec<_>>>()?;

    let mut generator = TradeGenerator::new(instrument_count);
    let mut bytes = 0;
    for _ in 0..rows {
        let row = generator.row(rng);
        bytes += row.len() as u64;
        let target = rng.random_range(0..file_count);
        writeln!(writers[target], "{row}")?;
    }
    for writer in &mut writers {
        writer.flush()?;
    }

    Ok(GeneratedFiles { paths, rows, bytes })
}
