//! Dense report generation from the sparse aggregates.
//!
//! Two independent writer groups read the same frozen inputs:
//!
//! - **Price + gains**: forward-filled price per instrument and the gain
//!   relative to the first price, written in one pass. The final gains row
//!   becomes the run's [`PeriodGains`].
//! - **Volume**: summed volume per day, zero on days without trades.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::tracker::{PriceTracker, gain};
use super::{GAINS_FILE, PRICE_FILE, VOLUME_FILE};
use crate::aggregate::DailyAggregates;
use crate::error::EtlError;
use crate::ingest::InstrumentId;
use crate::resolve::{DayIndex, FirstPrices};

/// Column name for instrument `id`, zero-padded to three digits.
#[must_use]
pub fn column_name(id: InstrumentId) -> String {
    format!("stk_{id:03}")
}

/// Header row shared by every report.
#[must_use]
pub fn header_row(instrument_count: u32) -> Vec<String> {
    std::iter::once("date".to_string())
        .chain((1..=InstrumentId::from(instrument_count)).map(column_name))
        .collect()
}

/// Format a price or gain cell to two decimal places.
#[must_use]
pub fn format_cell(value: f64) -> String {
    format!("{value:.2}")
}

/// Gain per instrument on the last day of the period, rounded to two
/// decimals as written to `GAINS.csv`. Slot `id - 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PeriodGains {
    gains: Vec<f64>,
}

impl PeriodGains {
    fn from_cells(cells: &[String]) -> Self {
        let gains = cells
            .iter()
            .map(|cell| cell.parse::<f64>().unwrap_or(0.0))
            .collect();
        Self { gains }
    }

    /// Gain for `id`, `None` outside the instrument universe.
    #[must_use]
    pub fn get(&self, id: InstrumentId) -> Option<f64> {
        let slot = usize::try_from(id.checked_sub(1)?).ok()?;
        self.gains.get(slot).copied()
    }

    /// `(id, gain)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (InstrumentId, f64)> + '_ {
        (1..).zip(self.gains.iter().copied())
    }

    /// Number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    /// Whether there are no instruments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Log every instrument's gain at debug level.
    pub fn log(&self) {
        for (id, gain) in self.iter() {
            debug!("Gain for {} was {:.2}", column_name(id), gain);
        }
    }
}

/// Read-only inputs shared by both writer groups.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    /// Row order.
    pub days: &'a DayIndex,
    /// Sparse aggregates.
    pub aggregates: &'a DailyAggregates,
    /// Seed prices for backfill and gains.
    pub first_prices: &'a FirstPrices,
    /// Instruments `1..=instrument_count` become columns.
    pub instrument_count: u32,
}

impl ReportInputs<'_> {
    fn instruments(&self) -> std::ops::RangeInclusive<InstrumentId> {
        1..=InstrumentId::from(self.instrument_count)
    }
}

/// Failure in the combined price and gains pass, tagged with the report
/// that failed.
#[derive(Debug, Error)]
pub enum PriceGainsError {
    /// Writing the price report failed.
    #[error("price report: {0}")]
    Price(#[source] csv::Error),

    /// Writing the gains report failed.
    #[error("gains report: {0}")]
    Gains(#[source] csv::Error),
}

/// Write the PRICE and GAINS reports in one pass over the day index.
///
/// Returns the last gains row, or `None` if the index is empty.
pub fn write_price_and_gains<P: Write, G: Write>(
    inputs: &ReportInputs<'_>,
    price_out: P,
    gains_out: G,
) -> Result<Option<PeriodGains>, PriceGainsError> {
    let mut price_csv = csv::WriterBuilder::new().from_writer(price_out);
    let mut gains_csv = csv::WriterBuilder::new().from_writer(gains_out);

    let header = header_row(inputs.instrument_count);
    price_csv
        .write_record(&header)
        .map_err(PriceGainsError::Price)?;
    gains_csv
        .write_record(&header)
        .map_err(PriceGainsError::Gains)?;

    let mut trackers: Vec<PriceTracker> = inputs
        .instruments()
        .map(|id| PriceTracker::seeded(inputs.first_prices.get(id)))
        .collect();

    let mut last_gains: Option<Vec<String>> = None;
    for day in inputs.days {
        let mut price_row = Vec::with_capacity(header.len());
        let mut gains_row = Vec::with_capacity(header.len());
        price_row.push(day.to_string());
        gains_row.push(day.to_string());

        for (tracker, id) in trackers.iter_mut().zip(inputs.instruments()) {
            let price = tracker.advance(inputs.aggregates.price(day, id));
            price_row.push(format_cell(price));
            gains_row.push(format_cell(gain(price, inputs.first_prices.get(id))));
        }

        price_csv
            .write_record(&price_row)
            .map_err(PriceGainsError::Price)?;
        gains_csv
            .write_record(&gains_row)
            .map_err(PriceGainsError::Gains)?;
        last_gains = Some(gains_row);
    }

    price_csv
        .flush()
        .map_err(|e| PriceGainsError::Price(e.into()))?;
    gains_csv
        .flush()
        .map_err(|e| PriceGainsError::Gains(e.into()))?;

    Ok(last_gains.map(|row| PeriodGains::from_cells(&row[1..])))
}

/// Write the VOLUME report. Days without trades are zero, no forward fill.
pub fn write_volume<W: Write>(inputs: &ReportInputs<'_>, out: W) -> Result<(), csv::Error> {
    let mut volume_csv = csv::WriterBuilder::new().from_writer(out);
    volume_csv.write_record(header_row(inputs.instrument_count))?;

    for day in inputs.days {
        let row = std::iter::once(day.to_string()).chain(
            inputs
                .instruments()
                .map(|id| inputs.aggregates.volume(day, id).unwrap_or(0).to_string()),
        );
        volume_csv.write_record(row)?;
    }

    volume_csv.flush()?;
    Ok(())
}

/// Writes the three report files into an output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer targeting `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory reports are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist.
    pub fn prepare(&self) -> Result<(), EtlError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| EtlError::io(&self.output_dir, e))
    }

    /// Path of a report file.
    #[must_use]
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Write `PRICE.csv` and `GAINS.csv`.
    pub fn write_price_and_gains(
        &self,
        inputs: &ReportInputs<'_>,
    ) -> Result<Option<PeriodGains>, EtlError> {
        let price_path = self.path_of(PRICE_FILE);
        let gains_path = self.path_of(GAINS_FILE);
        info!("Writing {} ...", PRICE_FILE);
        info!("Writing {} ...", GAINS_FILE);

        let price_out = create(&price_path)?;
        let gains_out = create(&gains_path)?;
        let gains = write_price_and_gains(inputs, price_out, gains_out)
            .map_err(|e| self.price_gains_error(e))?;

        debug!("Done writing {}", PRICE_FILE);
        debug!("Done writing {}", GAINS_FILE);
        Ok(gains)
    }

    fn price_gains_error(&self, err: PriceGainsError) -> EtlError {
        match err {
            PriceGainsError::Price(source) => EtlError::report(self.path_of(PRICE_FILE), source),
            PriceGainsError::Gains(source) => EtlError::report(self.path_of(GAINS_FILE), source),
        }
    }

    /// Write `VOLUME.csv`.
    pub fn write_volume(&self, inputs: &ReportInputs<'_>) -> Result<(), EtlError> {
        let path = self.path_of(VOLUME_FILE);
        info!("Writing {} ...", VOLUME_FILE);

        let out = create(&path)?;
        write_volume(inputs, out).map_err(|e| EtlError::report(&path, e))?;

        debug!("Done writing {}", VOLUME_FILE);
        Ok(())
    }
}

fn create(path: &Path) -> Result<std::io::BufWriter<fs::File>, EtlError> {
    fs::File::create(path)
        .map(std::io::BufWriter::new)
        .map_err(|e| EtlError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{TradeRecord, parse_day};

    struct Fixture {
        aggregates: DailyAggregates,
        days: DayIndex,
        first_prices: FirstPrices,
    }

    impl Fixture {
        fn new(rows: &[(&str, InstrumentId, f64, i64)], instrument_count: u32) -> Self {
            let mut aggregates = DailyAggregates::new();
            for (d, id, price, volume) in rows {
                aggregates.apply(&TradeRecord::new(parse_day(d).unwrap(), *id, *price, *volume));
            }
            let days = DayIndex::build(&aggregates);
            let first_prices = FirstPrices::resolve(instrument_count, &days, &aggregates);
            Self {
                aggregates,
                days,
                first_prices,
            }
        }

        fn inputs(&self, instrument_count: u32) -> ReportInputs<'_> {
            ReportInputs {
                days: &self.days,
                aggregates: &self.aggregates,
                first_prices: &self.first_prices,
                instrument_count,
            }
        }
    }

    fn render_price_and_gains(inputs: &ReportInputs<'_>) -> (String, String, Option<PeriodGains>) {
        let mut price = Vec::new();
        let mut gains = Vec::new();
        let period = write_price_and_gains(inputs, &mut price, &mut gains).unwrap();
        (
            String::from_utf8(price).unwrap(),
            String::from_utf8(gains).unwrap(),
            period,
        )
    }

    /// Accepts nothing.
    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_gains_failure_names_gains_report() {
        let fixture = Fixture::new(&[("2024-01-01", 1, 10.0, 5)], 1);
        let mut price = Vec::new();
        let result = write_price_and_gains(&fixture.inputs(1), &mut price, BrokenSink);

        assert!(matches!(result, Err(PriceGainsError::Gains(_))));
        assert_eq!(String::from_utf8(price).unwrap(), "date,stk_001\n2024-01-01,10.00\n");
    }

    #[test]
    fn test_price_failure_names_price_report() {
        let fixture = Fixture::new(&[("2024-01-01", 1, 10.0, 5)], 1);
        let result = write_price_and_gains(&fixture.inputs(1), BrokenSink, Vec::new());
        assert!(matches!(result, Err(PriceGainsError::Price(_))));
    }

    #[test]
    fn test_error_carries_failing_report_path() {
        let writer = ReportWriter::new("out");
        let gains = writer.price_gains_error(PriceGainsError::Gains(
            std::io::Error::other("disk full").into(),
        ));
        let price = writer.price_gains_error(PriceGainsError::Price(
            std::io::Error::other("disk full").into(),
        ));

        match (gains, price) {
            (EtlError::Report { path: gains, .. }, EtlError::Report { path: price, .. }) => {
                assert_eq!(gains, Path::new("out").join(GAINS_FILE));
                assert_eq!(price, Path::new("out").join(PRICE_FILE));
            }
            other => panic!("expected report errors, got {other:?}"),
        }
    }

    #[test]
    fn test_header_row() {
        assert_eq!(header_row(3), vec!["date", "stk_001", "stk_002", "stk_003"]);
        assert_eq!(column_name(111), "stk_111");
    }

    #[test]
    fn test_forward_fill_and_gains() {
        let fixture = Fixture::new(
            &[
                ("2024-01-01", 1, 10.0, 5),
                ("2024-01-02", 2, 4.0, 1),
                ("2024-01-03", 1, 12.0, 7),
            ],
            3,
        );
        let (price, gains, period) = render_price_and_gains(&fixture.inputs(3));

        assert_eq!(
            price,
            "date,stk_001,stk_002,stk_003\n\
             2024-01-01,10.00,4.00,0.00\n\
             2024-01-02,10.00,4.00,0.00\n\
             2024-01-03,12.00,4.00,0.00\n"
        );
        assert_eq!(
            gains,
            "date,stk_001,stk_002,stk_003\n\
             2024-01-01,0.00,0.00,0.00\n\
             2024-01-02,0.00,0.00,0.00\n\
             2024-01-03,0.20,0.00,0.00\n"
        );

        let period = period.unwrap();
        assert_eq!(period.len(), 3);
        assert_eq!(period.get(1), Some(0.2));
        assert_eq!(period.get(2), Some(0.0));
        assert_eq!(period.get(3), Some(0.0));
    }

    #[test]
    fn test_volume_is_not_forward_filled() {
        let fixture = Fixture::new(
            &[
                ("2024-01-01", 1, 10.0, 5),
                ("2024-01-01", 1, 11.0, 6),
                ("2024-01-02", 2, 4.0, 1),
            ],
            2,
        );
        let mut out = Vec::new();
        write_volume(&fixture.inputs(2), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,stk_001,stk_002\n2024-01-01,11,0\n2024-01-02,0,1\n"
        );
    }

    #[test]
    fn test_empty_index_writes_header_only() {
        let fixture = Fixture::new(&[], 2);
        let (price, gains, period) = render_price_and_gains(&fixture.inputs(2));

        assert_eq!(price, "date,stk_001,stk_002\n");
        assert_eq!(gains, "date,stk_001,stk_002\n");
        assert!(period.is_none());
    }

    #[test]
    fn test_ids_outside_universe_have_no_column() {
        let fixture = Fixture::new(&[("2024-01-01", 999, 1.0, 1)], 1);
        let mut out = Vec::new();
        write_volume(&fixture.inputs(1), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "date,stk_001\n2024-01-01,0\n");
    }
}
