//! Validated trade record types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer identifier of a tradable instrument.
pub type InstrumentId = i64;

/// A trading day in canonical zero-padded `YYYY-MM-DD` form.
///
/// Lexicographic order of the canonical form is chronological order, so the
/// derived `Ord` is the day order used by every report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeDay(String);

impl TradeDay {
    /// Build a day from its numeric parts, zero-padding month and day.
    ///
    /// No calendar check is made: `2023-02-30` is a valid `TradeDay`.
    #[must_use]
    pub fn from_parts(year: &str, month: u32, day: u32) -> Self {
        Self(format!("{year}-{month:02}-{day:02}"))
    }

    /// The canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One validated trade. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Trading day.
    pub day: TradeDay,
    /// Instrument traded.
    pub instrument_id: InstrumentId,
    /// Trade price.
    pub price: f64,
    /// Traded volume.
    pub volume: i64,
}

impl TradeRecord {
    /// Create a new trade record.
    #[must_use]
    pub const fn new(day: TradeDay, instrument_id: InstrumentId, price: f64, volume: i64) -> Self {
        Self {
            day,
            instrument_id,
            price,
            volume,
        }
    }
}
