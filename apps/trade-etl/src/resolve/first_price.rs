//! First observed price per instrument.

use rayon::prelude::*;
use serde::Serialize;

use super::day_index::DayIndex;
use crate::aggregate::DailyAggregates;
use crate::ingest::InstrumentId;

/// Average price on the earliest day each instrument traded.
#[must_use]
pub fn resolve_first_price(
    id: InstrumentId,
    days: &DayIndex,
    aggregates: &DailyAggregates,
) -> Option<f64> {
    days.iter().find_map(|day| aggregates.price(day, id))
}

/// First prices for instruments `1..=instrument_count`, slot `id - 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FirstPrices {
    prices: Vec<Option<f64>>,
}

impl FirstPrices {
    /// Resolve every instrument in parallel on the current rayon pool.
    ///
    /// Each instrument fills its own slot, so no synchronization is needed.
    #[must_use]
    pub fn resolve(instrument_count: u32, days: &DayIndex, aggregates: &DailyAggregates) -> Self {
        let prices = (1..=InstrumentId::from(instrument_count))
            .into_par_iter()
            .map(|id| resolve_first_price(id, days, aggregates))
            .collect();
        Self { prices }
    }

    /// First price for `id`, `None` if it never traded or is outside the universe.
    #[must_use]
    pub fn get(&self, id: InstrumentId) -> Option<f64> {
        let slot = usize::try_from(id.checked_sub(1)?).ok()?;
        self.prices.get(slot).copied().flatten()
    }

    /// Number of instruments covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether no instrument is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Instruments that traded at least once.
    #[must_use]
    pub fn traded_count(&self) -> usize {
        self.prices.iter().filter(|p| p.is_some()).count()
    }
}
