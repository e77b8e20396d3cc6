//! Sorted index of trading days.

use serde::Serialize;

use crate::aggregate::DailyAggregates;
use crate::ingest::TradeDay;

/// Every day with trade activity, ascending. Defines the row order of all
/// reports. Built once from frozen aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DayIndex {
    days: Vec<TradeDay>,
}

impl DayIndex {
    /// Collect, sort and deduplicate the days present in `aggregates`.
    #[must_use]
    pub fn build(aggregates: &DailyAggregates) -> Self {
        let mut days: Vec<TradeDay> = aggregates.days().cloned().collect();
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// Days in ascending order.
    #[must_use]
    pub fn days(&self) -> &[TradeDay] {
        &self.days
    }

    /// Iterate days in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, TradeDay> {
        self.days.iter()
    }

    /// Number of days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no day was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Earliest observed day.
    #[must_use]
    pub fn first(&self) -> Option<&TradeDay> {
        self.days.first()
    }

    /// Latest observed day.
    #[must_use]
    pub fn last(&self) -> Option<&TradeDay> {
        self.days.last()
    }

    /// `(first, last)` if any day was observed.
    #[must_use]
    pub fn period(&self) -> Option<(&TradeDay, &TradeDay)> {
        self.first().zip(self.last())
    }
}

impl<'a> IntoIterator for &'a DayIndex {
    type Item = &'a TradeDay;
    type IntoIter = std::slice::Iter<'a, TradeDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{TradeRecord, parse_day};

    #[test]
    fn test_days_sorted_ascending() {
        let mut agg = DailyAggregates::new();
        for d in ["2001-1-1", "1999-4-01", "2000-12-31", "1999-4-1"] {
            agg.apply(&TradeRecord::new(parse_day(d).unwrap(), 1, 1.0, 1));
        }

        let index = DayIndex::build(&agg);
        let days: Vec<&str> = index.iter().map(TradeDay::as_str).collect();
        assert_eq!(days, vec!["1999-04-01", "2000-12-31", "2001-01-01"]);
        assert_eq!(
            index.period().map(|(a, b)| (a.as_str(), b.as_str())),
            Some(("1999-04-01", "2001-01-01"))
        );
    }

    #[test]
    fn test_empty_index() {
        let index = DayIndex::build(&DailyAggregates::new());
        assert!(index.is_empty());
        assert_eq!(index.period(), None);
    }
}
