//! Incremental mean.

use serde::{Deserialize, Serialize};

/// Count and sum of observations, giving an order-independent mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningAverage {
    count: u64,
    sum: f64,
}

impl RunningAverage {
    /// An average with no observations.
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0, sum: 0.0 }
    }

    /// Fold one observation in.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Observations folded so far.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Sum of observations.
    #[must_use]
    pub const fn sum(&self) -> f64 {
        self.sum
    }

    /// `sum / count`, or `None` with no observations.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

impl FromIterator<f64> for RunningAverage {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut avg = Self::new();
        for value in iter {
            avg.add(value);
        }
        avg
    }
}
