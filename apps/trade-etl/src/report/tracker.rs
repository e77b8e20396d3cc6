//! Per-instrument forward-fill state machine.

/// Last known price of one instrument while walking the day index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceTracker {
    /// No trade seen in the period. Emits a price of zero.
    NeverTraded,
    /// Last observed (or seeded) average price.
    Known(f64),
}

impl PriceTracker {
    /// Seed from the instrument's first price.
    #[must_use]
    pub const fn seeded(first_price: Option<f64>) -> Self {
        match first_price {
            Some(price) => Self::Known(price),
            None => Self::NeverTraded,
        }
    }

    /// Advance one day: take the observed price, or carry the last one.
    pub fn advance(&mut self, observed: Option<f64>) -> f64 {
        if let Some(price) = observed {
            *self = Self::Known(price);
        }
        self.price()
    }

    /// Current price, zero if never traded.
    #[must_use]
    pub const fn price(&self) -> f64 {
        match self {
            Self::NeverTraded => 0.0,
            Self::Known(price) => *price,
        }
    }
}

/// Gain of `price` relative to `first_price`.
///
/// Zero when the instrument never traded, or when its first price is zero
/// and the ratio is undefined.
#[must_use]
pub fn gain(price: f64, first_price: Option<f64>) -> f64 {
    match first_price {
        Some(first) if first != 0.0 => (price - first) / first,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_fill() {
        let mut tracker = PriceTracker::seeded(Some(5.0));
        assert_eq!(tracker.advance(Some(5.0)), 5.0);
        assert_eq!(tracker.advance(None), 5.0);
        assert_eq!(tracker.advance(Some(7.5)), 7.5);
        assert_eq!(tracker.advance(None), 7.5);
    }

    #[test]
    fn test_never_traded_is_zero() {
        let mut tracker = PriceTracker::seeded(None);
        assert_eq!(tracker.advance(None), 0.0);
        assert_eq!(tracker, PriceTracker::NeverTraded);
    }

    #[test]
    fn test_backfill_before_first_trade() {
        // Days before the first trade carry the first price.
        let mut tracker = PriceTracker::seeded(Some(6.0));
        assert_eq!(tracker.advance(None), 6.0);
    }

    #[test]
    fn test_gain() {
        assert_eq!(gain(13.0, Some(6.0)), 7.0 / 6.0);
        assert_eq!(gain(0.05, Some(0.05)), 0.0);
        assert_eq!(gain(0.0, None), 0.0);
        assert_eq!(gain(4.0, Some(0.0)), 0.0);
    }
}
