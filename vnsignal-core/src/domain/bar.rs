//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for one trading session.
///
/// A replay input is a strictly date-ordered `Vec<Bar>`, one bar per session,
/// no duplicates. Bars are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Basic OHLC sanity check: prices positive, high/low bracket open and close.
    pub fn is_sane(&self) -> bool {
        self.open > 0.0
            && self.close > 0.0
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// True if any price field is non-positive or NaN.
    ///
    /// The replay loop rejects such bars up front; a NaN compares false
    /// against everything, so the single comparison covers both cases.
    pub fn has_bad_price(&self) -> bool {
        !(self.open > 0.0 && self.high > 0.0 && self.low > 0.0 && self.close > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 91_000.0,
            high: 92_500.0,
            low: 90_400.0,
            close: 91_800.0,
            volume: 1_200_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 90_000.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bad_price_on_zero_close() {
        let mut bar = sample_bar();
        bar.close = 0.0;
        assert!(bar.has_bad_price());
    }

    #[test]
    fn bad_price_on_nan() {
        let mut bar = sample_bar();
        bar.low = f64::NAN;
        assert!(bar.has_bad_price());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
