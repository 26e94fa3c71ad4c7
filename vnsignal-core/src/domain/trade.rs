//! Trade — a completed round-trip record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A closed round-trip trade: one entry fill and one exit fill.
///
/// Emitted by the replay loop only when a position fully closes, and
/// immutable afterwards. `pnl` and `pnl_pct` are fixed at close time from the
/// recorded fill prices, so they can always be recomputed from the other
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,

    /// Shares traded, always a whole multiple of the configured lot size.
    pub size: u64,

    /// Realized profit: `size * (exit_price - entry_price)`.
    pub pnl: f64,
    /// Realized return: `(exit_price / entry_price - 1) * 100`.
    pub pnl_pct: f64,

    /// Bars between entry and exit fill.
    pub bars_held: usize,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Calendar duration between the entry and exit sessions.
    pub fn duration_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade {
            entry_bar: 4,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            entry_price: 25_000.0,
            exit_bar: 9,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            exit_price: 27_500.0,
            size: 300,
            pnl: 750_000.0,
            pnl_pct: 10.0,
            bars_held: 5,
        }
    }

    #[test]
    fn pnl_matches_fill_prices() {
        let trade = sample_trade();
        let recomputed = trade.size as f64 * (trade.exit_price - trade.entry_price);
        assert_eq!(trade.pnl, recomputed);
    }

    #[test]
    fn winner_and_duration() {
        let trade = sample_trade();
        assert!(trade.is_winner());
        assert_eq!(trade.duration_days(), 7);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
