//! MACD crossover rule.
//!
//! Buy when the MACD line crosses above its signal line; Sell when it crosses
//! below. A cross requires the previous bar, and the post-cross inequality is
//! strict: landing exactly on the signal line is not a cross.

use crate::domain::IndicatorSnapshot;

use super::{Signal, SignalRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct MacdCross;

impl SignalRule for MacdCross {
    fn name(&self) -> &str {
        "macd_cross"
    }

    fn evaluate(
        &self,
        prev: Option<&IndicatorSnapshot>,
        curr: &IndicatorSnapshot,
        _price: f64,
    ) -> Signal {
        let prev = match prev {
            Some(p) => p,
            None => return Signal::Hold,
        };
        if !prev.has_macd() || !curr.has_macd() {
            return Signal::Hold;
        }

        // Upward cross: at or below before, strictly above now.
        if prev.macd <= prev.macd_signal && curr.macd > curr.macd_signal {
            return Signal::Buy;
        }

        // Downward cross, mirrored.
        if prev.macd >= prev.macd_signal && curr.macd < curr.macd_signal {
            return Signal::Sell;
        }

        Signal::Hold
    }
}
