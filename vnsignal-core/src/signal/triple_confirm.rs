//! Threshold-conjunction rule: MA, stochastic and MACD must agree.
//!
//! Buy when price is above the MA, %K above %D, and MACD above its signal
//! line, all strictly. Sell when all three comparisons flip to strictly
//! below. Anything else, including any tie or undefined component, holds.

use crate::domain::IndicatorSnapshot;

use super::{Signal, SignalRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct TripleConfirm;

impl SignalRule for TripleConfirm {
    fn name(&self) -> &str {
        "triple_confirm"
    }

    fn evaluate(
        &self,
        _prev: Option<&IndicatorSnapshot>,
        curr: &IndicatorSnapshot,
        price: f64,
    ) -> Signal {
        if price.is_nan() || !curr.is_complete() {
            return Signal::Hold;
        }

        if price > curr.ma && curr.stoch_k > curr.stoch_d && curr.macd > curr.macd_signal {
            return Signal::Buy;
        }

        if price < curr.ma && curr.stoch_k < curr.stoch_d && curr.macd < curr.macd_signal {
            return Signal::Sell;
        }

        Signal::Hold
    }
}
