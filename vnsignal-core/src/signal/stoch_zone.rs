//! Stochastic zone rule.
//!
//! Buy when slow %K climbs out of the oversold zone with %K above %D; Sell
//! when it drops out of the overbought zone with %K below %D. Crossing the
//! boundary needs the previous bar on the far side.

use crate::domain::IndicatorSnapshot;

use super::{Signal, SignalRule};

#[derive(Debug, Clone, Copy)]
pub struct StochasticZone {
    oversold: f64,
    overbought: f64,
}

impl StochasticZone {
    /// Zones must satisfy `0 <= oversold < overbought <= 100`; anything else
    /// is a construction error, not a runtime condition.
    pub fn new(oversold: f64, overbought: f64) -> Self {
        assert!(
            (0.0..100.0).contains(&oversold),
            "oversold must be in [0, 100)"
        );
        assert!(
            overbought > oversold && overbought <= 100.0,
            "overbought must be in (oversold, 100]"
        );
        Self {
            oversold,
            overbought,
        }
    }

    pub fn default_zones() -> Self {
        Self::new(20.0, 80.0)
    }
}

impl SignalRule for StochasticZone {
    fn name(&self) -> &str {
        "stochastic_zone"
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
        if !prev.has_stoch() || !curr.has_stoch() {
            return Signal::Hold;
        }

        // Leaving the oversold zone from below, with momentum agreement.
        if prev.stoch_k < self.oversold
            && curr.stoch_k >= self.oversold
            && curr.stoch_k > curr.stoch_d
        {
            return Signal::Buy;
        }

        // Leaving the overbought zone from above.
        if prev.stoch_k > self.overbought
            && curr.stoch_k <= self.overbought
            && curr.stoch_k < curr.stoch_d
        {
            return Signal::Sell;
        }

        Signal::Hold
    }
}
