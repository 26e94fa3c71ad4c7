//! Per-bar indicator values, aligned to the bar series.

use serde::{Deserialize, Serialize};

/// Indicator values for one bar.
///
/// Every field is NaN while its underlying window is still warming up. Rules
/// must treat NaN as "undefined" and hold; the replay loop never filters
/// snapshots on their behalf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ma: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

impl IndicatorSnapshot {
    /// Snapshot with every field undefined (warm-up state).
    pub fn undefined() -> Self {
        Self {
            ma: f64::NAN,
            stoch_k: f64::NAN,
            stoch_d: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
        }
    }

    /// True when both MACD lines are defined.
    pub fn has_macd(&self) -> bool {
        !self.macd.is_nan() && !self.macd_signal.is_nan()
    }

    /// True when both stochastic lines are defined.
    pub fn has_stoch(&self) -> bool {
        !self.stoch_k.is_nan() && !self.stoch_d.is_nan()
    }

    /// True when all five fields are defined.
    pub fn is_complete(&self) -> bool {
        !self.ma.is_nan() && self.has_stoch() && self.has_macd()
    }
}

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        Self::undefined()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_is_incomplete() {
        let snap = IndicatorSnapshot::undefined();
        assert!(!snap.is_complete());
        assert!(!snap.has_macd());
        assert!(!snap.has_stoch());
    }

    #[test]
    fn all_fields_defined_is_complete() {
        let snap = IndicatorSnapshot {
            ma: 10.0,
            stoch_k: 55.0,
            stoch_d: 50.0,
            macd: 0.2,
            macd_signal: 0.1,
        };
        assert!(snap.is_complete());
    }

    #[test]
    fn partial_macd_is_not_has_macd() {
        let snap = IndicatorSnapshot {
            macd: 0.2,
            ..IndicatorSnapshot::undefined()
        };
        assert!(!snap.has_macd());
        assert!(!snap.is_complete());
    }
}
