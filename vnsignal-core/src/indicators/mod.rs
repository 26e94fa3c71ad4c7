//! Indicator series and per-bar snapshot assembly.
//!
//! Each series function returns a `Vec<f64>` aligned to its input, NaN for
//! every position where the window is still incomplete. `compute_snapshots`
//! bundles the full set into one `IndicatorSnapshot` per bar; the engine and
//! the rules only ever see snapshots.

pub mod ema;
pub mod macd;
pub mod sma;
pub mod stochastic;

pub use ema::ema_series;
pub use macd::macd_series;
pub use sma::sma_series;
pub use stochastic::stochastic_series;

use crate::domain::{Bar, IndicatorSnapshot};
use serde::{Deserialize, Serialize};

/// Window lengths for the full indicator set.
///
/// Defaults are the parameterization the Vietnamese-market rules were tuned
/// with: MA(10), STOCH(14, 5, 5), MACD(8, 17, 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub ma_period: usize,
    pub k_period: usize,
    pub smooth_k: usize,
    pub d_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_period: 10,
            k_period: 14,
            smooth_k: 5,
            d_period: 5,
            macd_fast: 8,
            macd_slow: 17,
            macd_signal: 9,
        }
    }
}

impl IndicatorParams {
    /// Index of the first bar at which every snapshot field can be defined.
    pub fn warmup_bars(&self) -> usize {
        let ma = self.ma_period - 1;
        let stoch = (self.k_period - 1) + (self.smooth_k - 1) + (self.d_period - 1);
        let macd = (self.macd_slow - 1) + (self.macd_signal - 1);
        ma.max(stoch).max(macd)
    }
}

/// Compute one `IndicatorSnapshot` per bar.
///
/// Output length always equals `bars.len()`.
pub fn compute_snapshots(bars: &[Bar], params: &IndicatorParams) -> Vec<IndicatorSnapshot> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let ma = sma_series(&closes, params.ma_period);
    let (stoch_k, stoch_d) =
        stochastic_series(bars, params.k_period, params.smooth_k, params.d_period);
    let (macd, macd_signal) = macd_series(
        &closes,
        params.macd_fast,
        params.macd_slow,
        params.macd_signal,
    );

    (0..bars.len())
        .map(|i| IndicatorSnapshot {
            ma: ma[i],
            stoch_k: stoch_k[i],
            stoch_d: stoch_d[i],
            macd: macd[i],
            macd_signal: macd_signal[i],
        })
        .collect()
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev close (or close for the first bar),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = (open.min(close) - 1.0).max(0.1);
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Create bars with explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_align_with_bars() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.4).sin()).collect();
        let bars = make_bars(&closes);
        let snaps = compute_snapshots(&bars, &IndicatorParams::default());
        assert_eq!(snaps.len(), bars.len());
    }

    #[test]
    fn default_warmup_matches_first_complete_snapshot() {
        let params = IndicatorParams::default();
        // MA 9, STOCH 13+4+4 = 21, MACD 16+8 = 24.
        assert_eq!(params.warmup_bars(), 24);

        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.4).sin()).collect();
        let bars = make_bars(&closes);
        let snaps = compute_snapshots(&bars, &params);

        assert!(!snaps[23].is_complete());
        assert!(snaps[24].is_complete());
        for snap in &snaps[..21] {
            assert!(!snap.is_complete());
        }
    }

    #[test]
    fn short_series_is_all_incomplete() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let snaps = compute_snapshots(&bars, &IndicatorParams::default());
        assert!(snaps.iter().all(|s| !s.is_complete()));
    }
}
