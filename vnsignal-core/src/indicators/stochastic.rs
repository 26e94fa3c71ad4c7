//! Stochastic oscillator (slow %K / %D).
//!
//! Raw %K = 100 * (close - lowest_low) / (highest_high - lowest_low) over a
//! `k_period` window of highs/lows. Slow %K smooths the raw line with an SMA
//! of length `smooth_k`; %D is an SMA of slow %K over `d_period`.

use super::sma::sma_series;
use crate::domain::Bar;

/// Compute (slow %K, %D) aligned to the bar series.
///
/// A window whose highest high equals its lowest low has no defined %K for
/// that bar; the NaN then rides through the smoothing stages like any other
/// warm-up gap.
pub fn stochastic_series(
    bars: &[Bar],
    k_period: usize,
    smooth_k: usize,
    d_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    assert!(k_period >= 1, "stochastic k_period must be >= 1");
    assert!(smooth_k >= 1, "stochastic smooth_k must be >= 1");
    assert!(d_period >= 1, "stochastic d_period must be >= 1");

    let n = bars.len();
    let mut raw_k = vec![f64::NAN; n];

    for i in (k_period.saturating_sub(1))..n {
        let start = i + 1 - k_period;
        let window = &bars[start..=i];

        let mut highest = f64::NEG_INFINITY;
        let mut lowest = f64::INFINITY;
        let mut has_nan = false;
        for bar in window {
            if bar.high.is_nan() || bar.low.is_nan() {
                has_nan = true;
                break;
            }
            if bar.high > highest {
                highest = bar.high;
            }
            if bar.low < lowest {
                lowest = bar.low;
            }
        }

        if has_nan || bars[i].close.is_nan() {
            continue;
        }

        let range = highest - lowest;
        if range > 0.0 {
            raw_k[i] = 100.0 * (bars[i].close - lowest) / range;
        }
        // range == 0: flat window, %K stays NaN for this bar
    }

    let slow_k = sma_series(&raw_k, smooth_k);
    let d = sma_series(&slow_k, d_period);
    (slow_k, d)
}
