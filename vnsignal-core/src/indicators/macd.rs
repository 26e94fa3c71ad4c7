//! MACD — moving average convergence/divergence.
//!
//! MACD line = EMA(fast) - EMA(slow) over closes; signal line = EMA of the
//! MACD line over `signal_period`, seeded where the MACD line becomes
//! defined.

use super::ema::ema_series;

/// Compute (MACD line, signal line) for a close-price series.
pub fn macd_series(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    assert!(fast_period >= 1, "MACD fast_period must be >= 1");
    assert!(
        slow_period > fast_period,
        "MACD slow_period must be > fast_period"
    );
    assert!(signal_period >= 1, "MACD signal_period must be >= 1");

    let fast = ema_series(closes, fast_period);
    let slow = ema_series(closes, slow_period);

    // NaN in either EMA leaves the difference NaN, which keeps the warm-up
    // prefix aligned with the slow EMA.
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&line, signal_period);
    (line, signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn rising_closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_warmup_alignment() {
        let closes = rising_closes(40);
        let (line, signal) = macd_series(&closes, 8, 17, 9);

        // Line defined from slow EMA's first value (index 16).
        assert!(line[15].is_nan());
        assert!(!line[16].is_nan());
        // Signal seeds after 9 defined line values (index 24).
        assert!(signal[23].is_nan());
        assert!(!signal[24].is_nan());
    }

    #[test]
    fn macd_positive_in_uptrend() {
        // In a steady uptrend the fast EMA sits above the slow EMA.
        let closes = rising_closes(60);
        let (line, signal) = macd_series(&closes, 8, 17, 9);
        assert!(line[59] > 0.0);
        assert!(signal[59] > 0.0);
    }

    #[test]
    fn macd_constant_series_is_zero() {
        let closes = vec![50.0; 40];
        let (line, signal) = macd_series(&closes, 8, 17, 9);
        assert_approx(line[30], 0.0, DEFAULT_EPSILON);
        assert_approx(signal[30], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_alternative_parameterization() {
        // The 12/26/9 variant must align the same way: line at 25, signal at 33.
        let closes = rising_closes(50);
        let (line, signal) = macd_series(&closes, 12, 26, 9);
        assert!(line[24].is_nan());
        assert!(!line[25].is_nan());
        assert!(signal[32].is_nan());
        assert!(!signal[33].is_nan());
    }

    #[test]
    #[should_panic(expected = "slow_period must be > fast_period")]
    fn macd_rejects_slow_leq_fast() {
        macd_series(&[1.0, 2.0], 17, 8, 9);
    }
}
