//! Exponential moving average.
//!
//! Recursive: EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1] with
//! alpha = 2 / (period + 1), seeded by the SMA of the first full window.

/// Compute the EMA of a value series.
///
/// A NaN warm-up prefix (e.g. a MACD line fed back in for its signal line)
/// is skipped: the seed window starts at the first defined value. A NaN
/// appearing after the seed leaves the remainder of the output NaN.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "EMA period must be >= 1");

    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let first = match values.iter().position(|v| !v.is_nan()) {
        Some(i) => i,
        None => return result,
    };
    if n - first < period {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let seed_end = first + period;
    let mut sum = 0.0;
    for &v in &values[first..seed_end] {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[seed_end - 1] = seed;

    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_is_identity() {
        let result = ema_series(&[55.0, 60.5, 48.0], 1);
        assert_approx(result[0], 55.0, DEFAULT_EPSILON);
        assert_approx(result[1], 60.5, DEFAULT_EPSILON);
        assert_approx(result[2], 48.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5
        // Seed at index 2: SMA(20,22,24) = 22.0
        // EMA[3] = 0.5*26 + 0.5*22.0 = 24.0
        // EMA[4] = 0.5*28 + 0.5*24.0 = 26.0
        let result = ema_series(&[20.0, 22.0, 24.0, 26.0, 28.0], 3);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 22.0, DEFAULT_EPSILON);
        assert_approx(result[3], 24.0, DEFAULT_EPSILON);
        assert_approx(result[4], 26.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_skips_nan_prefix() {
        // Seed window is the first 3 defined values: SMA(20,22,24) at index 4.
        let values = [f64::NAN, f64::NAN, 20.0, 22.0, 24.0, 26.0];
        let result = ema_series(&values, 3);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert_approx(result[4], 22.0, DEFAULT_EPSILON);
        assert_approx(result[5], 24.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_after_seed_taints_rest() {
        let values = [20.0, 22.0, 24.0, f64::NAN, 28.0];
        let result = ema_series(&values, 3);
        assert_approx(result[2], 22.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn ema_all_nan_input() {
        let result = ema_series(&[f64::NAN, f64::NAN], 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_too_few_defined_values() {
        let values = [f64::NAN, f64::NAN, 20.0, 22.0];
        let result = ema_series(&values, 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
