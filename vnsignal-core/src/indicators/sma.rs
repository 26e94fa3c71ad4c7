//! Simple moving average.
//!
//! Rolling mean over a fixed window. First valid value at index period-1;
//! earlier positions are NaN.

/// Compute the SMA of a value series.
///
/// A NaN anywhere in a window makes that window's output NaN. The output
/// recovers once the NaN leaves the window, which is what the stochastic
/// smoothing stages rely on (their input carries a NaN warm-up prefix).
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "SMA period must be >= 1");

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut tainted = false;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            tainted = true;
        }
        sum += v;
    }
    if !tainted {
        result[period - 1] = sum / period as f64;
    }

    for i in period..n {
        let leaving = values[i - period];
        let entering = values[i];
        sum = sum - leaving + entering;

        // The running sum is poisoned once a NaN has passed through it, so
        // rescan the window whenever NaN was involved.
        if entering.is_nan() || leaving.is_nan() || tainted {
            tainted = false;
            sum = 0.0;
            for &v in &values[(i + 1 - period)..=i] {
                if v.is_nan() {
                    tainted = true;
                }
                sum += v;
            }
            if tainted {
                continue;
            }
        }

        result[i] = sum / period as f64;
    }

    result
}
