//! Daily recommendation lines for watched symbols.
//!
//! Renders one line per symbol in the shape the original alert channel used:
//!
//! ```text
//! 🟢 FPT: 91500.00 🔺 (1.25%) - Buy
//! ```
//!
//! The status marker follows the signal, the arrow follows the day-over-day
//! move, and both percentages carry exactly two decimals.

use chrono::NaiveDate;

use vnsignal_core::domain::{Bar, IndicatorSnapshot};
use vnsignal_core::indicators::{compute_snapshots, IndicatorParams};
use vnsignal_core::signal::{evaluate_current_signal, Signal, SignalRule};

use crate::history::{HistoryError, HistoryProvider};

/// Sessions of history fetched for a live recommendation, enough to warm up
/// every indicator with a wide margin.
const LOOKBACK_DAYS: i64 = 365;

/// Status marker for a signal.
pub fn signal_marker(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "\u{1F7E2}",  // 🟢
        Signal::Sell => "\u{1F534}", // 🔴
        Signal::Hold => "\u{1F7E1}", // 🟡
    }
}

fn signal_label(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "Buy",
        Signal::Sell => "Sell",
        Signal::Hold => "Hold",
    }
}

fn change_marker(change_pct: f64) -> &'static str {
    if change_pct > 0.0 {
        "\u{1F53A}" // 🔺
    } else if change_pct < 0.0 {
        "\u{1F53B}" // 🔻
    } else {
        "\u{2796}" // ➖
    }
}

/// Render one recommendation line from a symbol's latest history.
///
/// `snapshots` is normally `compute_snapshots(bars, params)`; only the last
/// two entries are read. With no bars the line says so instead of guessing;
/// with a single bar the day-over-day change renders as flat.
pub fn recommendation_line(
    symbol: &str,
    bars: &[Bar],
    snapshots: &[IndicatorSnapshot],
    rule: &dyn SignalRule,
) -> String {
    let Some(last) = bars.last() else {
        return format!("{symbol}: no data available");
    };

    let change_pct = match bars.len().checked_sub(2).map(|i| &bars[i]) {
        Some(prev) => (last.close / prev.close - 1.0) * 100.0,
        None => 0.0,
    };

    let signal = evaluate_current_signal(rule, snapshots, last.close);

    format!(
        "{} {symbol}: {:.2} {} ({change_pct:.2}%) - {}",
        signal_marker(signal),
        last.close,
        change_marker(change_pct),
        signal_label(signal),
    )
}

/// Fetch a year of history ending at `as_of` and render the recommendation.
pub fn recommendation_for(
    provider: &dyn HistoryProvider,
    symbol: &str,
    rule: &dyn SignalRule,
    params: &IndicatorParams,
    as_of: NaiveDate,
) -> Result<String, HistoryError> {
    let start = as_of - chrono::Duration::days(LOOKBACK_DAYS);
    let bars = provider.fetch(symbol, start, as_of)?;
    let snapshots = compute_snapshots(&bars, params);
    Ok(recommendation_line(symbol, &bars, &snapshots, rule))
}
