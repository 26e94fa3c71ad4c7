//! Performance statistics, pure functions from equity curve and trade list.
//!
//! Every function takes slices in and returns a scalar; none of them touch
//! the engine. Degenerate denominators (no trades, zero variance, empty
//! curve) resolve to 0.0 rather than an error. All percentage values are
//! full-precision internally and rendered with exactly two decimals by the
//! `Display` impl.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Trade};
use crate::engine::{EngineConfig, RunResult};

/// Aggregate statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub buy_hold_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub trade_count: usize,
    pub win_rate_pct: f64,
    pub avg_trade_pct: f64,
    pub best_trade_pct: f64,
    pub worst_trade_pct: f64,
    pub total_commission: f64,
}

impl BacktestSummary {
    /// Compute all statistics from a finished run.
    pub fn compute(result: &RunResult, bars: &[Bar], config: &EngineConfig) -> Self {
        let equity: Vec<f64> = result.equity_curve.iter().map(|p| p.equity).collect();
        Self {
            initial_capital: config.initial_capital,
            final_equity: result.final_equity,
            total_return_pct: total_return_pct(result.final_equity, config.initial_capital),
            buy_hold_return_pct: buy_hold_return_pct(bars),
            max_drawdown_pct: max_drawdown_pct(&equity),
            sharpe_ratio: sharpe_ratio(&equity, config.periods_per_year),
            trade_count: result.trades.len(),
            win_rate_pct: win_rate_pct(&result.trades),
            avg_trade_pct: avg_trade_pct(&result.trades),
            best_trade_pct: best_trade_pct(&result.trades),
            worst_trade_pct: worst_trade_pct(&result.trades),
            total_commission: result.total_commission,
        }
    }
}

impl fmt::Display for BacktestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Initial capital:   {:>15.2}", self.initial_capital)?;
        writeln!(f, "Final equity:      {:>15.2}", self.final_equity)?;
        writeln!(f, "Total return:      {:>14.2}%", self.total_return_pct)?;
        writeln!(f, "Buy & hold:        {:>14.2}%", self.buy_hold_return_pct)?;
        writeln!(f, "Max drawdown:      {:>14.2}%", self.max_drawdown_pct)?;
        writeln!(f, "Sharpe ratio:      {:>15.2}", self.sharpe_ratio)?;
        writeln!(f, "Trades:            {:>15}", self.trade_count)?;
        writeln!(f, "Win rate:          {:>14.2}%", self.win_rate_pct)?;
        writeln!(f, "Avg trade:         {:>14.2}%", self.avg_trade_pct)?;
        writeln!(f, "Best trade:        {:>14.2}%", self.best_trade_pct)?;
        writeln!(f, "Worst trade:       {:>14.2}%", self.worst_trade_pct)?;
        write!(f, "Total commission:  {:>15.2}", self.total_commission)
    }
}

// ─── Individual statistic functions ─────────────────────────────────

/// Total return on initial capital, in percent.
pub fn total_return_pct(final_equity: f64, initial_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_equity / initial_capital - 1.0) * 100.0
}

/// Return of buying at the first close and holding to the last, in percent.
pub fn buy_hold_return_pct(bars: &[Bar]) -> f64 {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return 0.0;
    };
    if bars.len() < 2 || first.close <= 0.0 {
        return 0.0;
    }
    (last.close / first.close - 1.0) * 100.0
}

/// Maximum peak-to-trough drawdown, in percent. Always non-negative;
/// 0.0 for a non-decreasing curve.
pub fn max_drawdown_pct(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = 1.0 - eq / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd * 100.0
}

/// Annualized Sharpe-like ratio from per-bar equity returns.
///
/// mean(returns) / std(returns) * sqrt(periods_per_year), with the sample
/// standard deviation (n - 1). Returns 0.0 when variance is zero or the
/// curve has fewer than 3 points.
pub fn sharpe_ratio(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    let returns = bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

/// Percentage of trades with positive pnl. 0.0 when there are no trades.
pub fn win_rate_pct(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    100.0 * winners as f64 / trades.len() as f64
}

/// Mean per-trade return in percent. 0.0 when there are no trades.
pub fn avg_trade_pct(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.pnl_pct).sum::<f64>() / trades.len() as f64
}

/// Best per-trade return in percent. 0.0 when there are no trades.
pub fn best_trade_pct(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades
        .iter()
        .map(|t| t.pnl_pct)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Worst per-trade return in percent. 0.0 when there are no trades.
pub fn worst_trade_pct(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.pnl_pct).fold(f64::INFINITY, f64::min)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Per-bar simple returns from an equity curve.
pub fn bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    if equity_curve.len() < 2 {
        return Vec::new();
    }
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn make_trade(pnl_pct: f64) -> Trade {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let entry_price = 100.0;
        let exit_price = entry_price * (1.0 + pnl_pct / 100.0);
        Trade {
            entry_bar: 0,
            entry_date: date,
            entry_price,
            exit_bar: 5,
            exit_date: date + chrono::Duration::days(7),
            exit_price,
            size: 100,
            pnl: 100.0 * (exit_price - entry_price),
            pnl_pct,
            bars_held: 5,
        }
    }

    // ── Total return ──

    #[test]
    fn total_return_positive() {
        assert!((total_return_pct(110_000.0, 100_000.0) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn total_return_negative() {
        assert!((total_return_pct(90_000.0, 100_000.0) - (-10.0)).abs() < 1e-10);
    }

    #[test]
    fn total_return_flat() {
        assert_eq!(total_return_pct(100_000.0, 100_000.0), 0.0);
    }

    #[test]
    fn total_return_bad_capital() {
        assert_eq!(total_return_pct(100_000.0, 0.0), 0.0);
    }

    // ── Buy & hold ──

    #[test]
    fn buy_hold_known() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        assert!((buy_hold_return_pct(&bars) - 20.0).abs() < 1e-10);
    }

    #[test]
    fn buy_hold_single_bar() {
        let bars = make_bars(&[10.0]);
        assert_eq!(buy_hold_return_pct(&bars), 0.0);
    }

    #[test]
    fn buy_hold_empty() {
        assert_eq!(buy_hold_return_pct(&[]), 0.0);
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_known() {
        let eq = vec![100_000.0, 120_000.0, 96_000.0, 108_000.0];
        // Peak 120k, trough 96k: (1 - 96/120) * 100 = 20%
        assert!((max_drawdown_pct(&eq) - 20.0).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_is_positive() {
        let eq = vec![100.0, 80.0, 120.0, 60.0];
        assert!(max_drawdown_pct(&eq) > 0.0);
    }

    #[test]
    fn max_drawdown_monotonic_increase() {
        let eq: Vec<f64> = (0..100).map(|i| 100_000.0 + i as f64 * 100.0).collect();
        assert_eq!(max_drawdown_pct(&eq), 0.0);
    }

    #[test]
    fn max_drawdown_constant() {
        let eq = vec![100_000.0; 100];
        assert_eq!(max_drawdown_pct(&eq), 0.0);
    }

    #[test]
    fn max_drawdown_empty() {
        assert_eq!(max_drawdown_pct(&[]), 0.0);
    }

    // ── Sharpe ──

    #[test]
    fn sharpe_constant_equity_is_zero() {
        let eq = vec![100_000.0; 100];
        assert_eq!(sharpe_ratio(&eq, 252.0), 0.0);
    }

    #[test]
    fn sharpe_constant_return_is_zero() {
        // Perfectly constant per-bar return, zero variance.
        let mut eq = vec![100_000.0];
        for i in 1..100 {
            eq.push(eq[i - 1] * 1.001);
        }
        assert_eq!(sharpe_ratio(&eq, 252.0), 0.0);
    }

    #[test]
    fn sharpe_positive_for_alternating_gains() {
        let mut eq = vec![100_000.0];
        for i in 1..253 {
            let r = if i % 2 == 0 { 1.002 } else { 1.0005 };
            eq.push(eq[i - 1] * r);
        }
        let s = sharpe_ratio(&eq, 252.0);
        assert!(s > 5.0, "expected high Sharpe, got {s}");
    }

    #[test]
    fn sharpe_scales_with_sqrt_of_periods() {
        let mut eq = vec![100_000.0];
        for i in 1..100 {
            let r = if i % 2 == 0 { 1.002 } else { 0.9995 };
            eq.push(eq[i - 1] * r);
        }
        let annual = sharpe_ratio(&eq, 252.0);
        let quarter = sharpe_ratio(&eq, 63.0);
        assert!((annual - quarter * 2.0).abs() < 1e-10);
    }

    #[test]
    fn sharpe_short_curve_is_zero() {
        assert_eq!(sharpe_ratio(&[100.0, 101.0], 252.0), 0.0);
    }

    // ── Win rate ──

    #[test]
    fn win_rate_mixed() {
        let trades = vec![
            make_trade(5.0),
            make_trade(-2.0),
            make_trade(3.0),
            make_trade(-1.0),
        ];
        assert!((win_rate_pct(&trades) - 50.0).abs() < 1e-10);
    }

    #[test]
    fn win_rate_all_winners() {
        let trades = vec![make_trade(5.0), make_trade(3.0)];
        assert!((win_rate_pct(&trades) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn win_rate_no_trades_is_zero() {
        assert_eq!(win_rate_pct(&[]), 0.0);
    }

    // ── Per-trade statistics ──

    #[test]
    fn avg_trade_known() {
        let trades = vec![make_trade(6.0), make_trade(-2.0)];
        assert!((avg_trade_pct(&trades) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn avg_trade_no_trades_is_zero() {
        assert_eq!(avg_trade_pct(&[]), 0.0);
    }

    #[test]
    fn best_and_worst_known() {
        let trades = vec![make_trade(6.0), make_trade(-2.0), make_trade(1.0)];
        assert!((best_trade_pct(&trades) - 6.0).abs() < 1e-10);
        assert!((worst_trade_pct(&trades) - (-2.0)).abs() < 1e-10);
    }

    #[test]
    fn best_and_worst_single_trade() {
        let trades = vec![make_trade(-3.0)];
        assert_eq!(best_trade_pct(&trades), worst_trade_pct(&trades));
    }

    #[test]
    fn best_and_worst_no_trades_are_zero() {
        assert_eq!(best_trade_pct(&[]), 0.0);
        assert_eq!(worst_trade_pct(&[]), 0.0);
    }

    // ── Helpers ──

    #[test]
    fn bar_returns_basic() {
        let eq = vec![200.0, 250.0, 200.0];
        let r = bar_returns(&eq);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.25).abs() < 1e-10);
        assert!((r[1] - (-0.2)).abs() < 1e-10);
    }

    #[test]
    fn std_dev_uses_sample_variance() {
        // Known: values [1, 2, 3, 4], mean 2.5, sample variance 5/3.
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert!((std_dev(&values) - (5.0_f64 / 3.0).sqrt()).abs() < 1e-10);
    }

    // ── Display ──

    #[test]
    fn display_renders_two_decimals() {
        let summary = BacktestSummary {
            initial_capital: 100_000.0,
            final_equity: 112_500.0,
            total_return_pct: 12.5,
            buy_hold_return_pct: 100.0 / 3.0,
            max_drawdown_pct: 5.0,
            sharpe_ratio: 1.234_9,
            trade_count: 3,
            win_rate_pct: 200.0 / 3.0,
            avg_trade_pct: 0.875,
            best_trade_pct: 4.2,
            worst_trade_pct: -2.1,
            total_commission: 150.0,
        };
        let text = summary.to_string();
        assert!(text.contains("12.50%"));
        assert!(text.contains("33.33%"));
        assert!(text.contains("66.67%"));
        assert!(text.contains("1.23"));
        assert!(text.contains("-2.10%"));
        assert!(!text.contains("12.500"));
    }
}
