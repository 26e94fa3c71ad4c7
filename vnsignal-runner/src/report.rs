//! Reporting and export — JSON, CSV and Markdown artifact generation.
//!
//! Three formats for a finished run:
//! - **JSON**: full round-trip serialization of the `BacktestReport` with
//!   schema versioning
//! - **CSV**: trade tape and equity curve for external analysis tools
//! - **Markdown**: human-readable single-run reports and the batch
//!   comparison table
//!
//! Persisted artifacts carry a `schema_version` field; unknown versions are
//! rejected on load. Percentages render with exactly two decimals everywhere.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use vnsignal_core::domain::Trade;
use vnsignal_core::engine::EquityPoint;

use crate::batch::BatchReport;
use crate::runner::{BacktestReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestReport` to pretty JSON.
pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a `BacktestReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade tape as CSV.
///
/// Columns: entry_bar, entry_date, entry_price, exit_bar, exit_date,
/// exit_price, size, pnl, pnl_pct, bars_held
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry_bar",
        "entry_date",
        "entry_price",
        "exit_bar",
        "exit_date",
        "exit_price",
        "size",
        "pnl",
        "pnl_pct",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_bar.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.2}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.2}", t.exit_price),
            &t.size.to_string(),
            &format!("{:.2}", t.pnl),
            &format!("{:.2}", t.pnl_pct),
            &t.bars_held.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV with date and equity columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity"])?;
    for point in equity_curve {
        wtr.write_record([&point.date.to_string(), &format!("{:.2}", point.equity)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{symbol}_{run_id prefix}/` under `output_dir`
/// containing:
/// - `manifest.json` — the full `BacktestReport`
/// - `trades.csv` — trade tape
/// - `equity.csv` — bar-by-bar equity curve
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let id_prefix: String = report.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{}_{}", report.config.symbol, id_prefix));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    let trades_csv = export_trades_csv(&report.trades)?;
    std::fs::write(run_dir.join("trades.csv"), &trades_csv)?;

    let equity_csv = export_equity_csv(&report.equity_curve)?;
    std::fs::write(run_dir.join("equity.csv"), &equity_csv)?;

    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    Ok(run_dir)
}

/// Load a `BacktestReport` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(report: &BacktestReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", report.config.symbol));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        report.first_session, report.last_session
    ));
    md.push_str(&format!("| Bars | {} |\n", report.bar_count));
    md.push_str(&format!("| Rule | {} |\n", report.config.rule.build().name()));
    md.push_str(&format!(
        "| Execution | {:?} |\n",
        report.config.engine.execution
    ));
    md.push_str(&format!(
        "| Initial Capital | {:.2} |\n",
        report.config.engine.initial_capital
    ));
    md.push_str(&format!("| Run Id | {} |\n", report.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push('\n');

    let s = &report.summary;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Final Equity | {:.2} |\n", s.final_equity));
    md.push_str(&format!("| Total Return | {:.2}% |\n", s.total_return_pct));
    md.push_str(&format!(
        "| Buy & Hold Return | {:.2}% |\n",
        s.buy_hold_return_pct
    ));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", s.max_drawdown_pct));
    md.push_str(&format!("| Sharpe Ratio | {:.2} |\n", s.sharpe_ratio));
    md.push_str(&format!("| Trades | {} |\n", s.trade_count));
    md.push_str(&format!("| Win Rate | {:.2}% |\n", s.win_rate_pct));
    md.push_str(&format!("| Avg Trade | {:.2}% |\n", s.avg_trade_pct));
    md.push_str(&format!("| Best Trade | {:.2}% |\n", s.best_trade_pct));
    md.push_str(&format!("| Worst Trade | {:.2}% |\n", s.worst_trade_pct));
    md.push_str(&format!(
        "| Total Commission | {:.2} |\n",
        s.total_commission
    ));
    md.push('\n');

    if !report.trades.is_empty() {
        md.push_str("## Trades\n\n");
        md.push_str("| # | Entry | Entry Price | Exit | Exit Price | Size | PnL | PnL % | Bars |\n");
        md.push_str("| ---: | --- | ---: | --- | ---: | ---: | ---: | ---: | ---: |\n");
        for (i, t) in report.trades.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {:.2} | {} | {:.2} | {} | {:.2} | {:.2}% | {} |\n",
                i + 1,
                t.entry_date,
                t.entry_price,
                t.exit_date,
                t.exit_price,
                t.size,
                t.pnl,
                t.pnl_pct,
                t.bars_held,
            ));
        }
        md.push('\n');
    }

    md
}

/// Generate the Markdown comparison table for a batch run.
///
/// One row per (symbol, window), the columns the original VN30 comparison
/// tabulated, plus a failure list when some jobs produced no row.
pub fn generate_comparison(batch: &BatchReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Batch Comparison\n\n");
    md.push_str(
        "| Symbol | Window | Return | B&H | Max DD | Sharpe | Trades | Win Rate | Best | Worst | Avg | Avg Hold |\n",
    );
    md.push_str(
        "| --- | --- | ---: | ---: | ---: | ---: | ---: | ---: | ---: | ---: | ---: | ---: |\n",
    );

    for row in &batch.rows {
        let s = &row.summary;
        md.push_str(&format!(
            "| {} | {} | {:.2}% | {:.2}% | {:.2}% | {:.2} | {} | {:.2}% | {:.2}% | {:.2}% | {:.2}% | {:.1} |\n",
            row.symbol,
            row.window,
            s.total_return_pct,
            s.buy_hold_return_pct,
            s.max_drawdown_pct,
            s.sharpe_ratio,
            s.trade_count,
            s.win_rate_pct,
            s.best_trade_pct,
            s.worst_trade_pct,
            s.avg_trade_pct,
            row.avg_hold_bars,
        ));
    }
    md.push('\n');

    if !batch.failures.is_empty() {
        md.push_str("## Failures\n\n");
        for failure in &batch.failures {
            md.push_str(&format!(
                "- {} ({}): {}\n",
                failure.symbol, failure.window, failure.error
            ));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_trade() -> Trade {
        Trade {
            entry_bar: 5,
            entry_date: date(2024, 1, 8),
            entry_price: 90_000.0,
            exit_bar: 9,
            exit_date: date(2024, 1, 12),
            exit_price: 94_500.0,
            size: 100,
            pnl: 450_000.0,
            pnl_pct: 5.0,
            bars_held: 4,
        }
    }

    #[test]
    fn trades_csv_has_header_and_rows() {
        let csv = export_trades_csv(&[sample_trade()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "entry_bar,entry_date,entry_price,exit_bar,exit_date,exit_price,size,pnl,pnl_pct,bars_held"
        );
        assert_eq!(
            lines.next().unwrap(),
            "5,2024-01-08,90000.00,9,2024-01-12,94500.00,100,450000.00,5.00,4"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn equity_csv_renders_dates_and_two_decimals() {
        let curve = vec![
            EquityPoint {
                date: date(2024, 1, 2),
                equity: 100_000_000.0,
            },
            EquityPoint {
                date: date(2024, 1, 3),
                equity: 100_450_000.5,
            },
        ];
        let csv = export_equity_csv(&curve).unwrap();
        assert!(csv.starts_with("date,equity\n"));
        assert!(csv.contains("2024-01-03,100450000.50"));
    }

    #[test]
    fn empty_trade_list_is_header_only() {
        let csv = export_trades_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
