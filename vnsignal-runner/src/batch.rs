//! Batch comparison runs over a symbol list.
//!
//! The original VN30 driver backtests every index constituent over a
//! five-year and a one-year window and tabulates strategy vs buy-and-hold per
//! symbol. `run_batch` reproduces that: one job per (symbol, window), run in
//! parallel, one comparison row per job. A symbol that fails (no data, bad
//! history) is reported in `failures` instead of aborting the whole batch.

use chrono::{Months, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use vnsignal_core::stats::BacktestSummary;

use crate::config::RunConfig;
use crate::history::HistoryProvider;
use crate::runner::{run_symbol, BacktestReport};

/// The thirty HOSE large-caps the original driver compared.
pub const VN30_SYMBOLS: [&str; 30] = [
    "ACB", "BCM", "BID", "BVH", "CTG", "FPT", "GAS", "GVR", "HDB", "HPG", "MBB", "MSN", "MWG",
    "PLX", "POW", "SAB", "SHB", "SSB", "SSI", "STB", "TCB", "TPB", "VCB", "VHM", "VIB", "VIC",
    "VJC", "VNM", "VPB", "VRE",
];

/// A labelled date window for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// Window reaching `years` back from `end`, labelled `"{years}Y"`.
    pub fn years_back(end: NaiveDate, years: u32) -> Self {
        let start = end
            .checked_sub_months(Months::new(12 * years))
            .unwrap_or(NaiveDate::MIN);
        Self::new(format!("{years}Y"), start, end)
    }

    /// The original driver's pair: five years and one year back from `end`.
    pub fn five_and_one_year(end: NaiveDate) -> Vec<Window> {
        vec![Window::years_back(end, 5), Window::years_back(end, 1)]
    }
}

/// One line of the batch comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub symbol: String,
    pub window: String,
    pub summary: BacktestSummary,
    /// Mean bars held per closed trade, 0 with no trades.
    pub avg_hold_bars: f64,
}

impl ComparisonRow {
    fn from_report(window: &str, report: &BacktestReport) -> Self {
        let trades = &report.trades;
        let avg_hold_bars = if trades.is_empty() {
            0.0
        } else {
            trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / trades.len() as f64
        };
        Self {
            symbol: report.config.symbol.clone(),
            window: window.to_string(),
            summary: report.summary.clone(),
            avg_hold_bars,
        }
    }
}

/// A (symbol, window) job that did not produce a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub symbol: String,
    pub window: String,
    pub error: String,
}

/// All rows and failures from one batch run, in job order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub rows: Vec<ComparisonRow>,
    pub failures: Vec<BatchFailure>,
}

/// Backtest every (symbol, window) pair in parallel.
///
/// `base` supplies the rule, indicator and engine settings; the symbol and
/// window fields are overridden per job. Jobs are independent engine
/// instances, so rayon may schedule them freely; the output order is still
/// deterministic (symbols outer, windows inner).
pub fn run_batch(
    symbols: &[String],
    windows: &[Window],
    base: &RunConfig,
    provider: &dyn HistoryProvider,
) -> BatchReport {
    let jobs: Vec<(&String, &Window)> = symbols
        .iter()
        .flat_map(|symbol| windows.iter().map(move |window| (symbol, window)))
        .collect();

    let outcomes: Vec<Result<ComparisonRow, BatchFailure>> = jobs
        .into_par_iter()
        .map(|(symbol, window)| {
            let mut config = base.clone();
            config.symbol = symbol.clone();
            config.start_date = window.start;
            config.end_date = window.end;

            match run_symbol(&config, provider) {
                Ok(report) => Ok(ComparisonRow::from_report(&window.label, &report)),
                Err(err) => Err(BatchFailure {
                    symbol: symbol.clone(),
                    window: window.label.clone(),
                    error: err.to_string(),
                }),
            }
        })
        .collect();

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(row) => rows.push(row),
            Err(failure) => {
                warn!(
                    symbol = %failure.symbol,
                    window = %failure.window,
                    error = %failure.error,
                    "batch job failed"
                );
                failures.push(failure);
            }
        }
    }

    BatchReport { rows, failures }
}
