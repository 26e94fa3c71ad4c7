//! Backtest runner — wires history, indicators, rule, engine and summary.
//!
//! Two entry points:
//! - `run_symbol()`: fetches bars from a provider, then runs. Used by the CLI
//!   and the batch driver.
//! - `run_with_bars()`: takes pre-loaded bars, no I/O. Used by tests and by
//!   callers that already hold a history.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use vnsignal_core::domain::{Bar, OpenPosition, Trade};
use vnsignal_core::engine::{run_backtest, EngineError, EquityPoint};
use vnsignal_core::indicators::compute_snapshots;
use vnsignal_core::stats::BacktestSummary;

use crate::config::{ConfigFileError, RunConfig, RunId};
use crate::history::{dataset_hash, HistoryError, HistoryProvider};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigFileError),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
///
/// Self-describing: carries the config that produced it, a fingerprint of the
/// data it replayed, and the full trade and equity detail behind the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: RunConfig,

    /// First and last sessions actually replayed; the provider may return a
    /// narrower range than the configured window.
    pub first_session: NaiveDate,
    pub last_session: NaiveDate,
    pub bar_count: usize,

    /// BLAKE3 fingerprint of the replayed bars.
    pub dataset_hash: String,

    pub summary: BacktestSummary,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,

    /// Position still open after the final bar, when force-close is off. It
    /// contributes mark-to-market to the final equity but is not a trade.
    pub open_position: Option<OpenPosition>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest, fetching bars from the provider.
pub fn run_symbol(
    config: &RunConfig,
    provider: &dyn HistoryProvider,
) -> Result<BacktestReport, RunError> {
    let bars = provider.fetch(&config.symbol, config.start_date, config.end_date)?;
    run_with_bars(config, &bars)
}

/// Run a single backtest over pre-loaded bars — no I/O.
pub fn run_with_bars(config: &RunConfig, bars: &[Bar]) -> Result<BacktestReport, RunError> {
    let snapshots = compute_snapshots(bars, &config.indicators);
    let rule = config.rule.build();
    let result = run_backtest(bars, &snapshots, rule.as_ref(), &config.engine)?;
    let summary = BacktestSummary::compute(&result, bars, &config.engine);

    info!(
        symbol = %config.symbol,
        rule = rule.name(),
        bars = result.bar_count,
        trades = result.trades.len(),
        "backtest complete"
    );

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        config: config.clone(),
        first_session: bars.first().map(|b| b.date).unwrap_or_default(),
        last_session: bars.last().map(|b| b.date).unwrap_or_default(),
        bar_count: result.bar_count,
        dataset_hash: dataset_hash(bars),
        summary,
        trades: result.trades,
        equity_curve: result.equity_curve,
        open_position: result.open_position,
    })
}

/// Load a TOML config and run it against the provider.
pub fn run_from_file(
    path: &Path,
    provider: &dyn HistoryProvider,
) -> Result<BacktestReport, RunError> {
    let config = RunConfig::from_toml_file(path)?;
    run_symbol(&config, provider)
}
