//! Bar-by-bar replay loop, the heart of the backtesting engine.
//!
//! Three phases per bar:
//! 1. Start-of-bar: fill the action queued under next-open execution
//! 2. End-of-bar: evaluate the signal rule, fill (trade-on-close) or queue
//!    (next-bar-open) the resulting action
//! 3. Post-bar: mark-to-market equity accounting
//!
//! At most one fill happens per bar: under trade-on-close nothing is ever
//! queued, and under next-bar-open the end-of-bar phase only queues. A
//! position can therefore never be opened and closed within the same bar by
//! the rule itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, IndicatorSnapshot, OpenPosition, Trade};
use crate::signal::{Signal, SignalRule};
use crate::sizer::LotSizer;

use super::config::{ConfigError, EngineConfig, ExecutionPolicy};
use super::ledger::Ledger;

/// Input rejected before the replay starts. Fatal to the run, never retried.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("bar history is empty")]
    EmptyHistory,

    #[error("bar {index}: date {curr} does not advance past {prev}")]
    NonMonotonicDates {
        index: usize,
        prev: NaiveDate,
        curr: NaiveDate,
    },

    #[error("bar {index}: non-positive or undefined price")]
    NonPositivePrice { index: usize },

    #[error("indicator series has {snapshots} entries for {bars} bars")]
    LengthMismatch { bars: usize, snapshots: usize },
}

/// Errors from a backtest run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Input(#[from] InputError),
}

/// Equity marked to market at one bar's close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Result of a complete backtest run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Equity at each bar close, same length as the bar history.
    pub equity_curve: Vec<EquityPoint>,
    /// Completed round-trip trades, in exit order.
    pub trades: Vec<Trade>,
    /// Equity at the last bar, after any forced close.
    pub final_equity: f64,
    /// Position still open after the final bar, if force-close is off.
    pub open_position: Option<OpenPosition>,
    /// Commission paid across all fills.
    pub total_commission: f64,
    /// Number of bars processed.
    pub bar_count: usize,
}

/// What the end-of-bar signal resolved to, given the current position.
#[derive(Debug, Clone, Copy)]
enum Action {
    Open,
    Close,
}

/// Validate the bar history and its indicator alignment.
///
/// Dates must be strictly increasing, every price positive and defined, and
/// the snapshot series exactly as long as the bar series.
pub fn validate_input(bars: &[Bar], snapshots: &[IndicatorSnapshot]) -> Result<(), InputError> {
    if bars.is_empty() {
        return Err(InputError::EmptyHistory);
    }
    if snapshots.len() != bars.len() {
        return Err(InputError::LengthMismatch {
            bars: bars.len(),
            snapshots: snapshots.len(),
        });
    }
    for (index, bar) in bars.iter().enumerate() {
        if bar.has_bad_price() {
            return Err(InputError::NonPositivePrice { index });
        }
        if index > 0 && bar.date <= bars[index - 1].date {
            return Err(InputError::NonMonotonicDates {
                index,
                prev: bars[index - 1].date,
                curr: bar.date,
            });
        }
    }
    Ok(())
}

/// Run a backtest over `bars` with precomputed indicator snapshots.
///
/// Deterministic: identical inputs produce identical results. The rule is
/// the single source of truth per bar; during indicator warm-up its inputs
/// are NaN and every rule holds. A next-open action queued on the final bar
/// expires unfilled.
pub fn run_backtest(
    bars: &[Bar],
    snapshots: &[IndicatorSnapshot],
    rule: &dyn SignalRule,
    config: &EngineConfig,
) -> Result<RunResult, EngineError> {
    config.validate()?;
    validate_input(bars, snapshots)?;

    let sizer = config.sizer();
    let mut ledger = Ledger::new(config.initial_capital);
    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut pending: Option<Action> = None;

    for (i, bar) in bars.iter().enumerate() {
        // ─── Phase 1: start of bar ───
        // Fill the action queued on the previous bar at this bar's open.
        if let Some(action) = pending.take() {
            apply_action(action, bar.open, i, bar.date, &sizer, &mut ledger, &mut trades);
        }

        // ─── Phase 2: end of bar ───
        let prev = i.checked_sub(1).map(|j| &snapshots[j]);
        let signal = rule.evaluate(prev, &snapshots[i], bar.close);
        if let Some(action) = resolve_action(signal, ledger.is_long()) {
            match config.execution {
                ExecutionPolicy::TradeOnClose => {
                    apply_action(action, bar.close, i, bar.date, &sizer, &mut ledger, &mut trades);
                }
                ExecutionPolicy::NextBarOpen => pending = Some(action),
            }
        }

        // ─── Phase 3: mark to market ───
        equity_curve.push(EquityPoint {
            date: bar.date,
            equity: ledger.verify_equity(bar.close),
        });
    }

    // Terminal handling: optionally sell whatever is still open at the last
    // close. The forced exit is a regular trade; the final equity point is
    // restated to include its commission.
    if config.force_close_at_end && ledger.is_long() {
        let last_index = bars.len() - 1;
        let last = &bars[last_index];
        let size = ledger.position.as_ref().map_or(0, |pos| pos.size);
        let commission = sizer.commission(size, last.close);
        if let Some(trade) = ledger.close(last.close, commission, last_index, last.date) {
            trades.push(trade);
        }
        if let Some(point) = equity_curve.last_mut() {
            point.equity = ledger.verify_equity(last.close);
        }
    }

    let final_equity = equity_curve
        .last()
        .map_or(config.initial_capital, |point| point.equity);

    Ok(RunResult {
        equity_curve,
        trades,
        final_equity,
        open_position: ledger.position,
        total_commission: ledger.total_commission,
        bar_count: bars.len(),
    })
}

/// Map a signal onto the position state machine.
///
/// Buy only opens from flat, sell only closes from long. Everything else,
/// including pyramiding and selling with no position, is a no-op.
fn resolve_action(signal: Signal, is_long: bool) -> Option<Action> {
    match (signal, is_long) {
        (Signal::Buy, false) => Some(Action::Open),
        (Signal::Sell, true) => Some(Action::Close),
        _ => None,
    }
}

/// Execute one fill at `price`. An open whose sized quantity is zero does
/// nothing and the ledger stays flat.
fn apply_action(
    action: Action,
    price: f64,
    bar_index: usize,
    date: NaiveDate,
    sizer: &LotSizer,
    ledger: &mut Ledger,
    trades: &mut Vec<Trade>,
) {
    match action {
        Action::Open => {
            let size = sizer.shares(ledger.cash, price);
            if size > 0 {
                let commission = sizer.commission(size, price);
                ledger.open(size, price, commission, bar_index, date);
            }
        }
        Action::Close => {
            let size = ledger.position.as_ref().map_or(0, |pos| pos.size);
            if size > 0 {
                let commission = sizer.commission(size, price);
                if let Some(trade) = ledger.close(price, commission, bar_index, date) {
                    trades.push(trade);
                }
            }
        }
    }
}
