//! Engine configuration and pre-run validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sizer::LotSizer;

/// When a signal turns into a fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionPolicy {
    /// Fill at the close of the bar that produced the signal.
    #[default]
    TradeOnClose,
    /// Fill at the open of the bar after the signal bar. A signal raised on
    /// the final bar has no next open and expires unfilled.
    NextBarOpen,
}

/// Configuration rejected before any bar is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("lot size must be greater than zero")]
    ZeroLotSize,

    #[error("commission rate must be in [0, 1), got {0}")]
    InvalidCommissionRate(f64),
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_capital: f64,
    /// Shares per exchange lot. HOSE trades round lots of 100.
    #[serde(default = "default_lot_size")]
    pub lot_size: u64,
    /// Commission as a fraction of notional, charged on entry and exit.
    #[serde(default)]
    pub commission_rate: f64,
    #[serde(default)]
    pub execution: ExecutionPolicy,
    /// Sell any position still open at the final bar's close.
    #[serde(default)]
    pub force_close_at_end: bool,
    /// Trading periods per year, used to annualize the Sharpe ratio.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
}

fn default_lot_size() -> u64 {
    100
}

fn default_periods_per_year() -> f64 {
    252.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(100_000_000.0)
    }
}

impl EngineConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            lot_size: default_lot_size(),
            commission_rate: 0.0,
            execution: ExecutionPolicy::TradeOnClose,
            force_close_at_end: false,
            periods_per_year: default_periods_per_year(),
        }
    }

    /// Check the configuration before the replay touches any bar.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if self.lot_size == 0 {
            return Err(ConfigError::ZeroLotSize);
        }
        if !(self.commission_rate >= 0.0 && self.commission_rate < 1.0) {
            return Err(ConfigError::InvalidCommissionRate(self.commission_rate));
        }
        Ok(())
    }

    /// Build the lot sizer for this configuration.
    ///
    /// Call [`validate`](Self::validate) first; the sizer constructor treats
    /// an invalid lot size or commission rate as a programmer error.
    pub fn sizer(&self) -> LotSizer {
        LotSizer::new(self.lot_size, self.commission_rate)
    }
}
