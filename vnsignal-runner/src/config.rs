//! Serializable run configuration.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vnsignal_core::engine::EngineConfig;
use vnsignal_core::indicators::IndicatorParams;
use vnsignal_core::signal::RuleConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("config file '{path}' not readable: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("config file '{path}' is malformed: {reason}")]
    Malformed { path: String, reason: String },
}

/// Everything needed to reproduce one backtest run.
///
/// Captures the symbol, the date window, the signal rule, the indicator
/// window lengths and the engine settings. Two identical configs hash to the
/// same [`RunId`], so artifacts can be content-addressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub symbol: String,

    /// Backtest start date (inclusive).
    pub start_date: NaiveDate,

    /// Backtest end date (inclusive).
    pub end_date: NaiveDate,

    pub rule: RuleConfig,

    #[serde(default)]
    pub indicators: IndicatorParams,

    pub engine: EngineConfig,
}

impl RunConfig {
    /// Build a config with the defaults the Vietnamese-market rules were
    /// tuned with: triple confirmation, MA(10)/STOCH(14,5,5)/MACD(8,17,9),
    /// 100,000,000 VND starting capital, lot size 100, zero commission,
    /// trade-on-close.
    pub fn new(symbol: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start_date,
            end_date,
            rule: RuleConfig::TripleConfirm,
            indicators: IndicatorParams::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs have the same RunId and can share
    /// cached artifacts.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Load a config from a TOML file.
    ///
    /// Dates are ISO strings (`start_date = "2023-09-01"`), the rule a tagged
    /// table (`[rule] type = "MACD_CROSS"`).
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigFileError::Unreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        toml::from_str(&text).map_err(|err| ConfigFileError::Malformed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }
}
