//! Signal rules — map indicator snapshots to buy/sell/hold decisions.
//!
//! Rules are portfolio-agnostic: they see the previous and current snapshot
//! plus the current price, never cash or position state. The replay loop owns
//! what a signal does to the ledger; a rule only says what the market looks
//! like.

pub mod macd_cross;
pub mod stoch_zone;
pub mod triple_confirm;

pub use macd_cross::MacdCross;
pub use stoch_zone::StochasticZone;
pub use triple_confirm::TripleConfirm;

use crate::domain::IndicatorSnapshot;
use serde::{Deserialize, Serialize};

/// Trading signal for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Trait for signal rules.
///
/// `prev` is the immediately preceding bar's snapshot where one exists;
/// crossover-style rules must return `Hold` without it. Any undefined (NaN)
/// input a rule depends on also forces `Hold` — warm-up bars never trade.
pub trait SignalRule: Send + Sync {
    /// Short identifier used in reports (e.g., "macd_cross").
    fn name(&self) -> &str;

    fn evaluate(
        &self,
        prev: Option<&IndicatorSnapshot>,
        curr: &IndicatorSnapshot,
        price: f64,
    ) -> Signal;
}

/// Serializable rule selection.
///
/// `build` turns the configured variant into its runtime rule, so a TOML file
/// and a programmatic caller construct rules through the same path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleConfig {
    /// MACD line crossing its signal line.
    MacdCross,

    /// Price above MA, %K above %D, and MACD above signal, all at once.
    TripleConfirm,

    /// Slow %K crossing out of the oversold/overbought zones.
    StochasticZone {
        #[serde(default = "default_oversold")]
        oversold: f64,
        #[serde(default = "default_overbought")]
        overbought: f64,
    },
}

fn default_oversold() -> f64 {
    20.0
}

fn default_overbought() -> f64 {
    80.0
}

impl RuleConfig {
    pub fn build(&self) -> Box<dyn SignalRule> {
        match *self {
            RuleConfig::MacdCross => Box::new(MacdCross),
            RuleConfig::TripleConfirm => Box::new(TripleConfirm),
            RuleConfig::StochasticZone {
                oversold,
                overbought,
            } => Box::new(StochasticZone::new(oversold, overbought)),
        }
    }
}

/// Evaluate a rule on the latest snapshots of a series, for live/alerting use.
///
/// Takes the last two snapshots as (prev, curr); with fewer than two the rule
/// runs without a predecessor, and an empty slice is always `Hold`.
pub fn evaluate_current_signal(
    rule: &dyn SignalRule,
    snapshots: &[IndicatorSnapshot],
    price: f64,
) -> Signal {
    match snapshots {
        [] => Signal::Hold,
        [curr] => rule.evaluate(None, curr, price),
        [.., prev, curr] => rule.evaluate(Some(prev), curr, price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            ma: 100.0,
            stoch_k: 55.0,
            stoch_d: 50.0,
            macd: 0.5,
            macd_signal: 0.3,
        }
    }

    #[test]
    fn rule_config_builds_each_variant() {
        assert_eq!(RuleConfig::MacdCross.build().name(), "macd_cross");
        assert_eq!(RuleConfig::TripleConfirm.build().name(), "triple_confirm");
        let zone = RuleConfig::StochasticZone {
            oversold: 20.0,
            overbought: 80.0,
        };
        assert_eq!(zone.build().name(), "stochastic_zone");
    }

    #[test]
    fn rule_config_toml_roundtrip() {
        let config = RuleConfig::StochasticZone {
            oversold: 25.0,
            overbought: 75.0,
        };
        let text = toml::to_string(&config).unwrap();
        let back: RuleConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn stochastic_zone_defaults_from_bare_config() {
        let config: RuleConfig = toml::from_str("type = \"STOCHASTIC_ZONE\"").unwrap();
        assert_eq!(
            config,
            RuleConfig::StochasticZone {
                oversold: 20.0,
                overbought: 80.0,
            }
        );
    }

    #[test]
    fn evaluate_current_signal_empty_is_hold() {
        let rule = MacdCross;
        assert_eq!(evaluate_current_signal(&rule, &[], 100.0), Signal::Hold);
    }

    #[test]
    fn evaluate_current_signal_single_snapshot_has_no_prev() {
        // MacdCross needs prev, so one snapshot holds even mid-cross.
        let rule = MacdCross;
        let snaps = [complete_snapshot()];
        assert_eq!(evaluate_current_signal(&rule, &snaps, 100.0), Signal::Hold);
    }

    #[test]
    fn evaluate_current_signal_uses_last_two() {
        let rule = MacdCross;
        let below = IndicatorSnapshot {
            macd: 0.1,
            macd_signal: 0.3,
            ..complete_snapshot()
        };
        let above = IndicatorSnapshot {
            macd: 0.5,
            macd_signal: 0.3,
            ..complete_snapshot()
        };
        // Older history beyond the last two entries is ignored.
        let snaps = [above, above, below, above];
        assert_eq!(evaluate_current_signal(&rule, &snaps, 100.0), Signal::Buy);
    }
}
