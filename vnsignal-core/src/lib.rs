//! VNSignal Core — domain types, indicators, signal rules, and the replay engine.
//!
//! This crate contains the deterministic heart of the backtester:
//! - Domain types (bars, indicator snapshots, positions, trades)
//! - Indicator series (SMA, EMA, stochastic, MACD) with NaN warm-up
//! - Signal rules behind one trait (MACD cross, triple confirm, stochastic zone)
//! - Lot-constrained order sizing
//! - Bar-by-bar replay with a flat/long state machine
//! - Performance statistics
//!
//! Everything here is pure and synchronous. Data acquisition, persistence,
//! batch drivers, and reporting live in the runner crate.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signal;
pub mod sizer;
pub mod stats;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: all core types are Send + Sync.
    ///
    /// The runner fans independent backtests out across a thread pool; every
    /// type that crosses into a worker has to pass this.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::IndicatorSnapshot>();
        require_sync::<domain::IndicatorSnapshot>();
        require_send::<domain::OpenPosition>();
        require_sync::<domain::OpenPosition>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        // Indicator configuration
        require_send::<indicators::IndicatorParams>();
        require_sync::<indicators::IndicatorParams>();

        // Signal types
        require_send::<signal::Signal>();
        require_sync::<signal::Signal>();
        require_send::<signal::RuleConfig>();
        require_sync::<signal::RuleConfig>();
        require_send::<signal::MacdCross>();
        require_sync::<signal::MacdCross>();
        require_send::<signal::TripleConfirm>();
        require_sync::<signal::TripleConfirm>();
        require_send::<signal::StochasticZone>();
        require_sync::<signal::StochasticZone>();
        require_send::<Box<dyn signal::SignalRule>>();
        require_sync::<Box<dyn signal::SignalRule>>();

        // Sizing and engine types
        require_send::<sizer::LotSizer>();
        require_sync::<sizer::LotSizer>();
        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();
        require_send::<engine::ExecutionPolicy>();
        require_sync::<engine::ExecutionPolicy>();
        require_send::<engine::Ledger>();
        require_sync::<engine::Ledger>();
        require_send::<engine::EquityPoint>();
        require_sync::<engine::EquityPoint>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();

        // Statistics
        require_send::<stats::BacktestSummary>();
        require_sync::<stats::BacktestSummary>();
    }

    /// Architecture contract: SignalRule does NOT see the ledger.
    ///
    /// `evaluate()` takes two snapshots and a price. A rule cannot read cash
    /// or position state, so buy/sell decisions can never depend on how the
    /// replay is doing. If someone adds a ledger parameter, the trait changes
    /// and every implementation breaks; this test documents the contract.
    #[test]
    fn signal_rule_trait_has_no_ledger_parameter() {
        fn _check_trait_object_builds(
            rule: &dyn signal::SignalRule,
            prev: Option<&domain::IndicatorSnapshot>,
            curr: &domain::IndicatorSnapshot,
        ) -> signal::Signal {
            rule.evaluate(prev, curr, 100.0)
        }
    }
}
