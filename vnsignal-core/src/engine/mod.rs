//! The backtest engine: configuration, accounting, and the replay loop.
//!
//! The engine is deliberately small. It owns the flat/long state machine and
//! the cash ledger; signal decisions live in [`crate::signal`] and order
//! sizing in [`crate::sizer`]. `run_backtest` is the single entry point.

pub mod config;
pub mod ledger;
pub mod replay;

pub use config::{ConfigError, EngineConfig, ExecutionPolicy};
pub use ledger::Ledger;
pub use replay::{run_backtest, validate_input, EngineError, EquityPoint, InputError, RunResult};
