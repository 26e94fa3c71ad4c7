//! VNSignal Runner — orchestration around the core replay engine.
//!
//! This crate builds on `vnsignal-core` to provide:
//! - Price history providers (CSV directories, seeded synthetic walks)
//! - A single-symbol backtest runner producing self-describing reports
//! - Parallel batch comparison runs over a symbol list
//! - Watch state with explicit JSON load/save boundaries
//! - Daily recommendation lines for live/alerting use
//! - Markdown and CSV artifact generation

pub mod batch;
pub mod config;
pub mod history;
pub mod recommend;
pub mod report;
pub mod runner;
pub mod watchlist;

pub use batch::{run_batch, BatchFailure, BatchReport, ComparisonRow, Window, VN30_SYMBOLS};
pub use config::{ConfigFileError, RunConfig, RunId};
pub use history::{dataset_hash, CsvHistory, HistoryError, HistoryProvider, SyntheticHistory};
pub use recommend::{recommendation_for, recommendation_line, signal_marker};
pub use report::{
    export_equity_csv, export_json, export_trades_csv, generate_comparison, generate_report,
    import_json, load_artifacts, save_artifacts,
};
pub use runner::{
    run_from_file, run_symbol, run_with_bars, BacktestReport, RunError, SCHEMA_VERSION,
};
pub use watchlist::{ChannelId, ChannelWatch, StateError, WatchState};
