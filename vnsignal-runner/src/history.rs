//! Price history providers — CSV directories and seeded synthetic walks.
//!
//! A provider hands the runner a date-ordered `Vec<Bar>` for one symbol. Two
//! implementations:
//! 1. `CsvHistory` reads one `{SYMBOL}.csv` file per symbol from a directory.
//! 2. `SyntheticHistory` generates a deterministic random walk for tests,
//!    demos and benches. Synthetic bars are clearly fake; callers decide
//!    whether to accept them.
//!
//! Providers only load. Ordering and price sanity are enforced by the engine's
//! input validation, not here.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;
use tracing::{info, warn};
use vnsignal_core::domain::Bar;

/// Errors from the history layer.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no price data for '{symbol}' in the requested window")]
    NoData { symbol: String },

    #[error("history for '{symbol}' not readable: {reason}")]
    Unreadable { symbol: String, reason: String },

    #[error("history row {row} for '{symbol}' is malformed: {reason}")]
    MalformedRow {
        symbol: String,
        row: usize,
        reason: String,
    },
}

/// Source of daily bars for a symbol.
///
/// `fetch` returns bars whose dates fall inside `[start, end]`, oldest first.
/// An unknown symbol or an empty window is `HistoryError::NoData`, a terminal
/// input error for the run rather than a crash.
pub trait HistoryProvider: Send + Sync {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, HistoryError>;
}

// ─── CSV-backed provider ────────────────────────────────────────────

/// Reads bars from a directory of CSV files, one `{SYMBOL}.csv` per symbol.
///
/// Expected columns: `date,open,high,low,close,volume` with a header row and
/// ISO dates. Rows outside the requested window are skipped.
#[derive(Debug, Clone)]
pub struct CsvHistory {
    root: PathBuf,
}

impl CsvHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{symbol}.csv"))
    }
}

impl HistoryProvider for CsvHistory {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, HistoryError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(HistoryError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut reader =
            csv::Reader::from_path(&path).map_err(|err| HistoryError::Unreadable {
                symbol: symbol.to_string(),
                reason: err.to_string(),
            })?;

        let mut bars = Vec::new();
        for (row, record) in reader.deserialize::<Bar>().enumerate() {
            let bar = record.map_err(|err| HistoryError::MalformedRow {
                symbol: symbol.to_string(),
                row: row + 1,
                reason: err.to_string(),
            })?;
            if bar.date >= start && bar.date <= end {
                bars.push(bar);
            }
        }

        if bars.is_empty() {
            return Err(HistoryError::NoData {
                symbol: symbol.to_string(),
            });
        }

        info!(symbol, rows = bars.len(), "loaded history from csv");
        Ok(bars)
    }
}

// ─── Synthetic provider ─────────────────────────────────────────────

/// Deterministic random-walk bars for tests, demos and benches.
///
/// The walk is seeded from the symbol name, so the same symbol always yields
/// the same history and different symbols diverge. Weekends are skipped to
/// mimic a daily session calendar.
#[derive(Debug, Clone)]
pub struct SyntheticHistory {
    start_price: f64,
}

impl Default for SyntheticHistory {
    fn default() -> Self {
        // VND scale: a mid-cap HOSE ticker trades around tens of thousands.
        Self {
            start_price: 25_000.0,
        }
    }
}

impl SyntheticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_price(start_price: f64) -> Self {
        Self { start_price }
    }
}

impl HistoryProvider for SyntheticHistory {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, HistoryError> {
        warn!(symbol, "generating synthetic history");
        let bars = generate_walk(symbol, self.start_price, start, end);
        if bars.is_empty() {
            return Err(HistoryError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}

/// Random walk seeded from the symbol name.
fn generate_walk(symbol: &str, start_price: f64, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = start_price;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == Weekday::Sat || weekday == Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(100_000..5_000_000u64);

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

// ─── Dataset fingerprinting ─────────────────────────────────────────

/// Deterministic BLAKE3 hash over a bar series.
///
/// Covers every date and OHLCV value, so two runs report the same hash
/// exactly when they replayed the same data.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
