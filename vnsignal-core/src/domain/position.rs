//! Open position tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The single open long position.
///
/// The ledger stores `Option<OpenPosition>`: `None` is the flat state, so
/// "size is zero exactly when no position is open" holds by construction.
/// `size` is strictly positive for any live value of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub size: u64,
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl OpenPosition {
    pub fn market_value(&self, current_price: f64) -> f64 {
        self.size as f64 * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.size as f64 * (current_price - self.entry_price)
    }
}
