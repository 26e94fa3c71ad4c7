//! Lot-constrained order sizing.
//!
//! Vietnamese exchanges trade round lots; the sizer converts available cash
//! into the largest whole-lot share quantity whose total cost, commission
//! included, stays within cash.

use serde::{Deserialize, Serialize};

/// All-in sizer: spend as much cash as whole lots allow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LotSizer {
    /// Minimum tradable share increment (100 on HOSE/HNX).
    pub lot_size: u64,
    /// Proportional commission per fill, e.g. 0.0015 for 15 bps.
    pub commission_rate: f64,
}

impl LotSizer {
    pub fn new(lot_size: u64, commission_rate: f64) -> Self {
        assert!(lot_size > 0, "lot_size must be > 0");
        assert!(
            (0.0..1.0).contains(&commission_rate),
            "commission_rate must be in [0, 1)"
        );
        Self {
            lot_size,
            commission_rate,
        }
    }

    /// Share quantity buyable with `cash` at `price`.
    ///
    /// `floor(cash / (lot_size * price * (1 + c))) * lot_size`; zero when one
    /// lot is unaffordable or the price is unusable. The result is always a
    /// multiple of `lot_size` and its all-in cost never exceeds `cash`.
    pub fn shares(&self, cash: f64, price: f64) -> u64 {
        if cash <= 0.0 || price <= 0.0 || !price.is_finite() {
            return 0;
        }
        let lot_cost = self.lot_size as f64 * price * (1.0 + self.commission_rate);
        let lots = (cash / lot_cost).floor();
        if lots < 1.0 {
            return 0;
        }
        lots as u64 * self.lot_size
    }

    /// Commission charged on a fill of `size` shares at `price`.
    pub fn commission(&self, size: u64, price: f64) -> f64 {
        size as f64 * price * self.commission_rate
    }
}
