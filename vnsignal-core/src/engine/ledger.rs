//! Cash and position accounting for the single-position engine.

use chrono::NaiveDate;

use crate::domain::{OpenPosition, Trade};

/// Cash plus at most one open long position.
///
/// Flat is structural: `position` is `None` exactly when no shares are held,
/// so a zero-size long state cannot be represented. The equity accounting
/// identity `equity == cash + position market value` must hold at every bar.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub cash: f64,
    pub position: Option<OpenPosition>,
    /// Commission paid across all fills so far.
    pub total_commission: f64,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            position: None,
            total_commission: 0.0,
        }
    }

    pub fn is_long(&self) -> bool {
        self.position.is_some()
    }

    /// Open a long position, debiting `size * price` plus commission.
    ///
    /// The caller sizes the order so that the debit never exceeds cash and
    /// never opens on top of an existing position.
    pub fn open(&mut self, size: u64, price: f64, commission: f64, bar: usize, date: NaiveDate) {
        debug_assert!(self.position.is_none(), "open on a non-flat ledger");
        debug_assert!(size > 0, "open with zero size");

        self.cash -= size as f64 * price + commission;
        self.total_commission += commission;
        self.position = Some(OpenPosition {
            size,
            entry_bar: bar,
            entry_date: date,
            entry_price: price,
        });

        debug_assert!(self.cash >= -1e-9, "cash went negative: {}", self.cash);
    }

    /// Close the open position at `price`, crediting proceeds net of
    /// commission, and emit the completed round trip.
    ///
    /// Returns `None` when the ledger is already flat. The trade's `pnl` is
    /// gross of commission: `size * (exit_price - entry_price)`.
    pub fn close(
        &mut self,
        price: f64,
        commission: f64,
        bar: usize,
        date: NaiveDate,
    ) -> Option<Trade> {
        let position = self.position.take()?;

        self.cash += position.size as f64 * price - commission;
        self.total_commission += commission;

        let pnl = position.size as f64 * (price - position.entry_price);
        let pnl_pct = (price / position.entry_price - 1.0) * 100.0;

        Some(Trade {
            entry_bar: position.entry_bar,
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_bar: bar,
            exit_date: date,
            exit_price: price,
            size: position.size,
            pnl,
            pnl_pct,
            bars_held: bar - position.entry_bar,
        })
    }

    /// Mark-to-market equity at `price`: cash plus position value.
    ///
    /// Debug builds assert the accounting stayed sane: cash never below zero
    /// past float noise, and the marked equity finite.
    pub fn verify_equity(&self, price: f64) -> f64 {
        let position_value = self
            .position
            .as_ref()
            .map_or(0.0, |pos| pos.market_value(price));
        let equity = self.cash + position_value;

        debug_assert!(
            self.cash >= -1e-9,
            "cash negative while marking: {}",
            self.cash
        );
        debug_assert!(equity.is_finite(), "equity not finite: {equity}");

        equity
    }
}
