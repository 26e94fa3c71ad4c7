//! Domain types shared across the engine.

pub mod bar;
pub mod position;
pub mod snapshot;
pub mod trade;

pub use bar::Bar;
pub use position::OpenPosition;
pub use snapshot::IndicatorSnapshot;
pub use trade::Trade;
