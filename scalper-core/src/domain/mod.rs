//! Domain types: candles, intervals, order sides, order confirmations.

pub mod candle;
pub mod interval;
pub mod order;

pub use candle::Candle;
pub use interval::Interval;
pub use order::{OrderConfirmation, OrderSide};

/// Symbol type alias
pub type Symbol = String;
