//! Market data sources and the liquidity check.

pub mod liquidity;
pub mod provider;
pub mod synthetic;

pub use liquidity::{check_liquidity, summarize_liquidity, LiquidityReport, DEFAULT_LIQUIDITY_CANDLES};
pub use provider::{DataError, MarketData};
pub use synthetic::SyntheticMarket;
