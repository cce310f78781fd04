//! Scalper Core: signal/risk pipeline, market data, order routing, reporting.
//!
//! This crate contains everything a trading cycle needs:
//! - Domain types (candles, intervals, order sides and confirmations)
//! - Indicator primitives (SMA, EMA, RSI, MACD, ATR, Donchian, Bollinger)
//! - The pipeline: factors, stop-loss, indicators, crossover signals, decision gate
//! - Market data and order gateway traits with exchange, synthetic and paper implementations
//! - TOML configuration, text/CSV reporting and the cycle runner

pub mod config;
pub mod cycle;
pub mod data;
pub mod domain;
pub mod exchange;
pub mod indicators;
pub mod orders;
pub mod pipeline;
pub mod report;

pub use config::{Credentials, TraderConfig};
pub use cycle::{run_cycle, CycleError, CycleReport};
pub use pipeline::SeriesTable;
