//! Market data trait and structured error types.
//!
//! The MarketData trait abstracts over candle sources (the exchange REST API,
//! the synthetic random walk) so the cycle runner can swap them and tests can
//! inject fixtures.

use crate::domain::{Candle, Interval};
use thiserror::Error;

/// Structured error types for market data operations.
///
/// Displayable as-is in the CLI.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("rate limited by exchange (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("exchange rejected request ({code}): {message}")]
    Exchange { code: i64, message: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Source of candles and live prices for one exchange.
pub trait MarketData: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Candles covering `lookback` up to now, oldest first.
    fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: chrono::Duration,
    ) -> Result<Vec<Candle>, DataError>;

    /// The most recent `limit` candles, oldest first.
    fn recent_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError>;

    /// Current traded price.
    fn live_price(&self, symbol: &str) -> Result<f64, DataError>;
}
