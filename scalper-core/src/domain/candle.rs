//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol over one interval.
///
/// The core five fields drive the pipeline. The kline extras (close time,
/// quote volume, trade count, taker-buy volumes) are carried through from the
/// exchange for the liquidity check and the series dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
    pub quote_volume: f64,
    pub trade_count: u64,
    pub taker_buy_base_volume: f64,
    pub taker_buy_quote_volume: f64,
}

impl Candle {
    /// Build a candle from plain OHLCV. Kline extras are zeroed and the close
    /// time equals the open time.
    pub fn from_ohlcv(
        open_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time: open_time,
            quote_volume: 0.0,
            trade_count: 0,
            taker_buy_base_volume: 0.0,
            taker_buy_quote_volume: 0.0,
        }
    }

    /// Close above open; `None` when either price is not finite.
    pub fn is_bullish(&self) -> Option<bool> {
        (self.open.is_finite() && self.close.is_finite()).then(|| self.close > self.open)
    }
}
