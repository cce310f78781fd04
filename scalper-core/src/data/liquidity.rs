//! Short-horizon liquidity check on the most recent one-minute candles.
//!
//! A liquidity sweep is a volume burst above the window average while taker
//! buyers dominate (taker-buy ratio above 0.5).

use super::provider::{DataError, MarketData};
use crate::domain::{Candle, Interval};
use serde::Serialize;

pub const DEFAULT_LIQUIDITY_CANDLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidityReport {
    pub candles: usize,
    pub average_volume: f64,
    pub last_volume: f64,
    pub volume_change: f64,
    /// Summed taker-buy base volume over summed taker-buy quote volume.
    /// `None` when no quote volume was traded.
    pub taker_buy_ratio: Option<f64>,
    pub liquidity_sweep: bool,
}

/// Fetch the last `count` one-minute candles and summarise them.
pub fn check_liquidity(
    market: &dyn MarketData,
    symbol: &str,
    count: usize,
) -> Result<LiquidityReport, DataError> {
    let candles = market.recent_candles(symbol, Interval::OneMinute, count)?;
    summarize_liquidity(&candles).ok_or_else(|| DataError::SymbolNotFound {
        symbol: symbol.to_string(),
    })
}

/// Liquidity metrics over a candle window. `None` for an empty window.
pub fn summarize_liquidity(candles: &[Candle]) -> Option<LiquidityReport> {
    let last_volume = candles.last()?.volume;
    let average_volume = candles.iter().map(|c| c.volume).sum::<f64>() / candles.len() as f64;

    let taker_base: f64 = candles.iter().map(|c| c.taker_buy_base_volume).sum();
    let taker_quote: f64 = candles.iter().map(|c| c.taker_buy_quote_volume).sum();
    let taker_buy_ratio = (taker_quote != 0.0).then(|| taker_base / taker_quote);

    let liquidity_sweep =
        last_volume > average_volume && taker_buy_ratio.is_some_and(|ratio| ratio > 0.5);

    Some(LiquidityReport {
        candles: candles.len(),
        average_volume,
        last_volume,
        volume_change: last_volume - average_volume,
        taker_buy_ratio,
        liquidity_sweep,
    })
}
