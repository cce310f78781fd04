//! Stop-Loss Calculator: ATR, Chandelier exits and the factor-adjusted stop.
//!
//! long_exit  = highest_high(period) - ATR * multiplier
//! short_exit = lowest_low(period)  + ATR * multiplier
//! adjusted   = long_exit * (1 - liquidity) * (1 - volume) * trend
//!
//! The adjustment chain is applied in that order, one factor at a time, so the
//! floating-point result is reproducible. The short exit is not adjusted.

use super::factors::FactorColumns;
use crate::config::PipelineConfig;
use crate::domain::Candle;
use crate::indicators::{Atr, Column, Donchian, Indicator};

/// ATR, raw exits and the adjusted stop, aligned with the candles.
#[derive(Debug, Clone, PartialEq)]
pub struct StopLossColumns {
    pub atr: Column,
    pub long_exit: Column,
    pub short_exit: Column,
    pub adjusted_stop_loss: Column,
}

pub fn calculate_stop_loss(
    candles: &[Candle],
    factors: &FactorColumns,
    config: &PipelineConfig,
) -> StopLossColumns {
    let period = config.atr_period;
    let multiplier = config.atr_multiplier;

    let atr = Atr::new(period).compute(candles);
    let highest = Donchian::upper(period).compute(candles);
    let lowest = Donchian::lower(period).compute(candles);

    let long_exit: Column = highest
        .iter()
        .zip(&atr)
        .map(|(h, a)| Some((*h)? - (*a)? * multiplier))
        .collect();
    let short_exit: Column = lowest
        .iter()
        .zip(&atr)
        .map(|(l, a)| Some((*l)? + (*a)? * multiplier))
        .collect();

    let adjusted_stop_loss = (0..candles.len())
        .map(|i| {
            Some(adjust_stop(
                long_exit[i]?,
                factors.liquidity[i]?,
                factors.volume[i]?,
                factors.trend[i]?,
            ))
        })
        .collect();

    StopLossColumns {
        atr,
        long_exit,
        short_exit,
        adjusted_stop_loss,
    }
}

/// Scale a long exit by the three factors, in liquidity → volume → trend order.
pub fn adjust_stop(long_exit: f64, liquidity: f64, volume: f64, trend: f64) -> f64 {
    let mut stop = long_exit * (1.0 - liquidity);
    stop *= 1.0 - volume;
    stop *= trend;
    stop
}
