//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR is the simple rolling mean of True Range.
//! Lookback: period - 1 (the first row's True Range is high - low).

use super::sma::rolling_mean;
use super::{Column, Indicator};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series.
///
/// TR[0] = high[0] - low[0]: the previous-close terms are undefined and skipped.
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
/// An undefined previous close falls back to high - low as well.
pub fn true_range(candles: &[Candle]) -> Column {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if !c.high.is_finite() || !c.low.is_finite() {
                return None;
            }
            let range = c.high - c.low;
            let prev_close = i
                .checked_sub(1)
                .map(|p| candles[p].close)
                .filter(|pc| pc.is_finite());
            Some(match prev_close {
                Some(pc) => range.max((c.high - pc).abs()).max((c.low - pc).abs()),
                None => range,
            })
        })
        .collect()
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Column {
        rolling_mean(&true_range(candles), self.period)
    }
}
