//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window.
//! Lookback: period - 1 (first defined value at index period-1).

use super::{Column, Indicator, Source};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: Source,
    name: String,
}

impl Sma {
    /// SMA of close prices.
    pub fn new(period: usize) -> Self {
        Self::of(Source::Close, period)
    }

    /// SMA of an arbitrary candle field (e.g. volume).
    pub fn of(source: Source, period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        let name = match source {
            Source::Close => format!("sma_{period}"),
            other => format!("{}_sma_{period}", other.prefix()),
        };
        Self {
            period,
            source,
            name,
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Column {
        rolling_mean(&self.source.extract(candles), self.period)
    }
}

/// Rolling mean of a column. A window containing `None` yields `None`.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Column {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        result[i] = window
            .iter()
            .copied()
            .sum::<Option<f64>>()
            .map(|sum| sum / period as f64);
    }

    result
}
