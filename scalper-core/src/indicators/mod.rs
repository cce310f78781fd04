//! Indicator primitives.
//!
//! Every indicator maps a candle series to a `Column` of the same length.
//! Rows without enough history hold `None`; a non-finite input value makes
//! every window that contains it `None` as well.
//!
//! Donchian is exposed as separate named instances per band; Bollinger only
//! as its upper band. MACD produces three aligned columns at once and lives
//! outside the single-series trait, on top of [`ewm`].

pub mod atr;
pub mod bollinger;
pub mod donchian;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::{true_range, Atr};
pub use bollinger::Bollinger;
pub use donchian::{rolling_max, rolling_min, Donchian, DonchianBand};
pub use ema::ewm;
pub use macd::{Macd, MacdSeries};
pub use rsi::{Rsi, WilderRsi};
pub use sma::{rolling_mean, Sma};

use crate::domain::Candle;

/// A derived per-row series. `None` marks an undefined row.
pub type Column = Vec<Option<f64>>;

/// Trait for single-series indicators.
///
/// # Look-ahead contamination guard
/// No value at row t may depend on candle t+1 or later. Every indicator must
/// pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_5", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading rows that are always `None`.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole candle series.
    fn compute(&self, candles: &[Candle]) -> Column;
}

/// Candle field an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    High,
    Low,
    Close,
    Volume,
}

impl Source {
    pub fn prefix(&self) -> &'static str {
        match self {
            Source::High => "high",
            Source::Low => "low",
            Source::Close => "close",
            Source::Volume => "volume",
        }
    }

    /// Extract the field as a column; non-finite values become `None`.
    pub fn extract(&self, candles: &[Candle]) -> Column {
        candles
            .iter()
            .map(|c| {
                let v = match self {
                    Source::High => c.high,
                    Source::Low => c.low,
                    Source::Close => c.close,
                    Source::Volume => c.volume,
                };
                v.is_finite().then_some(v)
            })
            .collect()
    }
}

/// Create synthetic hourly candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::from_ohlcv(
                base + chrono::Duration::hours(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Create hourly candles from (open, high, low, close) tuples, volume = 1000.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Candle::from_ohlcv(
                base + chrono::Duration::hours(i as i64),
                open,
                high,
                low,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Assert a column entry is defined and approximately equal to `expected`.
#[cfg(test)]
pub fn assert_defined(actual: Option<f64>, expected: f64, epsilon: f64) {
    match actual {
        Some(v) => assert_approx(v, expected, epsilon),
        None => panic!("expected Some({expected}), got None"),
    }
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_maps_nan_to_none() {
        let mut candles = make_candles(&[10.0, 11.0, 12.0]);
        candles[1].close = f64::NAN;
        let closes = Source::Close.extract(&candles);
        assert_eq!(closes, vec![Some(10.0), None, Some(12.0)]);
    }

    #[test]
    fn extract_volume() {
        let candles = make_candles(&[10.0, 11.0]);
        assert_eq!(Source::Volume.extract(&candles), vec![Some(1000.0), Some(1000.0)]);
    }
}
