//! Factor Calculator: liquidity, volume and trend weights per candle.
//!
//! Each factor is a fraction used to scale down the raw Chandelier stop:
//! - liquidity = 1 - (high - low) / close
//! - volume = volume / total volume of the loaded window
//! - trend = RSI/100 when RSI > 50, else 1 - RSI/100 (Wilder RSI)
//!
//! The volume factor depends on the whole window, not a rolling measure.

use crate::config::PipelineConfig;
use crate::domain::Candle;
use crate::indicators::{Column, Indicator, WilderRsi};

/// The three factor columns, aligned with the candles.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorColumns {
    pub liquidity: Column,
    pub volume: Column,
    pub trend: Column,
}

pub fn calculate_factors(candles: &[Candle], config: &PipelineConfig) -> FactorColumns {
    let liquidity = candles
        .iter()
        .map(|c| {
            let spread = c.high - c.low;
            let factor = 1.0 - spread / c.close;
            (c.close != 0.0 && factor.is_finite()).then_some(factor)
        })
        .collect();

    let total_volume: f64 = candles.iter().map(|c| c.volume).sum();
    let volume = candles
        .iter()
        .map(|c| {
            let factor = c.volume / total_volume;
            (total_volume != 0.0 && factor.is_finite()).then_some(factor)
        })
        .collect();

    let trend = WilderRsi::new(config.trend_rsi_period)
        .compute(candles)
        .into_iter()
        .map(|rsi| rsi.map(trend_factor))
        .collect();

    FactorColumns {
        liquidity,
        volume,
        trend,
    }
}

/// Map an RSI reading to a trend weight in [0.5, 1].
pub fn trend_factor(rsi: f64) -> f64 {
    if rsi > 50.0 {
        rsi / 100.0
    } else {
        1.0 - rsi / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, assert_defined, make_ohlc_candles, DEFAULT_EPSILON};

    #[test]
    fn liquidity_factor_from_spread() {
        let candles = make_ohlc_candles(&[(100.0, 105.0, 95.0, 100.0), (100.0, 101.0, 99.0, 50.0)]);
        let factors = calculate_factors(&candles, &PipelineConfig::default());
        assert_defined(factors.liquidity[0], 0.9, DEFAULT_EPSILON); // 1 - 10/100
        assert_defined(factors.liquidity[1], 0.96, DEFAULT_EPSILON); // 1 - 2/50
    }

    #[test]
    fn liquidity_undefined_for_zero_close() {
        let candles = make_ohlc_candles(&[(1.0, 2.0, 0.0, 0.0)]);
        let factors = calculate_factors(&candles, &PipelineConfig::default());
        assert!(factors.liquidity[0].is_none());
    }

    #[test]
    fn volume_factor_is_share_of_window_total() {
        let mut candles = make_ohlc_candles(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 11.0, 9.0, 10.0),
        ]);
        candles[0].volume = 100.0;
        candles[1].volume = 300.0;
        candles[2].volume = 600.0;
        let factors = calculate_factors(&candles, &PipelineConfig::default());
        assert_defined(factors.volume[0], 0.1, DEFAULT_EPSILON);
        assert_defined(factors.volume[1], 0.3, DEFAULT_EPSILON);
        assert_defined(factors.volume[2], 0.6, DEFAULT_EPSILON);
        let sum: f64 = factors.volume.iter().map(|v| v.unwrap()).sum();
        assert_approx(sum, 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn volume_factor_undefined_when_window_has_no_volume() {
        let mut candles = make_ohlc_candles(&[(10.0, 11.0, 9.0, 10.0), (10.0, 11.0, 9.0, 10.0)]);
        for c in &mut candles {
            c.volume = 0.0;
        }
        let factors = calculate_factors(&candles, &PipelineConfig::default());
        assert!(factors.volume.iter().all(|v| v.is_none()));
    }

    #[test]
    fn trend_factor_is_symmetric_around_50() {
        assert_approx(trend_factor(80.0), 0.8, DEFAULT_EPSILON);
        assert_approx(trend_factor(20.0), 0.8, DEFAULT_EPSILON);
        assert_approx(trend_factor(50.0), 0.5, DEFAULT_EPSILON);
        assert_approx(trend_factor(100.0), 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn trend_factor_undefined_during_rsi_warmup() {
        let data: Vec<(f64, f64, f64, f64)> = (0..20)
            .map(|i| {
                let c = 100.0 + i as f64;
                (c, c + 1.0, c - 1.0, c)
            })
            .collect();
        let candles = make_ohlc_candles(&data);
        let factors = calculate_factors(&candles, &PipelineConfig::default());
        for i in 0..14 {
            assert!(factors.trend[i].is_none(), "row {i} should be undefined");
        }
        // Rising closes: Wilder RSI = 100 → factor 1.0
        assert_defined(factors.trend[14], 1.0, DEFAULT_EPSILON);
    }
}
