//! Indicator Calculator: the oscillators and averages the signal and gate read.
//!
//! Computed once per run. Every indicator here is causal, so indexing a row
//! of these columns gives the same value as recomputing over the prefix that
//! ends at that row.

use crate::config::PipelineConfig;
use crate::domain::Candle;
use crate::indicators::{Bollinger, Column, Indicator, Macd, Rsi, Sma, Source};

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumns {
    pub sma_fast: Column,
    pub sma_slow: Column,
    pub rsi: Column,
    pub macd_line: Column,
    pub macd_signal: Column,
    pub macd_histogram: Column,
    pub upper_band: Column,
    pub volume_ma: Column,
}

pub fn calculate_indicators(candles: &[Candle], config: &PipelineConfig) -> IndicatorColumns {
    let macd = Macd::new(config.macd_fast, config.macd_slow, config.macd_signal).compute(candles);

    IndicatorColumns {
        sma_fast: Sma::new(config.sma_fast).compute(candles),
        sma_slow: Sma::new(config.sma_slow).compute(candles),
        rsi: Rsi::new(config.rsi_period).compute(candles),
        macd_line: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        upper_band: Bollinger::upper(config.bollinger_period, config.bollinger_multiplier)
            .compute(candles),
        volume_ma: Sma::of(Source::Volume, config.volume_ma_period).compute(candles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.4).sin() * 8.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn columns_are_aligned_with_candles() {
        let candles = make_candles(&wave(40));
        let ind = calculate_indicators(&candles, &PipelineConfig::default());
        for col in [
            &ind.sma_fast,
            &ind.sma_slow,
            &ind.rsi,
            &ind.macd_line,
            &ind.macd_signal,
            &ind.macd_histogram,
            &ind.upper_band,
            &ind.volume_ma,
        ] {
            assert_eq!(col.len(), 40);
        }
    }

    #[test]
    fn warmup_rows_follow_windows() {
        let candles = make_candles(&wave(40));
        let ind = calculate_indicators(&candles, &PipelineConfig::default());
        assert!(ind.sma_fast[3].is_none() && ind.sma_fast[4].is_some());
        assert!(ind.sma_slow[13].is_none() && ind.sma_slow[14].is_some());
        assert!(ind.rsi[12].is_none() && ind.rsi[13].is_some());
        assert!(ind.upper_band[18].is_none() && ind.upper_band[19].is_some());
        assert!(ind.macd_line[0].is_some());
    }

    #[test]
    fn prefix_values_match_full_series() {
        let closes = wave(45);
        let full = calculate_indicators(&make_candles(&closes), &PipelineConfig::default());
        for end in [20, 30, 44] {
            let prefix =
                calculate_indicators(&make_candles(&closes[..=end]), &PipelineConfig::default());
            assert_eq!(prefix.rsi[end], full.rsi[end]);
            assert_eq!(prefix.macd_line[end], full.macd_line[end]);
            assert_eq!(prefix.macd_signal[end], full.macd_signal[end]);
            assert_eq!(prefix.macd_histogram[end], full.macd_histogram[end]);
        }
    }
}
