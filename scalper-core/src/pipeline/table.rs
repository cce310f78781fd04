//! Series Table: candles plus every derived column, assembled once per run.
//!
//! Each stage contributes its own column group; the table owns them all and is
//! never mutated after [`SeriesTable::build`] returns.

use super::crossover::{generate_signals, SignalColumns};
use super::factors::{calculate_factors, FactorColumns};
use super::momentum::{calculate_indicators, IndicatorColumns};
use super::stop_loss::{calculate_stop_loss, StopLossColumns};
use crate::config::PipelineConfig;
use crate::domain::{Candle, OrderSide};
use crate::indicators::{Atr, Bollinger, Column, Donchian, Indicator, Rsi, Sma, Source, WilderRsi};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub symbol: String,
    pub candles: Vec<Candle>,
    pub factors: FactorColumns,
    pub stops: StopLossColumns,
    pub indicators: IndicatorColumns,
    pub signals: SignalColumns,
}

impl SeriesTable {
    /// Run every pipeline stage over `candles`.
    pub fn build(symbol: &str, candles: Vec<Candle>, config: &PipelineConfig) -> Self {
        let factors = calculate_factors(&candles, config);
        let stops = calculate_stop_loss(&candles, &factors, config);
        let indicators = calculate_indicators(&candles, config);
        let signals = generate_signals(&candles, &indicators);

        Self {
            symbol: symbol.to_string(),
            candles,
            factors,
            stops,
            indicators,
            signals,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Rows with a non-zero position transition, in chronological order.
    pub fn transition_rows(&self) -> Vec<(usize, OrderSide)> {
        (0..self.len())
            .filter_map(|row| self.signals.side_at(row).map(|side| (row, side)))
            .collect()
    }

    /// Every numeric derived column with its export name.
    pub fn named_columns(&self) -> Vec<(&'static str, &Column)> {
        vec![
            ("atr", &self.stops.atr),
            ("liquidity_factor", &self.factors.liquidity),
            ("volume_factor", &self.factors.volume),
            ("trend_factor", &self.factors.trend),
            ("long_exit", &self.stops.long_exit),
            ("short_exit", &self.stops.short_exit),
            ("adjusted_stop_loss", &self.stops.adjusted_stop_loss),
            ("sma_fast", &self.indicators.sma_fast),
            ("sma_slow", &self.indicators.sma_slow),
            ("rsi", &self.indicators.rsi),
            ("macd", &self.indicators.macd_line),
            ("macd_signal", &self.indicators.macd_signal),
            ("macd_histogram", &self.indicators.macd_histogram),
            ("upper_band", &self.indicators.upper_band),
            ("volume_ma", &self.indicators.volume_ma),
            ("buy", &self.signals.buy),
            ("sell", &self.signals.sell),
        ]
    }

    /// Flattened view of one row.
    pub fn row(&self, row: usize) -> Option<SeriesRow> {
        let candle = self.candles.get(row)?;
        Some(SeriesRow {
            open_time: candle.open_time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            atr: self.stops.atr[row],
            liquidity_factor: self.factors.liquidity[row],
            volume_factor: self.factors.volume[row],
            trend_factor: self.factors.trend[row],
            long_exit: self.stops.long_exit[row],
            short_exit: self.stops.short_exit[row],
            adjusted_stop_loss: self.stops.adjusted_stop_loss[row],
            sma_fast: self.indicators.sma_fast[row],
            sma_slow: self.indicators.sma_slow[row],
            rsi: self.indicators.rsi[row],
            macd: self.indicators.macd_line[row],
            macd_signal: self.indicators.macd_signal[row],
            macd_histogram: self.indicators.macd_histogram[row],
            upper_band: self.indicators.upper_band[row],
            volume_ma: self.indicators.volume_ma[row],
            signal: self.signals.signal[row],
            position: self.signals.transition[row],
            buy: self.signals.buy[row],
            sell: self.signals.sell[row],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = SeriesRow> + '_ {
        (0..self.len()).filter_map(|row| self.row(row))
    }
}

/// First row at which every column the decision gate reads is defined.
///
/// MACD is seeded on the first close and never delays it.
pub fn warm_up_rows(config: &PipelineConfig) -> usize {
    let indicators: [Box<dyn Indicator>; 8] = [
        Box::new(Atr::new(config.atr_period)),
        Box::new(Donchian::upper(config.atr_period)),
        Box::new(WilderRsi::new(config.trend_rsi_period)),
        Box::new(Rsi::new(config.rsi_period)),
        Box::new(Sma::new(config.sma_fast)),
        Box::new(Sma::new(config.sma_slow)),
        Box::new(Bollinger::upper(config.bollinger_period, config.bollinger_multiplier)),
        Box::new(Sma::of(Source::Volume, config.volume_ma_period)),
    ];
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

/// One row of the table, as written to the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub atr: Option<f64>,
    pub liquidity_factor: Option<f64>,
    pub volume_factor: Option<f64>,
    pub trend_factor: Option<f64>,
    pub long_exit: Option<f64>,
    pub short_exit: Option<f64>,
    pub adjusted_stop_loss: Option<f64>,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub upper_band: Option<f64>,
    pub volume_ma: Option<f64>,
    pub signal: u8,
    pub position: Option<i8>,
    pub buy: Option<f64>,
    pub sell: Option<f64>,
}
