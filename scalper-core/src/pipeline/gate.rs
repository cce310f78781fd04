//! Decision Gate: re-validates a transition row before any order is placed.
//!
//! Evaluation is pure: it takes one row of inputs plus the live price and
//! returns either a [`RiskDecision`], the reason the row was rejected, or
//! [`GateOutcome::NoTransition`]. Order submission and reporting happen in
//! the cycle runner.
//!
//! Buy gate (transition +1):
//!   live < buy marker, close > sma_fast > sma_slow, RSI < oversold,
//!   MACD > signal, histogram > 0, close > open, close > upper band,
//!   volume > volume MA
//!
//! Sell gate (transition -1):
//!   live > sell marker, close < sma_fast < sma_slow, RSI > overbought,
//!   MACD < signal, histogram < 0

use super::table::SeriesTable;
use crate::config::PipelineConfig;
use crate::domain::{Candle, OrderSide};
use serde::Serialize;
use std::fmt;

/// Everything the gate reads from one row of the series table.
#[derive(Debug, Clone, PartialEq)]
pub struct GateInputs {
    pub row: usize,
    pub side: Option<OrderSide>,
    /// Close above open, from [`Candle::is_bullish`].
    pub bullish: Option<bool>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub marker: Option<f64>,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub upper_band: Option<f64>,
    pub volume_ma: Option<f64>,
    pub stop_loss: Option<f64>,
}

impl GateInputs {
    /// Snapshot row `row` of the table. The marker is the buy or sell marker
    /// matching the row's transition.
    pub fn at(table: &SeriesTable, row: usize) -> Self {
        let side = table.signals.side_at(row);
        let candle = table.candles.get(row);
        let finite = |v: f64| v.is_finite().then_some(v);
        let col = |c: &[Option<f64>]| c.get(row).copied().flatten();

        let marker = match side {
            Some(OrderSide::Buy) => col(&table.signals.buy),
            Some(OrderSide::Sell) => col(&table.signals.sell),
            None => None,
        };

        Self {
            row,
            side,
            bullish: candle.and_then(Candle::is_bullish),
            close: candle.and_then(|c| finite(c.close)),
            volume: candle.and_then(|c| finite(c.volume)),
            marker,
            sma_fast: col(&table.indicators.sma_fast),
            sma_slow: col(&table.indicators.sma_slow),
            rsi: col(&table.indicators.rsi),
            macd: col(&table.indicators.macd_line),
            macd_signal: col(&table.indicators.macd_signal),
            macd_histogram: col(&table.indicators.macd_histogram),
            upper_band: col(&table.indicators.upper_band),
            volume_ma: col(&table.indicators.volume_ma),
            stop_loss: col(&table.stops.adjusted_stop_loss),
        }
    }
}

/// RSI bounds for the momentum confirmation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl From<&PipelineConfig> for GateThresholds {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            rsi_oversold: config.rsi_oversold,
            rsi_overbought: config.rsi_overbought,
        }
    }
}

/// A trade the gate approved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDecision {
    pub row: usize,
    pub side: OrderSide,
    pub live_price: f64,
    pub stop_loss: f64,
    /// |live price - adjusted stop-loss|
    pub risk: f64,
    pub quantity: f64,
    /// risk * quantity
    pub risk_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateRejection {
    /// A required input is undefined on this row.
    Undefined { field: &'static str },
    /// A gate condition evaluated false.
    Failed { condition: &'static str },
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRejection::Undefined { field } => write!(f, "{field} is undefined"),
            GateRejection::Failed { condition } => write!(f, "condition failed: {condition}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Pass(RiskDecision),
    Rejected(GateRejection),
    NoTransition,
}

impl GateOutcome {
    pub fn decision(&self) -> Option<&RiskDecision> {
        match self {
            GateOutcome::Pass(decision) => Some(decision),
            _ => None,
        }
    }
}

fn require(value: Option<f64>, field: &'static str) -> Result<f64, GateRejection> {
    value.ok_or(GateRejection::Undefined { field })
}

fn check(condition: bool, name: &'static str) -> Result<(), GateRejection> {
    if condition {
        Ok(())
    } else {
        Err(GateRejection::Failed { condition: name })
    }
}

/// Evaluate one transition row against the live price.
pub fn evaluate(
    inputs: &GateInputs,
    live_price: f64,
    quantity: f64,
    thresholds: &GateThresholds,
) -> GateOutcome {
    let Some(side) = inputs.side else {
        return GateOutcome::NoTransition;
    };
    let result = match side {
        OrderSide::Buy => buy_gate(inputs, live_price, thresholds),
        OrderSide::Sell => sell_gate(inputs, live_price, thresholds),
    }
    .and_then(|()| {
        let stop_loss = require(inputs.stop_loss, "adjusted_stop_loss")?;
        check(live_price.is_finite(), "live price is finite")?;
        Ok(stop_loss)
    });

    match result {
        Ok(stop_loss) => {
            let risk = (live_price - stop_loss).abs();
            GateOutcome::Pass(RiskDecision {
                row: inputs.row,
                side,
                live_price,
                stop_loss,
                risk,
                quantity,
                risk_amount: risk * quantity,
            })
        }
        Err(rejection) => GateOutcome::Rejected(rejection),
    }
}

fn buy_gate(inputs: &GateInputs, live: f64, t: &GateThresholds) -> Result<(), GateRejection> {
    let marker = require(inputs.marker, "buy_marker")?;
    let bullish = inputs.bullish.ok_or(GateRejection::Undefined { field: "open" })?;
    let close = require(inputs.close, "close")?;
    let volume = require(inputs.volume, "volume")?;
    let fast = require(inputs.sma_fast, "sma_fast")?;
    let slow = require(inputs.sma_slow, "sma_slow")?;
    let rsi = require(inputs.rsi, "rsi")?;
    let macd = require(inputs.macd, "macd")?;
    let signal = require(inputs.macd_signal, "macd_signal")?;
    let histogram = require(inputs.macd_histogram, "macd_histogram")?;
    let upper = require(inputs.upper_band, "upper_band")?;
    let volume_ma = require(inputs.volume_ma, "volume_ma")?;

    check(live < marker, "live < buy marker")?;
    check(close > fast && fast > slow, "close > sma_fast > sma_slow")?;
    check(rsi < t.rsi_oversold, "rsi < oversold")?;
    check(macd > signal, "macd > signal")?;
    check(histogram > 0.0, "histogram > 0")?;
    check(bullish, "bullish candle")?;
    check(close > upper, "close > upper band")?;
    check(volume > volume_ma, "volume > volume MA")
}

fn sell_gate(inputs: &GateInputs, live: f64, t: &GateThresholds) -> Result<(), GateRejection> {
    let marker = require(inputs.marker, "sell_marker")?;
    let close = require(inputs.close, "close")?;
    let fast = require(inputs.sma_fast, "sma_fast")?;
    let slow = require(inputs.sma_slow, "sma_slow")?;
    let rsi = require(inputs.rsi, "rsi")?;
    let macd = require(inputs.macd, "macd")?;
    let signal = require(inputs.macd_signal, "macd_signal")?;
    let histogram = require(inputs.macd_histogram, "macd_histogram")?;

    check(live > marker, "live > sell marker")?;
    check(close < fast && fast < slow, "close < sma_fast < sma_slow")?;
    check(rsi > t.rsi_overbought, "rsi > overbought")?;
    check(macd < signal, "macd < signal")?;
    check(histogram < 0.0, "histogram < 0")
}
