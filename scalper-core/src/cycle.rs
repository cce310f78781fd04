//! One trading cycle: load candles, build the series table, write the
//! reporting artifacts, then gate every transition row and submit the orders
//! that pass.
//!
//! Any collaborator failure aborts the cycle. Nothing is retried.

use crate::config::{ConfigError, TraderConfig};
use crate::data::{DataError, MarketData};
use crate::domain::{OrderConfirmation, OrderSide};
use crate::orders::{OrderError, OrderGateway};
use crate::pipeline::{
    evaluate, warm_up_rows, GateInputs, GateOutcome, GateThresholds, RiskDecision, SeriesTable,
};
use crate::report::{self, ReportError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("no candles returned for {symbol}")]
    NoCandles { symbol: String },
}

/// A transition row the gate turned down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub side: OrderSide,
    pub live_price: f64,
    pub reason: String,
}

/// An approved decision and the gateway's acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutedOrder {
    pub decision: RiskDecision,
    pub confirmation: OrderConfirmation,
}

/// What a cycle did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub symbol: String,
    pub market: String,
    pub gateway: String,
    pub candles: usize,
    pub transitions: usize,
    pub rejected: Vec<RejectedRow>,
    pub orders: Vec<ExecutedOrder>,
}

impl CycleReport {
    pub fn is_idle(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Fetch the configured lookback window and run every pipeline stage.
pub fn build_table(
    market: &dyn MarketData,
    config: &TraderConfig,
) -> Result<SeriesTable, CycleError> {
    let symbol = &config.market.symbol;
    let candles = market.candles(symbol, config.market.interval, config.market.lookback())?;
    if candles.is_empty() {
        return Err(CycleError::NoCandles {
            symbol: symbol.clone(),
        });
    }
    info!(
        symbol = %symbol,
        source = market.name(),
        candles = candles.len(),
        "building series table"
    );
    let warm_up = warm_up_rows(&config.pipeline);
    if candles.len() <= warm_up {
        warn!(
            symbol = %symbol,
            candles = candles.len(),
            warm_up,
            "window too short for the gate: every row is still warming up"
        );
    }
    Ok(SeriesTable::build(symbol, candles, &config.pipeline))
}

/// Write the text dump and, when configured, the CSV export.
pub fn write_reports(table: &SeriesTable, config: &TraderConfig) -> Result<(), CycleError> {
    report::write_text(table, &config.report.output_path)?;
    info!(path = %config.report.output_path.display(), "wrote series dump");
    if let Some(csv_path) = &config.report.csv_path {
        report::write_csv(table, csv_path)?;
        info!(path = %csv_path.display(), "wrote series CSV");
    }
    Ok(())
}

/// Gate every transition row against a freshly fetched live price and submit
/// the approved orders.
pub fn execute_decisions(
    table: &SeriesTable,
    market: &dyn MarketData,
    gateway: &dyn OrderGateway,
    config: &TraderConfig,
) -> Result<CycleReport, CycleError> {
    let thresholds = GateThresholds::from(&config.pipeline);
    let quantity = config.trade.quantity;
    let transitions = table.transition_rows();

    let mut rejected = Vec::new();
    let mut orders = Vec::new();

    for &(row, side) in &transitions {
        let live_price = market.live_price(&table.symbol)?;
        let inputs = GateInputs::at(table, row);

        match evaluate(&inputs, live_price, quantity, &thresholds) {
            GateOutcome::Pass(decision) => {
                info!("{}", report::decision_summary(&table.symbol, &decision));
                let confirmation =
                    gateway.submit_market_order(&table.symbol, decision.side, decision.quantity)?;
                info!(
                    order_id = confirmation.order_id,
                    status = %confirmation.status,
                    gateway = gateway.name(),
                    "order accepted"
                );
                orders.push(ExecutedOrder {
                    decision,
                    confirmation,
                });
            }
            GateOutcome::Rejected(reason) => {
                debug!(row, side = %side, live_price, %reason, "transition rejected");
                rejected.push(RejectedRow {
                    row,
                    side,
                    live_price,
                    reason: reason.to_string(),
                });
            }
            GateOutcome::NoTransition => {}
        }
    }

    if orders.is_empty() {
        info!(
            symbol = %table.symbol,
            transitions = transitions.len(),
            "no action required"
        );
    }

    Ok(CycleReport {
        symbol: table.symbol.clone(),
        market: market.name().to_string(),
        gateway: gateway.name().to_string(),
        candles: table.len(),
        transitions: transitions.len(),
        rejected,
        orders,
    })
}

/// Build, report, decide. Returns the table alongside the report so callers
/// can chart it.
pub fn run_cycle(
    market: &dyn MarketData,
    gateway: &dyn OrderGateway,
    config: &TraderConfig,
) -> Result<(SeriesTable, CycleReport), CycleError> {
    config.validate()?;
    let table = build_table(market, config)?;
    write_reports(&table, config)?;
    let report = execute_decisions(&table, market, gateway, config)?;
    Ok((table, report))
}
