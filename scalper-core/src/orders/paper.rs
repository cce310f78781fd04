//! Paper broker: fills every valid market order in full and keeps a record.

use super::{validate_order, OrderError, OrderGateway};
use crate::domain::{OrderConfirmation, OrderSide};
use chrono::Utc;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Default)]
pub struct PaperBroker {
    orders: Mutex<Vec<OrderConfirmation>>,
}

impl PaperBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every order accepted so far, in submission order.
    pub fn orders(&self) -> Vec<OrderConfirmation> {
        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl OrderGateway for PaperBroker {
    fn name(&self) -> &str {
        "paper"
    }

    fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<OrderConfirmation, OrderError> {
        validate_order(symbol, quantity)?;

        let mut orders = self
            .orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let confirmation = OrderConfirmation {
            order_id: orders.len() as u64 + 1,
            symbol: symbol.to_string(),
            side,
            requested_quantity: quantity,
            executed_quantity: quantity,
            status: "FILLED".into(),
            transact_time: Utc::now(),
        };
        orders.push(confirmation.clone());

        info!(
            order_id = confirmation.order_id,
            symbol,
            side = %side,
            quantity,
            "paper order filled"
        );
        Ok(confirmation)
    }
}
