//! Order submission.
//!
//! The decision gate never talks to an exchange directly; the cycle runner
//! hands approved decisions to an [`OrderGateway`].

pub mod paper;

pub use paper::PaperBroker;

use crate::domain::{OrderConfirmation, OrderSide};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("order rejected by exchange ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("unexpected order response: {0}")]
    ResponseFormatChanged(String),
}

/// Places market orders for a symbol.
pub trait OrderGateway: Send + Sync {
    fn name(&self) -> &str;

    fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<OrderConfirmation, OrderError>;
}

/// Reject orders that can never be valid before they leave the process.
pub fn validate_order(symbol: &str, quantity: f64) -> Result<(), OrderError> {
    if symbol.trim().is_empty() {
        return Err(OrderError::InvalidOrder("symbol must not be empty".into()));
    }
    if !(quantity.is_finite() && quantity > 0.0) {
        return Err(OrderError::InvalidOrder(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_orders() {
        assert!(validate_order("BTCUSDT", 0.01).is_ok());
        assert!(matches!(validate_order("", 0.01), Err(OrderError::InvalidOrder(_))));
        assert!(matches!(validate_order("BTCUSDT", 0.0), Err(OrderError::InvalidOrder(_))));
        assert!(matches!(
            validate_order("BTCUSDT", f64::NAN),
            Err(OrderError::InvalidOrder(_))
        ));
    }
}
