//! Order side and exchange order confirmations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire name used by the exchange (`BUY` / `SELL`).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    /// Position label reported to the operator.
    pub fn position_label(&self) -> &'static str {
        match self {
            OrderSide::Buy => "LONG",
            OrderSide::Sell => "SHORT",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement returned by an order gateway for an accepted market order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: u64,
    pub symbol: String,
    pub side: OrderSide,
    pub requested_quantity: f64,
    pub executed_quantity: f64,
    pub status: String,
    pub transact_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_wire_names() {
        assert_eq!(OrderSide::Buy.as_str(), "BUY");
        assert_eq!(OrderSide::Sell.to_string(), "SELL");
        assert_eq!(OrderSide::Buy.position_label(), "LONG");
        assert_eq!(OrderSide::Sell.position_label(), "SHORT");
    }

    #[test]
    fn side_serializes_uppercase() {
        let json = serde_json::to_string(&OrderSide::Sell).unwrap();
        assert_eq!(json, "\"SELL\"");
    }
}
