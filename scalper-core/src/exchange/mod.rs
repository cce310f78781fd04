//! Exchange connectivity.

pub mod binance;
pub mod signer;

pub use binance::{AccountSummary, Balance, BinanceClient, MAINNET_URL, TESTNET_URL};
