//! Run configuration, loaded from TOML.
//!
//! Every section is optional and falls back to the defaults below. Exchange
//! credentials are never read from the file; see [`Credentials::from_env`].

use crate::domain::Interval;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_VAR: &str = "BINANCE_API_KEY";
pub const API_SECRET_VAR: &str = "BINANCE_API_SECRET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("missing credentials: set BINANCE_API_KEY and BINANCE_API_SECRET")]
    MissingCredentials,
}

/// Complete configuration for one trading cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraderConfig {
    pub market: MarketConfig,
    pub trade: TradeConfig,
    pub pipeline: PipelineConfig,
    pub report: ReportConfig,
}

/// Longest history a cycle may load: one year.
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 365;

/// Which pair to trade and how much history to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub symbol: String,
    pub interval: Interval,
    pub lookback_hours: i64,
    pub testnet: bool,
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".into(),
            interval: Interval::OneHour,
            lookback_hours: 24 * 7,
            testnet: true,
            timeout_secs: 10,
        }
    }
}

impl MarketConfig {
    /// History window, clamped to `1..=MAX_LOOKBACK_HOURS` hours.
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookback_hours.clamp(1, MAX_LOOKBACK_HOURS))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Order sizing and routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Fixed base-asset quantity for every market order.
    pub quantity: f64,
    /// Route orders to the paper broker instead of the exchange.
    pub dry_run: bool,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            quantity: 0.001,
            dry_run: true,
        }
    }
}

/// Indicator windows and gate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub atr_period: usize,
    pub atr_multiplier: f64,
    pub trend_rsi_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub volume_ma_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            atr_multiplier: 3.0,
            trend_rsi_period: 14,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            sma_fast: 5,
            sma_slow: 15,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            volume_ma_period: 20,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("atr_period", self.atr_period),
            ("trend_rsi_period", self.trend_rsi_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("sma_fast", self.sma_fast),
            ("sma_slow", self.sma_slow),
            ("bollinger_period", self.bollinger_period),
            ("volume_ma_period", self.volume_ma_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be >= 1")));
            }
        }
        if self.sma_slow <= self.sma_fast {
            return Err(ConfigError::Invalid(
                "sma_slow must be greater than sma_fast".into(),
            ));
        }
        if self.macd_slow <= self.macd_fast {
            return Err(ConfigError::Invalid(
                "macd_slow must be greater than macd_fast".into(),
            ));
        }
        if !is_positive(self.atr_multiplier) || !is_positive(self.bollinger_multiplier) {
            return Err(ConfigError::Invalid("multipliers must be positive".into()));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
        {
            return Err(ConfigError::Invalid(
                "RSI thresholds must lie in [0, 100]".into(),
            ));
        }
        Ok(())
    }
}

/// Where the reporting artifacts go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    pub csv_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.txt"),
            csv_path: None,
        }
    }
}

impl TraderConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("market.symbol must not be empty".into()));
        }
        if self.market.lookback_hours <= 0 {
            return Err(ConfigError::Invalid(
                "market.lookback_hours must be positive".into(),
            ));
        }
        if self.market.lookback_hours > MAX_LOOKBACK_HOURS {
            return Err(ConfigError::Invalid(format!(
                "market.lookback_hours must be at most {MAX_LOOKBACK_HOURS}"
            )));
        }
        if self.market.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "market.timeout_secs must be positive".into(),
            ));
        }
        if !is_positive(self.trade.quantity) {
            return Err(ConfigError::Invalid("trade.quantity must be positive".into()));
        }
        self.pipeline.validate()
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Exchange API credentials.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    /// Read `BINANCE_API_KEY` / `BINANCE_API_SECRET`. Empty values count as missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        match (read(API_KEY_VAR), read(API_SECRET_VAR)) {
            (Some(api_key), Some(api_secret)) => Ok(Self {
                api_key,
                api_secret,
            }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
