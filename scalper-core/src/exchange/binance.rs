//! Binance spot REST client.
//!
//! Public endpoints (klines, ticker price) need no credentials. Account and
//! order endpoints are signed: the query string carries `timestamp` and
//! `recvWindow`, its HMAC-SHA256 is appended as `signature`, and the API key
//! travels in the `X-MBX-APIKEY` header.
//!
//! Every request uses the client-wide timeout. Failures are returned to the
//! caller as-is; there is no retry.

use super::signer;
use crate::config::{Credentials, MarketConfig};
use crate::data::{DataError, MarketData};
use crate::domain::{Candle, Interval, OrderConfirmation, OrderSide};
use crate::orders::{validate_order, OrderError, OrderGateway};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const MAINNET_URL: &str = "https://api.binance.com";
pub const TESTNET_URL: &str = "https://testnet.binance.vision";

/// Exchange cap on klines per request.
const KLINE_PAGE_LIMIT: usize = 1000;
const RECV_WINDOW_MS: u64 = 5000;

/// One kline row as the exchange sends it.
#[derive(Debug, Deserialize)]
struct KlineRow(
    i64,               // open time (ms)
    String,            // open
    String,            // high
    String,            // low
    String,            // close
    String,            // volume
    i64,               // close time (ms)
    String,            // quote asset volume
    u64,               // number of trades
    String,            // taker buy base volume
    String,            // taker buy quote volume
    serde_json::Value, // ignore
);

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    symbol: String,
    order_id: u64,
    transact_time: i64,
    orig_qty: String,
    executed_qty: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    can_trade: bool,
    balances: Vec<BalanceResponse>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    asset: String,
    free: String,
    locked: String,
}

/// Non-zero balances of the authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub can_trade: bool,
    pub balances: Vec<Balance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub asset: String,
    pub free: f64,
    pub locked: f64,
}

/// Blocking Binance spot client.
pub struct BinanceClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl BinanceClient {
    /// Client for the mainnet or testnet endpoint selected in `market`.
    pub fn new(market: &MarketConfig, credentials: Option<Credentials>) -> Result<Self, DataError> {
        let base = if market.testnet { TESTNET_URL } else { MAINNET_URL };
        Self::with_base_url(base, market.timeout(), credentials)
    }

    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        credentials: Option<Credentials>,
    ) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(base_url)
            .map_err(|e| DataError::Other(format!("invalid base URL {base_url}: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, DataError> {
        self.base_url
            .join(path)
            .map_err(|e| DataError::Other(format!("invalid endpoint {path}: {e}")))
    }

    fn credentials(&self) -> Result<&Credentials, DataError> {
        self.credentials.as_ref().ok_or_else(|| {
            DataError::AuthenticationRequired(
                "BINANCE_API_KEY and BINANCE_API_SECRET must be set".into(),
            )
        })
    }

    /// Build a signed URL: params, then timestamp and recvWindow, then the
    /// signature over everything before it.
    fn signed_url(
        &self,
        path: &str,
        params: &[(&str, String)],
        timestamp_ms: i64,
    ) -> Result<Url, DataError> {
        let credentials = self.credentials()?;
        let mut url = self.endpoint(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs
                .append_pair("recvWindow", &RECV_WINDOW_MS.to_string())
                .append_pair("timestamp", &timestamp_ms.to_string());
        }
        let query = url.query().unwrap_or_default().to_string();
        let signature = signer::sign(&credentials.api_secret, &query)
            .map_err(|e| DataError::AuthenticationRequired(format!("invalid API secret: {e}")))?;
        url.query_pairs_mut().append_pair("signature", &signature);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DataError> {
        let response = request.send().map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| DataError::ResponseFormatChanged(format!("{e}: {}", truncate(&body))))
    }

    fn transport_error(&self, e: reqwest::Error) -> DataError {
        if e.is_timeout() {
            DataError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            DataError::NetworkUnreachable(e.to_string())
        }
    }

    fn fetch_klines(
        &self,
        symbol: &str,
        interval: Interval,
        start: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let mut url = self.endpoint("/api/v3/klines")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("symbol", symbol)
                .append_pair("interval", interval.as_str())
                .append_pair("limit", &limit.min(KLINE_PAGE_LIMIT).to_string());
            if let Some(start) = start {
                pairs.append_pair("startTime", &start.timestamp_millis().to_string());
            }
        }
        debug!(%url, "fetching klines");
        let rows: Vec<KlineRow> = self.send(self.client.get(url))?;
        rows.into_iter().map(parse_kline).collect()
    }

    /// Balances with a non-zero free or locked amount.
    pub fn account(&self) -> Result<AccountSummary, DataError> {
        let url = self.signed_url("/api/v3/account", &[], Utc::now().timestamp_millis())?;
        let api_key = &self.credentials()?.api_key;
        let response: AccountResponse =
            self.send(self.client.get(url).header("X-MBX-APIKEY", api_key))?;

        summarize_account(response)
    }
}

impl MarketData for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: chrono::Duration,
    ) -> Result<Vec<Candle>, DataError> {
        let now = Utc::now();
        let mut start = now - lookback;
        let mut candles: Vec<Candle> = Vec::new();

        while start <= now {
            let page = self.fetch_klines(symbol, interval, Some(start), KLINE_PAGE_LIMIT)?;
            let Some(last) = page.last() else { break };
            let next = last.open_time + interval.duration();
            let full_page = page.len() >= KLINE_PAGE_LIMIT;
            candles.extend(page);
            if !full_page {
                break;
            }
            start = next;
        }

        if candles.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        info!(symbol, %interval, count = candles.len(), "loaded candles");
        Ok(candles)
    }

    fn recent_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        self.fetch_klines(symbol, interval, None, limit)
    }

    fn live_price(&self, symbol: &str) -> Result<f64, DataError> {
        let mut url = self.endpoint("/api/v3/ticker/price")?;
        url.query_pairs_mut().append_pair("symbol", symbol);
        let ticker: TickerPrice = self.send(self.client.get(url))?;
        parse_decimal("price", &ticker.price)
    }
}

impl OrderGateway for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<OrderConfirmation, OrderError> {
        validate_order(symbol, quantity)?;
        let params = [
            ("symbol", symbol.to_string()),
            ("side", side.as_str().to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", quantity.to_string()),
        ];
        let url = self
            .signed_url("/api/v3/order", &params, Utc::now().timestamp_millis())
            .map_err(order_error)?;
        let api_key = &self.credentials().map_err(order_error)?.api_key;

        info!(symbol, side = %side, quantity, "submitting market order");
        let response: OrderResponse = self
            .send(self.client.post(url).header("X-MBX-APIKEY", api_key))
            .map_err(order_error)?;
        parse_order(response, side)
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<f64, DataError> {
    value.parse::<f64>().map_err(|_| {
        DataError::ResponseFormatChanged(format!("{field} is not a number: {value:?}"))
    })
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>, DataError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ms}")))
}

fn parse_kline(row: KlineRow) -> Result<Candle, DataError> {
    Ok(Candle {
        open_time: millis_to_utc(row.0)?,
        open: parse_decimal("open", &row.1)?,
        high: parse_decimal("high", &row.2)?,
        low: parse_decimal("low", &row.3)?,
        close: parse_decimal("close", &row.4)?,
        volume: parse_decimal("volume", &row.5)?,
        close_time: millis_to_utc(row.6)?,
        quote_volume: parse_decimal("quote_volume", &row.7)?,
        trade_count: row.8,
        taker_buy_base_volume: parse_decimal("taker_buy_base_volume", &row.9)?,
        taker_buy_quote_volume: parse_decimal("taker_buy_quote_volume", &row.10)?,
    })
}

fn summarize_account(response: AccountResponse) -> Result<AccountSummary, DataError> {
    let mut balances = response
        .balances
        .into_iter()
        .map(|b| {
            Ok(Balance {
                free: parse_decimal("free", &b.free)?,
                locked: parse_decimal("locked", &b.locked)?,
                asset: b.asset,
            })
        })
        .collect::<Result<Vec<_>, DataError>>()?;
    balances.retain(|b| b.free != 0.0 || b.locked != 0.0);

    Ok(AccountSummary {
        can_trade: response.can_trade,
        balances,
    })
}

fn parse_order(response: OrderResponse, side: OrderSide) -> Result<OrderConfirmation, OrderError> {
    let decimal = |field: &str, value: &str| parse_decimal(field, value).map_err(order_error);
    Ok(OrderConfirmation {
        order_id: response.order_id,
        requested_quantity: decimal("origQty", &response.orig_qty)?,
        executed_quantity: decimal("executedQty", &response.executed_qty)?,
        transact_time: millis_to_utc(response.transact_time).map_err(order_error)?,
        symbol: response.symbol,
        side,
        status: response.status,
    })
}

/// Map a non-success HTTP status (and its `{code, msg}` body) to a DataError.
fn status_error(status: StatusCode, body: &str) -> DataError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
        return DataError::RateLimited {
            retry_after_secs: 60,
        };
    }
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) if status == StatusCode::UNAUTHORIZED => {
            DataError::AuthenticationRequired(format!("{} ({})", err.msg, err.code))
        }
        Ok(err) => DataError::Exchange {
            code: err.code,
            message: err.msg,
        },
        Err(_) => DataError::Other(format!("HTTP {status}: {}", truncate(body))),
    }
}

fn order_error(e: DataError) -> OrderError {
    match e {
        DataError::Exchange { code, message } => OrderError::Rejected { code, message },
        DataError::AuthenticationRequired(msg) => OrderError::AuthenticationRequired(msg),
        DataError::NetworkUnreachable(msg) => OrderError::NetworkUnreachable(msg),
        DataError::Timeout { timeout_secs } => {
            OrderError::NetworkUnreachable(format!("timed out after {timeout_secs}s"))
        }
        DataError::ResponseFormatChanged(msg) => OrderError::ResponseFormatChanged(msg),
        other => OrderError::Rejected {
            code: 0,
            message: other.to_string(),
        },
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
