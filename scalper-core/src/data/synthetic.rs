//! Synthetic market for offline runs.
//!
//! Produces a seeded random walk per symbol. The walk is anchored at a fixed
//! end time, so the same market answers the same request identically. The live
//! price is the last close of the tracked walk nudged by a seeded jitter; by
//! default that is one week of hourly candles, and [`SyntheticMarket::tracking`]
//! points it at the interval and lookback a cycle actually loads.

use super::provider::{DataError, MarketData};
use crate::domain::{Candle, Interval};
use chrono::{DateTime, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticMarket {
    seed: u64,
    start_price: f64,
    anchor: DateTime<Utc>,
    live_interval: Interval,
    live_lookback: chrono::Duration,
}

impl SyntheticMarket {
    /// A market anchored at the current hour.
    pub fn new(seed: u64) -> Self {
        let now = Utc::now();
        let anchor = now
            .duration_trunc(chrono::Duration::hours(1))
            .unwrap_or(now);
        Self::anchored(seed, anchor)
    }

    /// A market whose last candle opens at or before `anchor`.
    pub fn anchored(seed: u64, anchor: DateTime<Utc>) -> Self {
        Self {
            seed,
            start_price: 30_000.0,
            anchor,
            live_interval: Interval::OneHour,
            live_lookback: chrono::Duration::hours(168),
        }
    }

    /// Derive the live price from the walk served for `interval` and `lookback`.
    pub fn tracking(mut self, interval: Interval, lookback: chrono::Duration) -> Self {
        self.live_interval = interval;
        self.live_lookback = lookback;
        self
    }

    pub fn with_start_price(mut self, start_price: f64) -> Self {
        self.start_price = start_price;
        self
    }

    fn rng_for(&self, symbol: &str, interval: Interval) -> StdRng {
        let mixed = symbol
            .bytes()
            .chain(interval.as_str().bytes())
            .fold(self.seed, |acc, b| {
                (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
        StdRng::seed_from_u64(mixed)
    }

    fn walk(&self, symbol: &str, interval: Interval, count: usize) -> Vec<Candle> {
        let mut rng = self.rng_for(symbol, interval);
        let step = interval.duration();
        // Open times step back from the anchor; stops early at chrono's minimum date.
        let mut open_times: Vec<DateTime<Utc>> =
            std::iter::successors(Some(self.anchor), |t| t.checked_sub_signed(step))
                .take(count)
                .collect();
        open_times.reverse();

        let mut price = self.start_price;
        let mut candles = Vec::with_capacity(open_times.len());
        for open_time in open_times {
            let ret: f64 = rng.gen_range(-0.01..0.01);
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.004));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.004));
            let volume: f64 = rng.gen_range(5.0..50.0);
            let taker_share: f64 = rng.gen_range(0.3..0.7);

            candles.push(Candle {
                open_time,
                open,
                high,
                low,
                close,
                volume,
                close_time: open_time + step - chrono::Duration::milliseconds(1),
                quote_volume: volume * close,
                trade_count: rng.gen_range(50..500),
                taker_buy_base_volume: volume * taker_share,
                taker_buy_quote_volume: volume * taker_share * close,
            });
            price = close;
        }
        candles
    }
}

impl MarketData for SyntheticMarket {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: chrono::Duration,
    ) -> Result<Vec<Candle>, DataError> {
        Ok(self.walk(symbol, interval, interval.candles_in(lookback)))
    }

    fn recent_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        Ok(self.walk(symbol, interval, limit))
    }

    fn live_price(&self, symbol: &str) -> Result<f64, DataError> {
        let count = self.live_interval.candles_in(self.live_lookback).max(1);
        let last = self
            .walk(symbol, self.live_interval, count)
            .last()
            .map(|c| c.close)
            .ok_or_else(|| DataError::Other("synthetic walk is empty".into()))?;
        let mut rng = self.rng_for(symbol, Interval::OneMinute);
        Ok(last * (1.0 + rng.gen_range(-0.002..0.002)))
    }
}
