//! Moving Average Convergence Divergence (MACD).
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal)
//! histogram = line - signal
//!
//! EMAs are seeded with the first value, so every row with a defined close is
//! defined.

use super::ema::ewm;
use super::{Column, Source};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// The three aligned MACD columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Column,
    pub signal: Column,
    pub histogram: Column,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(slow > fast, "MACD slow span must be > fast span");
        Self { fast, slow, signal }
    }

    pub fn compute(&self, candles: &[Candle]) -> MacdSeries {
        let closes = Source::Close.extract(candles);
        let fast = ewm(&closes, self.fast);
        let slow = ewm(&closes, self.slow);

        let line: Column = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();
        let signal = ewm(&line, self.signal);
        let histogram = line
            .iter()
            .zip(&signal)
            .map(|(l, s)| Some((*l)? - (*s)?))
            .collect();

        MacdSeries {
            line,
            signal,
            histogram,
        }
    }
}
