//! Signal Generator: fast/slow SMA crossover.
//!
//! - signal = 1 while the fast SMA is above the slow SMA, else 0
//! - transition = signal[t] - signal[t-1]; +1 is a buy, -1 a sell
//! - buy/sell markers carry the close on their transition rows
//!
//! An undefined SMA compares false, so warm-up rows hold signal 0.

use super::momentum::IndicatorColumns;
use crate::domain::{Candle, OrderSide};
use crate::indicators::Column;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalColumns {
    pub signal: Vec<u8>,
    /// `None` on the first row only.
    pub transition: Vec<Option<i8>>,
    pub buy: Column,
    pub sell: Column,
}

impl SignalColumns {
    /// Side implied by the transition at `row`, if any.
    pub fn side_at(&self, row: usize) -> Option<OrderSide> {
        match self.transition.get(row).copied().flatten() {
            Some(1) => Some(OrderSide::Buy),
            Some(-1) => Some(OrderSide::Sell),
            _ => None,
        }
    }
}

pub fn generate_signals(candles: &[Candle], indicators: &IndicatorColumns) -> SignalColumns {
    let signal: Vec<u8> = indicators
        .sma_fast
        .iter()
        .zip(&indicators.sma_slow)
        .map(|(fast, slow)| match (fast, slow) {
            (Some(fast), Some(slow)) if fast > slow => 1,
            _ => 0,
        })
        .collect();

    let transition: Vec<Option<i8>> = (0..signal.len())
        .map(|i| (i > 0).then(|| signal[i] as i8 - signal[i - 1] as i8))
        .collect();

    let marker = |wanted: i8| -> Column {
        candles
            .iter()
            .zip(&transition)
            .map(|(c, t)| (*t == Some(wanted) && c.close.is_finite()).then_some(c.close))
            .collect()
    };
    let buy = marker(1);
    let sell = marker(-1);

    SignalColumns {
        signal,
        transition,
        buy,
        sell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn indicators_from(fast: Column, slow: Column) -> IndicatorColumns {
        let n = fast.len();
        IndicatorColumns {
            sma_fast: fast,
            sma_slow: slow,
            rsi: vec![None; n],
            macd_line: vec![None; n],
            macd_signal: vec![None; n],
            macd_histogram: vec![None; n],
            upper_band: vec![None; n],
            volume_ma: vec![None; n],
        }
    }

    #[test]
    fn crossover_marks_buy_then_sell() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let ind = indicators_from(
            vec![None, Some(1.0), Some(3.0), Some(3.0), Some(1.0)],
            vec![None, Some(2.0), Some(2.0), Some(2.0), Some(2.0)],
        );
        let s = generate_signals(&candles, &ind);

        assert_eq!(s.signal, vec![0, 0, 1, 1, 0]);
        assert_eq!(s.transition, vec![None, Some(0), Some(1), Some(0), Some(-1)]);
        assert_eq!(s.buy, vec![None, None, Some(12.0), None, None]);
        assert_eq!(s.sell, vec![None, None, None, None, Some(14.0)]);
        assert_eq!(s.side_at(2), Some(OrderSide::Buy));
        assert_eq!(s.side_at(4), Some(OrderSide::Sell));
        assert_eq!(s.side_at(0), None);
        assert_eq!(s.side_at(99), None);
    }

    #[test]
    fn equal_averages_are_not_a_long_signal() {
        let candles = make_candles(&[10.0, 10.0]);
        let ind = indicators_from(vec![Some(5.0), Some(5.0)], vec![Some(5.0), Some(5.0)]);
        let s = generate_signals(&candles, &ind);
        assert_eq!(s.signal, vec![0, 0]);
    }

    #[test]
    fn undefined_slow_average_yields_flat() {
        let candles = make_candles(&[10.0, 10.0, 10.0]);
        let ind = indicators_from(vec![Some(9.0); 3], vec![None, None, Some(1.0)]);
        let s = generate_signals(&candles, &ind);
        assert_eq!(s.signal, vec![0, 0, 1]);
        assert_eq!(s.transition[2], Some(1));
    }

    #[test]
    fn empty_series() {
        let ind = indicators_from(vec![], vec![]);
        let s = generate_signals(&[], &ind);
        assert!(s.signal.is_empty() && s.transition.is_empty());
    }
}
