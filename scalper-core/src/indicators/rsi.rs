//! Relative Strength Index (RSI), in two smoothing flavours.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), bounded in [0, 100].
//! avg_loss == 0 → RSI = 100 (never infinite).
//!
//! - [`Rsi`]: simple rolling means of gains and losses. The first change has
//!   no previous close and counts as zero, so the first defined row is
//!   period - 1.
//! - [`WilderRsi`]: Wilder smoothing (alpha = 1/period) seeded with the mean
//!   of the first `period` changes. First defined row is `period`.

use super::sma::rolling_mean;
use super::{Column, Indicator, Source};
use crate::domain::Candle;

/// Rolling-mean RSI.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Column {
        let closes = Source::Close.extract(candles);
        let n = closes.len();
        let mut gains = vec![None; n];
        let mut losses = vec![None; n];

        for i in 0..n {
            let change = if i == 0 {
                closes[0].map(|_| 0.0)
            } else {
                match (closes[i], closes[i - 1]) {
                    (Some(curr), Some(prev)) => Some(curr - prev),
                    _ => None,
                }
            };
            gains[i] = change.map(|ch| ch.max(0.0));
            losses[i] = change.map(|ch| (-ch).max(0.0));
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(g, l)| match (g, l) {
                (Some(g), Some(l)) => Some(rsi_from_averages(*g, *l)),
                _ => None,
            })
            .collect()
    }
}

/// Wilder-smoothed RSI.
#[derive(Debug, Clone)]
pub struct WilderRsi {
    period: usize,
    name: String,
}

impl WilderRsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("wilder_rsi_{period}"),
        }
    }
}

impl Indicator for WilderRsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Column {
        let closes = Source::Close.extract(candles);
        let n = closes.len();
        let mut result = vec![None; n];

        if n < self.period + 1 {
            return result;
        }

        let changes: Vec<Option<f64>> = (0..n)
            .map(|i| {
                if i == 0 {
                    return None;
                }
                match (closes[i], closes[i - 1]) {
                    (Some(curr), Some(prev)) => Some(curr - prev),
                    _ => None,
                }
            })
            .collect();

        // Seed: average gain and average loss over first `period` changes
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        for ch in &changes[1..=self.period] {
            let Some(ch) = *ch else {
                return result;
            };
            if ch > 0.0 {
                avg_gain += ch;
            } else {
                avg_loss -= ch;
            }
        }
        avg_gain /= self.period as f64;
        avg_loss /= self.period as f64;

        result[self.period] = Some(rsi_from_averages(avg_gain, avg_loss));

        let alpha = 1.0 / self.period as f64;
        for i in (self.period + 1)..n {
            // An undefined change taints the rest of the series.
            let Some(ch) = changes[i] else {
                return result;
            };

            let gain = ch.max(0.0);
            let loss = (-ch).max(0.0);

            avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
            avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

            result[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }

        result
    }
}

/// RSI from average gain and average loss.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_defined, make_candles};

    #[test]
    fn rsi_all_gains_is_100() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&candles);
        assert!(result[1].is_none());
        for v in &result[2..] {
            assert_defined(*v, 100.0, 1e-9);
        }
    }

    #[test]
    fn rsi_flat_prices_fail_soft_to_100() {
        let candles = make_candles(&[50.0; 6]);
        let result = Rsi::new(3).compute(&candles);
        assert_defined(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let candles = make_candles(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&candles);
        // Row 2 window still holds the zero first change: gain 0, loss 2/3.
        assert_defined(result[2], 0.0, 1e-9);
        assert_defined(result[5], 0.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Changes: [0], +0.34, -0.25, -0.48, +0.72
        // Row 3 window (changes 1..=3): gains 0.34, losses 0.73
        // RSI = 100 - 100/(1 + 0.34/0.73)
        let candles = make_candles(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&candles);
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_defined(result[3], expected, 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let candles = make_candles(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for (i, v) in Rsi::new(3).compute(&candles).iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at row {i}: {v}");
            }
        }
    }

    #[test]
    fn wilder_rsi_all_gains() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = WilderRsi::new(3).compute(&candles);
        assert!(result[2].is_none());
        assert_defined(result[3], 100.0, 1e-6);
    }

    #[test]
    fn wilder_rsi_mixed_smoothing() {
        // Seed (changes 1..=3): gain 0.34/3, loss 0.73/3
        // Row 4 change +0.72: gain = (1/3)*0.72 + (2/3)*(0.34/3)
        let candles = make_candles(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = WilderRsi::new(3).compute(&candles);
        let g = 0.72 / 3.0 + (2.0 / 3.0) * (0.34 / 3.0);
        let l = (2.0 / 3.0) * (0.73 / 3.0);
        assert_defined(result[4], 100.0 - 100.0 / (1.0 + g / l), 1e-9);
    }

    #[test]
    fn wilder_rsi_undefined_in_seed() {
        let mut candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        candles[2].close = f64::NAN;
        let result = WilderRsi::new(3).compute(&candles);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_lookbacks() {
        assert_eq!(Rsi::new(14).lookback(), 13);
        assert_eq!(WilderRsi::new(14).lookback(), 14);
    }
}
