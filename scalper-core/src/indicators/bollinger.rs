//! Bollinger upper band: SMA(close, period) + mult * stddev(close, period).
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::{Column, Indicator, Source};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bollinger {
    pub fn upper(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bollinger_upper_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Column {
        let closes = Source::Close.extract(candles);
        let n = closes.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &closes[(i + 1 - self.period)..=i];
            let Some(values) = window.iter().copied().collect::<Option<Vec<f64>>>() else {
                continue;
            };

            let mean = values.iter().sum::<f64>() / self.period as f64;
            let variance = values
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / self.period as f64;
            let stddev = variance.sqrt();

            result[i] = Some(mean + self.multiplier * stddev);
        }

        result
    }
}
