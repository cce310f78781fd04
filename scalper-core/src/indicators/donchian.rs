//! Donchian Channel: highest high / lowest low over a lookback window.
//!
//! Produces two series (exposed as separate Indicator instances):
//! - Upper: max(high[t-period+1..=t])
//! - Lower: min(low[t-period+1..=t])
//!
//! The window includes the current candle. Lookback: period - 1.

use super::{Column, Indicator, Source};
use crate::domain::Candle;

/// Which band of the Donchian channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonchianBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Donchian {
    period: usize,
    band: DonchianBand,
    name: String,
}

impl Donchian {
    pub fn upper(period: usize) -> Self {
        assert!(period >= 1, "Donchian period must be >= 1");
        Self {
            period,
            band: DonchianBand::Upper,
            name: format!("donchian_upper_{period}"),
        }
    }

    pub fn lower(period: usize) -> Self {
        assert!(period >= 1, "Donchian period must be >= 1");
        Self {
            period,
            band: DonchianBand::Lower,
            name: format!("donchian_lower_{period}"),
        }
    }
}

impl Indicator for Donchian {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Column {
        match self.band {
            DonchianBand::Upper => rolling_max(&Source::High.extract(candles), self.period),
            DonchianBand::Lower => rolling_min(&Source::Low.extract(candles), self.period),
        }
    }
}

/// Rolling maximum. A window containing `None` yields `None`.
pub fn rolling_max(values: &[Option<f64>], period: usize) -> Column {
    rolling_fold(values, period, f64::max)
}

/// Rolling minimum. A window containing `None` yields `None`.
pub fn rolling_min(values: &[Option<f64>], period: usize) -> Column {
    rolling_fold(values, period, f64::min)
}

fn rolling_fold(values: &[Option<f64>], period: usize, pick: fn(f64, f64) -> f64) -> Column {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        let mut acc: Option<f64> = None;
        let mut undefined = false;
        for v in window {
            match v {
                Some(x) => acc = Some(acc.map_or(*x, |a| pick(a, *x))),
                None => {
                    undefined = true;
                    break;
                }
            }
        }
        if !undefined {
            result[i] = acc;
        }
    }

    result
}
