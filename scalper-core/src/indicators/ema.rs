//! Exponential Moving Average (EMA) over a column, used by MACD.
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA at the first defined input equals that input (no bias adjustment).

use super::Column;

/// Exponentially weighted mean of a column.
///
/// Leading `None`s stay `None`. An undefined input after the seed yields
/// `None` at that row and the recurrence resumes from the last defined value.
pub fn ewm(values: &[Option<f64>], span: usize) -> Column {
    let mut result = vec![None; values.len()];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for (i, v) in values.iter().enumerate() {
        let Some(x) = *v else { continue };
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        result[i] = Some(next);
        prev = Some(next);
    }

    result
}
