//! Reporting artifacts: the plain-text series dump and the CSV export.
//!
//! Undefined values print as `NaN` in the text dump and as empty fields in
//! the CSV.

use crate::indicators::Column;
use crate::pipeline::{RiskDecision, SeriesTable};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const WIDTH: usize = 14;

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:>WIDTH$.6}"),
        None => format!("{:>WIDTH$}", "NaN"),
    }
}

fn header_line(names: &[&str]) -> String {
    let prices: String = ["open", "high", "low", "close", "volume"]
        .iter()
        .map(|name| format!("{name:>WIDTH$}"))
        .collect();
    let derived: String = names.iter().map(|name| format!(" {name:>WIDTH$}")).collect();
    format!("{:<20}{prices}{derived} {:>6} {:>8}\n", "open_time", "signal", "position")
}

fn row_line(table: &SeriesTable, row: usize, columns: &[(&str, &Column)]) -> String {
    let candle = &table.candles[row];
    let prices: String = [candle.open, candle.high, candle.low, candle.close, candle.volume]
        .into_iter()
        .map(|v| cell(v.is_finite().then_some(v)))
        .collect();
    let derived: String = columns
        .iter()
        .map(|(_, column)| format!(" {}", cell(column[row])))
        .collect();
    let position = table.signals.transition[row]
        .map_or_else(|| "NaN".to_string(), |t| t.to_string());
    format!(
        "{:<20}{prices}{derived} {:>6} {:>8}\n",
        candle.open_time.format("%Y-%m-%d %H:%M:%S"),
        table.signals.signal[row],
        position
    )
}

/// Render the whole table as fixed-width text, one line per candle.
pub fn render_text(table: &SeriesTable) -> String {
    let columns = table.named_columns();
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();

    let mut out = header_line(&names);
    for row in 0..table.len() {
        out.push_str(&row_line(table, row, &columns));
    }
    out
}

/// Write the text dump to `path`, replacing any previous dump.
pub fn write_text(table: &SeriesTable, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, render_text(table)).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Export the table as CSV with a header row.
pub fn export_csv(table: &SeriesTable) -> Result<String, ReportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in table.rows() {
        wtr.serialize(row)?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(data)?)
}

pub fn write_csv(table: &SeriesTable, path: &Path) -> Result<(), ReportError> {
    let csv = export_csv(table)?;
    std::fs::write(path, csv).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One-line operator summary of an approved decision.
pub fn decision_summary(symbol: &str, decision: &RiskDecision) -> String {
    format!(
        "{symbol} {} at row {}: live {:.2}, stop-loss {:.2}, risk {:.2}, quantity {}, risk amount {:.2}",
        decision.side.position_label(),
        decision.row,
        decision.live_price,
        decision.stop_loss,
        decision.risk,
        decision.quantity,
        decision.risk_amount,
    )
}
