//! Inline terminal chart: close, adjusted stop-loss, buy and sell markers.

use std::io::{self, stdout};

use crossterm::tty::IsTty;
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
    Terminal, TerminalOptions, Viewport,
};
use scalper_core::SeriesTable;

const CHART_HEIGHT: u16 = 24;

/// Chart widget over a built series table.
pub struct SeriesChart<'a> {
    table: &'a SeriesTable,
}

impl<'a> SeriesChart<'a> {
    pub fn new(table: &'a SeriesTable) -> Self {
        Self { table }
    }
}

fn points(values: impl Iterator<Item = Option<f64>>) -> Vec<(f64, f64)> {
    values
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i as f64, v)))
        .collect()
}

impl Widget for SeriesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let table = self.table;
        let close = points(table.candles.iter().map(|c| Some(c.close)));
        let stop = points(table.stops.adjusted_stop_loss.iter().copied());
        let buys = points(table.signals.buy.iter().copied());
        let sells = points(table.signals.sell.iter().copied());

        let (y_min, y_max) = close
            .iter()
            .chain(&stop)
            .map(|&(_, v)| v)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let (y_lower, y_upper) = if y_min.is_finite() && y_max.is_finite() {
            let range = y_max - y_min;
            let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
            (y_min - pad, y_max + pad)
        } else {
            (0.0, 1.0)
        };
        let x_max = table.len().saturating_sub(1).max(1) as f64;

        let datasets = vec![
            Dataset::default()
                .name("Close")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&close),
            Dataset::default()
                .name("Stop-Loss")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Yellow))
                .data(&stop),
            Dataset::default()
                .name("Buy")
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Green))
                .data(&buys),
            Dataset::default()
                .name("Sell")
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Red))
                .data(&sells),
        ];

        let first = table
            .candles
            .first()
            .map(|c| c.open_time.format("%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let last = table
            .candles
            .last()
            .map(|c| c.open_time.format("%m-%d %H:%M").to_string())
            .unwrap_or_default();

        let title = format!(
            " {} | {} candles | {} buys | {} sells ",
            table.symbol,
            table.len(),
            buys.len(),
            sells.len()
        );

        Chart::new(datasets)
            .block(Block::default().title(title).borders(Borders::ALL))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, x_max])
                    .labels(vec![Span::raw(first), Span::raw(last)]),
            )
            .y_axis(
                Axis::default()
                    .title("Price")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([y_lower, y_upper])
                    .labels(vec![
                        Span::raw(format!("{y_lower:.2}")),
                        Span::raw(format!("{:.2}", (y_lower + y_upper) / 2.0)),
                        Span::raw(format!("{y_upper:.2}")),
                    ]),
            )
            .render(area, buf);
    }
}

/// Draw the chart below the cursor without taking over the screen.
/// Does nothing when stdout is not a terminal.
pub fn plot_inline(table: &SeriesTable) -> io::Result<()> {
    if !stdout().is_tty() {
        tracing::warn!("stdout is not a terminal, skipping chart");
        return Ok(());
    }
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(CHART_HEIGHT),
        },
    )?;
    terminal.draw(|frame| frame.render_widget(SeriesChart::new(table), frame.area()))?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use scalper_core::config::PipelineConfig;
    use scalper_core::domain::Candle;

    fn table() -> SeriesTable {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = (0..60)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.3).sin() * 6.0;
                Candle::from_ohlcv(base + Duration::hours(i), c, c + 1.0, c - 1.0, c, 10.0)
            })
            .collect();
        SeriesTable::build("BTCUSDT", candles, &PipelineConfig::default())
    }

    fn rendered_text(table: &SeriesTable) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(SeriesChart::new(table), frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn chart_renders_title_and_legend() {
        let text = rendered_text(&table());
        assert!(text.contains("BTCUSDT"));
        assert!(text.contains("60 candles"));
        assert!(text.contains("Close"));
        assert!(text.contains("Stop-Loss"));
    }

    #[test]
    fn empty_table_renders_without_panicking() {
        let empty = SeriesTable::build("ETHUSDT", Vec::new(), &PipelineConfig::default());
        let text = rendered_text(&empty);
        assert!(text.contains("ETHUSDT"));
    }
}
