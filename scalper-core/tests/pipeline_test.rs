//! Pipeline integration tests against hand-computed fixtures.
//!
//! 1. ATR and Chandelier exits on a 22-candle fixture
//! 2. Factor columns and the adjusted stop-loss chain
//! 3. End-to-end: a 30-candle crossover at row 20 through the gate and paper broker
//! 4. Cycle runner over a fixture market: artifacts, rejection reasons

use chrono::{Duration, TimeZone, Utc};
use scalper_core::config::{PipelineConfig, TraderConfig};
use scalper_core::cycle::{build_table, execute_decisions, run_cycle};
use scalper_core::data::{DataError, MarketData};
use scalper_core::domain::{Candle, Interval, OrderSide};
use scalper_core::orders::{OrderGateway, PaperBroker};
use scalper_core::pipeline::{evaluate, GateInputs, GateOutcome, GateThresholds, SeriesTable};

const EPS: f64 = 1e-9;

fn candles_from(rows: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| {
            Candle::from_ohlcv(base + Duration::hours(i as i64), o, h, l, c, 1000.0)
        })
        .collect()
}

fn assert_close(actual: Option<f64>, expected: f64, what: &str) {
    let v = actual.unwrap_or_else(|| panic!("{what}: expected {expected}, got None"));
    assert!(
        (v - expected).abs() < EPS,
        "{what}: expected {expected}, got {v}"
    );
}

// ── 1. ATR / Chandelier fixture ──────────────────────────────────────

const FIXTURE: [(f64, f64, f64, f64); 22] = [
    (100.0, 102.0, 99.0, 101.0),
    (101.0, 104.0, 100.0, 103.0),
    (103.0, 105.0, 101.0, 102.0),
    (102.0, 103.0, 98.0, 99.0),
    (99.0, 101.0, 97.0, 100.0),
    (100.0, 106.0, 99.0, 105.0),
    (105.0, 108.0, 104.0, 107.0),
    (107.0, 109.0, 105.0, 106.0),
    (106.0, 107.0, 102.0, 103.0),
    (103.0, 104.0, 100.0, 101.0),
    (101.0, 103.0, 99.0, 102.0),
    (102.0, 105.0, 101.0, 104.0),
    (104.0, 110.0, 103.0, 109.0),
    (109.0, 112.0, 107.0, 111.0),
    (111.0, 113.0, 108.0, 109.0),
    (109.0, 110.0, 104.0, 105.0),
    (105.0, 107.0, 103.0, 106.0),
    (106.0, 109.0, 105.0, 108.0),
    (108.0, 111.0, 107.0, 110.0),
    (110.0, 114.0, 109.0, 113.0),
    (113.0, 115.0, 110.0, 111.0),
    (111.0, 112.0, 106.0, 107.0),
];

#[test]
fn atr_and_exits_match_hand_computation() {
    let table = SeriesTable::build("BTCUSDT", candles_from(&FIXTURE), &PipelineConfig::default());

    // True ranges: 3 4 4 5 4 7 4 4 5 4 4 4 7 5 5 6 4 4 4 5 5 6
    // (row, sum of last 14 TR, highest high, lowest low)
    let expected = [
        (13, 64.0, 112.0, 97.0),
        (14, 66.0, 113.0, 97.0),
        (15, 68.0, 113.0, 97.0),
        (16, 68.0, 113.0, 97.0),
        (17, 67.0, 113.0, 97.0),
        (18, 67.0, 113.0, 99.0),
        (19, 65.0, 114.0, 99.0),
        (20, 66.0, 115.0, 99.0),
        (21, 68.0, 115.0, 99.0),
    ];

    for row in 0..13 {
        assert!(table.stops.atr[row].is_none(), "ATR defined at warm-up row {row}");
        assert!(table.stops.long_exit[row].is_none());
        assert!(table.stops.short_exit[row].is_none());
        assert!(table.stops.adjusted_stop_loss[row].is_none());
    }

    for (row, tr_sum, highest, lowest) in expected {
        let atr = tr_sum / 14.0;
        assert_close(table.stops.atr[row], atr, &format!("atr[{row}]"));
        assert_close(
            table.stops.long_exit[row],
            highest - atr * 3.0,
            &format!("long_exit[{row}]"),
        );
        assert_close(
            table.stops.short_exit[row],
            lowest + atr * 3.0,
            &format!("short_exit[{row}]"),
        );
    }
}

// ── 2. Factors and the adjusted stop ─────────────────────────────────

#[test]
fn factors_and_adjusted_stop_follow_formulas() {
    let table = SeriesTable::build("BTCUSDT", candles_from(&FIXTURE), &PipelineConfig::default());

    // Row 20: high 115, low 110, close 111; every candle trades 1000 of 22000
    assert_close(table.factors.liquidity[20], 1.0 - 5.0 / 111.0, "liquidity[20]");
    assert_close(table.factors.volume[20], 1000.0 / 22000.0, "volume[20]");

    // Wilder RSI warms up over 14 changes
    assert!(table.factors.trend[13].is_none());
    let trend = table.factors.trend[14].expect("trend defined at row 14");
    assert!((0.5..=1.0).contains(&trend));

    for row in 14..FIXTURE.len() {
        let long_exit = table.stops.long_exit[row].unwrap();
        let liquidity = table.factors.liquidity[row].unwrap();
        let volume = table.factors.volume[row].unwrap();
        let trend = table.factors.trend[row].unwrap();
        let mut expected = long_exit * (1.0 - liquidity);
        expected *= 1.0 - volume;
        expected *= trend;
        assert_eq!(
            table.stops.adjusted_stop_loss[row].map(f64::to_bits),
            Some(expected.to_bits()),
            "adjusted stop at row {row}"
        );
        assert!(table.stops.adjusted_stop_loss[row].unwrap() <= long_exit);
    }
}

// ── 3. End-to-end crossover scenario ─────────────────────────────────

/// Flat at 100 for 20 candles, a bullish 110 candle on heavy volume at row
/// 20, then a steady climb. The fast SMA crosses above the slow SMA at row 20.
fn crossover_candles() -> Vec<Candle> {
    let closes: Vec<f64> = (0..30)
        .map(|i| match i {
            0..=19 => 100.0,
            20 => 110.0,
            _ => 110.0 + (i - 20) as f64,
        })
        .collect();
    let base = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let volume = if i == 20 { 3000.0 } else { 1000.0 };
            Candle::from_ohlcv(
                base + Duration::hours(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                volume,
            )
        })
        .collect()
}

#[test]
fn crossover_marks_buy_at_row_20_only() {
    let table = SeriesTable::build("BTCUSDT", crossover_candles(), &PipelineConfig::default());

    assert_eq!(table.transition_rows(), vec![(20, OrderSide::Buy)]);
    for row in 0..30 {
        if row == 20 {
            assert_eq!(table.signals.buy[row], Some(110.0));
        } else {
            assert!(table.signals.buy[row].is_none(), "unexpected buy at {row}");
        }
        assert!(table.signals.sell[row].is_none(), "unexpected sell at {row}");
    }
}

#[test]
fn forced_oversold_rsi_issues_one_buy_with_expected_risk() {
    let table = SeriesTable::build("BTCUSDT", crossover_candles(), &PipelineConfig::default());
    let broker = PaperBroker::new();
    let quantity = 0.01;
    let live = 108.0;

    for (row, _) in table.transition_rows() {
        let mut inputs = GateInputs::at(&table, row);
        if row == 20 {
            inputs.rsi = Some(25.0);
        }
        if let GateOutcome::Pass(decision) =
            evaluate(&inputs, live, quantity, &GateThresholds::default())
        {
            broker
                .submit_market_order(&table.symbol, decision.side, decision.quantity)
                .unwrap();

            let stop = table.stops.adjusted_stop_loss[20].unwrap();
            assert_eq!(decision.row, 20);
            assert!((decision.risk - (live - stop).abs()).abs() < 1e-6);
            assert!((decision.risk_amount - decision.risk * quantity).abs() < 1e-6);
        }
    }

    let orders = broker.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].side, OrderSide::Buy);
    assert_eq!(orders[0].requested_quantity, quantity);
}

#[test]
fn live_price_above_marker_blocks_the_buy() {
    let table = SeriesTable::build("BTCUSDT", crossover_candles(), &PipelineConfig::default());
    let mut inputs = GateInputs::at(&table, 20);
    inputs.rsi = Some(25.0);
    let outcome = evaluate(&inputs, 110.5, 0.01, &GateThresholds::default());
    assert!(outcome.decision().is_none());
}

// ── 4. Cycle runner over a fixture market ────────────────────────────

struct FixtureMarket {
    candles: Vec<Candle>,
    live: f64,
}

impl MarketData for FixtureMarket {
    fn name(&self) -> &str {
        "fixture"
    }

    fn candles(&self, _: &str, _: Interval, _: Duration) -> Result<Vec<Candle>, DataError> {
        Ok(self.candles.clone())
    }

    fn recent_candles(&self, _: &str, _: Interval, limit: usize) -> Result<Vec<Candle>, DataError> {
        let start = self.candles.len().saturating_sub(limit);
        Ok(self.candles[start..].to_vec())
    }

    fn live_price(&self, _: &str) -> Result<f64, DataError> {
        Ok(self.live)
    }
}

#[test]
fn real_rsi_rejects_the_crossover() {
    let market = FixtureMarket {
        candles: crossover_candles(),
        live: 108.0,
    };
    let config = TraderConfig::default();
    let table = build_table(&market, &config).unwrap();
    let broker = PaperBroker::new();

    let report = execute_decisions(&table, &market, &broker, &config).unwrap();

    // Nothing but gains in the window: RSI is 100, far from oversold
    assert_eq!(table.indicators.rsi[20], Some(100.0));
    assert_eq!(report.transitions, 1);
    assert!(report.is_idle());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].row, 20);
    assert!(report.rejected[0].reason.contains("rsi"));
    assert!(broker.orders().is_empty());
}

#[test]
fn run_cycle_writes_dump_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TraderConfig::default();
    config.report.output_path = dir.path().join("output.txt");
    config.report.csv_path = Some(dir.path().join("series.csv"));

    let market = FixtureMarket {
        candles: crossover_candles(),
        live: 108.0,
    };
    let (table, report) = run_cycle(&market, &PaperBroker::new(), &config).unwrap();

    assert_eq!(report.market, "fixture");
    assert_eq!(report.gateway, "paper");
    assert_eq!(report.candles, 30);

    let dump = std::fs::read_to_string(dir.path().join("output.txt")).unwrap();
    assert_eq!(dump.lines().count(), table.len() + 1);
    let csv = std::fs::read_to_string(dir.path().join("series.csv")).unwrap();
    assert_eq!(csv.lines().count(), table.len() + 1);
}
