//! Signal and risk pipeline.
//!
//! candles → factors → stop-loss
//!         → indicators → signals
//! then signals + stop-loss → decision gate.
//!
//! Every stage is a pure function of its inputs. [`SeriesTable::build`] runs
//! them in order and [`gate::evaluate`] is applied per transition row.

pub mod crossover;
pub mod factors;
pub mod gate;
pub mod momentum;
pub mod stop_loss;
pub mod table;

pub use crossover::{generate_signals, SignalColumns};
pub use factors::{calculate_factors, trend_factor, FactorColumns};
pub use gate::{evaluate, GateInputs, GateOutcome, GateRejection, GateThresholds, RiskDecision};
pub use momentum::{calculate_indicators, IndicatorColumns};
pub use stop_loss::{adjust_stop, calculate_stop_loss, StopLossColumns};
pub use table::{warm_up_rows, SeriesRow, SeriesTable};
