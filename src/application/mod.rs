//! Application Layer - Trading loop
//!
//! Wires the aggregator, decision engine and exchange into the polling loop.

pub mod trader;

pub use trader::{CycleReport, MemeTrader, TokenOutcome, TokenReport, TraderError};
