//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Twitter: API v2 client for keyword search and account timelines
//! - Binance: signed spot REST client for balances and market orders
//! - Paper: in-memory exchange for dry runs
//! - CLI: Command-line argument definitions

pub mod twitter;
pub mod binance;
pub mod paper;
pub mod cli;

pub use twitter::TwitterClient;
pub use binance::BinanceClient;
pub use paper::PaperExchange;
pub use cli::CliApp;
