//! Binance Adapter
//!
//! Implementation of the ExchangeClient port for Binance spot.

mod client;
mod types;

pub use client::{BinanceClient, BinanceConfig};
pub use types::{SymbolInfo, floor_to_step, format_quantity};
