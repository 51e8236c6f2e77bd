use std::collections::BTreeSet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::OrderSide;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("Authentication failed: {0}")]
    AuthError(String),
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("Insufficient {asset} balance: need {required}, have {available}")]
    InsufficientBalance {
        asset: String,
        required: f64,
        available: f64,
    },
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Exchange acknowledgement for a submitted market order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    /// Base asset quantity filled
    pub executed_qty: f64,
    /// Quote asset amount spent or received
    pub quote_qty: f64,
    pub status: String,
}

/// Spot exchange capabilities needed by the trader
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Free (unlocked) balance of `asset`
    async fn get_free_balance(&self, asset: &str) -> Result<f64, ExchangeError>;

    /// Submit a market order.
    ///
    /// `quantity` is quote notional for buys and base units for sells. Any
    /// lot-size rounding is up to the implementation.
    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<OrderResult, ExchangeError>;

    /// All symbols currently open for trading
    async fn list_tradable_symbols(&self) -> Result<BTreeSet<String>, ExchangeError>;
}
