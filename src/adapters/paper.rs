//! Paper Exchange
//!
//! In-memory spot exchange for dry runs. Market orders fill instantly at a
//! fixed reference price per pair and move balances between base and quote.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{OrderSide, DEFAULT_QUOTE_ASSET};
use crate::ports::exchange::{ExchangeClient, ExchangeError, OrderResult};

/// One simulated fill
#[derive(Debug, Clone, PartialEq)]
pub struct PaperFill {
    pub timestamp: DateTime<Utc>,
    pub result: OrderResult,
    pub price: f64,
}

#[derive(Debug, Default)]
struct PaperBook {
    balances: HashMap<String, f64>,
    fills: Vec<PaperFill>,
    next_id: u64,
}

#[derive(Debug, Clone)]
pub struct PaperExchange {
    quote_asset: String,
    prices: Arc<HashMap<String, f64>>,
    book: Arc<RwLock<PaperBook>>,
}

impl PaperExchange {
    pub fn new(quote_asset: impl Into<String>, starting_quote: f64) -> Self {
        let quote_asset = quote_asset.into().to_uppercase();
        let mut balances = HashMap::new();
        balances.insert(quote_asset.clone(), starting_quote.max(0.0));

        Self {
            quote_asset,
            prices: Arc::new(HashMap::new()),
            book: Arc::new(RwLock::new(PaperBook {
                balances,
                ..PaperBook::default()
            })),
        }
    }

    /// Builder method to list a pair at a reference price
    pub fn with_price(mut self, pair: &str, price: f64) -> Self {
        Arc::make_mut(&mut self.prices).insert(pair.to_uppercase(), price);
        self
    }

    /// Builder method to seed a non-quote balance
    pub fn with_balance(self, asset: &str, amount: f64) -> Self {
        if let Ok(mut book) = self.book.try_write() {
            book.balances.insert(asset.to_uppercase(), amount);
        }
        self
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }

    pub async fn fills(&self) -> Vec<PaperFill> {
        self.book.read().await.fills.clone()
    }

    /// Current balances, sorted by asset
    pub async fn balances(&self) -> Vec<(String, f64)> {
        let book = self.book.read().await;
        let mut balances: Vec<_> = book.balances.iter().map(|(k, v)| (k.clone(), *v)).collect();
        balances.sort_by(|a, b| a.0.cmp(&b.0));
        balances
    }

    fn base_asset<'a>(&self, symbol: &'a str) -> Option<&'a str> {
        symbol
            .strip_suffix(self.quote_asset.as_str())
            .filter(|base| !base.is_empty())
    }
}

impl Default for PaperExchange {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_ASSET, 0.0)
    }
}

fn debit(
    balances: &mut HashMap<String, f64>,
    asset: &str,
    amount: f64,
) -> Result<(), ExchangeError> {
    let available = balances.get(asset).copied().unwrap_or(0.0);
    if amount > available {
        return Err(ExchangeError::InsufficientBalance {
            asset: asset.to_string(),
            required: amount,
            available,
        });
    }
    balances.insert(asset.to_string(), available - amount);
    Ok(())
}

#[async_trait]
impl ExchangeClient for PaperExchange {
    async fn get_free_balance(&self, asset: &str) -> Result<f64, ExchangeError> {
        let book = self.book.read().await;
        Ok(book.balances.get(&asset.to_uppercase()).copied().unwrap_or(0.0))
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<OrderResult, ExchangeError> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(ExchangeError::InvalidParameters(format!("quantity must be > 0, got {}", quantity)));
        }

        let symbol = symbol.to_uppercase();
        let price = *self
            .prices
            .get(&symbol)
            .ok_or_else(|| ExchangeError::UnknownSymbol(symbol.clone()))?;
        let base = self
            .base_asset(&symbol)
            .ok_or_else(|| ExchangeError::UnknownSymbol(symbol.clone()))?
            .to_string();

        let mut book = self.book.write().await;

        // Buy quantity is quote notional, sell quantity is base units
        let (executed_qty, quote_qty) = match side {
            OrderSide::Buy => {
                debit(&mut book.balances, &self.quote_asset, quantity)?;
                let filled = quantity / price;
                *book.balances.entry(base).or_insert(0.0) += filled;
                (filled, quantity)
            }
            OrderSide::Sell => {
                debit(&mut book.balances, &base, quantity)?;
                let proceeds = quantity * price;
                *book.balances.entry(self.quote_asset.clone()).or_insert(0.0) += proceeds;
                (quantity, proceeds)
            }
        };

        book.next_id += 1;
        let result = OrderResult {
            order_id: format!("paper-{}", book.next_id),
            symbol: symbol.clone(),
            side,
            executed_qty,
            quote_qty,
            status: "FILLED".to_string(),
        };
        book.fills.push(PaperFill {
            timestamp: Utc::now(),
            result: result.clone(),
            price,
        });

        tracing::info!(
            symbol = %symbol,
            side = %side,
            executed_qty,
            quote_qty,
            price,
            "PAPER FILL"
        );

        Ok(result)
    }

    async fn list_tradable_symbols(&self) -> Result<BTreeSet<String>, ExchangeError> {
        Ok(self.prices.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exchange() -> PaperExchange {
        PaperExchange::new("USDT", 500.0)
            .with_price("DOGEUSDT", 0.25)
            .with_price("SHIBUSDT", 0.00002)
    }

    #[tokio::test]
    async fn test_buy_moves_quote_into_base() {
        let paper = exchange();
        let result = paper.place_market_order("DOGEUSDT", OrderSide::Buy, 100.0).await.unwrap();

        assert_eq!(result.order_id, "paper-1");
        assert_relative_eq!(result.executed_qty, 400.0, epsilon = 1e-9);
        assert_relative_eq!(paper.get_free_balance("USDT").await.unwrap(), 400.0);
        assert_relative_eq!(paper.get_free_balance("DOGE").await.unwrap(), 400.0, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn test_sell_liquidates_base() {
        let paper = exchange().with_balance("DOGE", 1000.0);
        let result = paper.place_market_order("DOGEUSDT", OrderSide::Sell, 1000.0).await.unwrap();

        assert_relative_eq!(result.quote_qty, 250.0);
        assert_relative_eq!(paper.get_free_balance("DOGE").await.unwrap(), 0.0);
        assert_relative_eq!(paper.get_free_balance("USDT").await.unwrap(), 750.0);
    }

    #[tokio::test]
    async fn test_insufficient_balance_rejected() {
        let paper = exchange();
        let result = paper.place_market_order("DOGEUSDT", OrderSide::Buy, 600.0).await;

        assert!(matches!(result, Err(ExchangeError::InsufficientBalance { .. })));
        assert!(paper.fills().await.is_empty());
        assert_relative_eq!(paper.get_free_balance("USDT").await.unwrap(), 500.0);
    }

    #[tokio::test]
    async fn test_unknown_pair_rejected() {
        let paper = exchange();
        let result = paper.place_market_order("PEPEUSDT", OrderSide::Buy, 10.0).await;
        assert!(matches!(result, Err(ExchangeError::UnknownSymbol(_))));
    }

    #[tokio::test]
    async fn test_lists_priced_pairs() {
        let symbols = exchange().list_tradable_symbols().await.unwrap();
        assert_eq!(symbols.into_iter().collect::<Vec<_>>(), vec!["DOGEUSDT", "SHIBUSDT"]);
    }

    #[tokio::test]
    async fn test_fill_log_records_orders() {
        let paper = exchange();
        paper.place_market_order("DOGEUSDT", OrderSide::Buy, 50.0).await.unwrap();
        paper.place_market_order("SHIBUSDT", OrderSide::Buy, 20.0).await.unwrap();

        let fills = paper.fills().await;
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[1].result.order_id, "paper-2");
        assert_relative_eq!(fills[1].price, 0.00002);
    }
}
