use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{OrderSide, Post};
use super::exchange::{ExchangeClient, ExchangeError, OrderResult};
use super::social::{SocialError, SocialMediaClient};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Social source that serves canned posts and records every request.
///
/// Queries and accounts without a configured response return no posts.
#[derive(Debug, Default, Clone)]
pub struct FakeSocialClient {
    searches: Arc<Mutex<HashMap<String, Result<Vec<Post>, String>>>>,
    accounts: Arc<Mutex<HashMap<String, Result<Vec<Post>, String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSocialClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set posts returned for a search query
    pub fn with_search(self, query: &str, posts: Vec<Post>) -> Self {
        lock(&self.searches).insert(query.to_string(), Ok(posts));
        self
    }

    /// Builder method to make a search query fail
    pub fn with_search_failure(self, query: &str, message: &str) -> Self {
        lock(&self.searches).insert(query.to_string(), Err(message.to_string()));
        self
    }

    /// Builder method to set posts returned for an account
    pub fn with_account(self, account: &str, posts: Vec<Post>) -> Self {
        lock(&self.accounts).insert(account.to_string(), Ok(posts));
        self
    }

    /// Builder method to make an account lookup fail
    pub fn with_account_failure(self, account: &str, message: &str) -> Self {
        lock(&self.accounts).insert(account.to_string(), Err(message.to_string()));
        self
    }

    /// All recorded calls, formatted as `search:<query>` or `account:<id>`
    pub fn get_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl SocialMediaClient for FakeSocialClient {
    async fn search_recent_posts(
        &self,
        query: &str,
        _since: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<Post>, SocialError> {
        lock(&self.calls).push(format!("search:{}", query));
        match lock(&self.searches).get(query) {
            Some(Ok(posts)) => Ok(posts.iter().take(max_results as usize).cloned().collect()),
            Some(Err(msg)) => Err(SocialError::ApiError(msg.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn get_account_posts(
        &self,
        account_id: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<Post>, SocialError> {
        lock(&self.calls).push(format!("account:{}", account_id));
        match lock(&self.accounts).get(account_id) {
            Some(Ok(posts)) => Ok(posts.clone()),
            Some(Err(msg)) => Err(SocialError::AccountNotFound(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Exchange that reports fixed balances and records submitted orders
/// without moving any funds.
#[derive(Debug, Default, Clone)]
pub struct FakeExchange {
    balances: Arc<Mutex<HashMap<String, f64>>>,
    symbols: Arc<Mutex<BTreeSet<String>>>,
    failing_balances: Arc<Mutex<BTreeSet<String>>>,
    reject_orders: Arc<Mutex<bool>>,
    orders: Arc<Mutex<Vec<(String, OrderSide, f64)>>>,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, asset: &str, free: f64) -> Self {
        lock(&self.balances).insert(asset.to_string(), free);
        self
    }

    pub fn with_symbols(self, symbols: &[&str]) -> Self {
        lock(&self.symbols).extend(symbols.iter().map(|s| s.to_string()));
        self
    }

    /// Balance lookups for `asset` fail with an API error
    pub fn with_failing_balance(self, asset: &str) -> Self {
        lock(&self.failing_balances).insert(asset.to_string());
        self
    }

    /// Every order submission fails
    pub fn rejecting_orders(self) -> Self {
        *lock(&self.reject_orders) = true;
        self
    }

    /// Orders accepted so far as (symbol, side, quantity)
    pub fn get_orders(&self) -> Vec<(String, OrderSide, f64)> {
        lock(&self.orders).clone()
    }
}

#[async_trait]
impl ExchangeClient for FakeExchange {
    async fn get_free_balance(&self, asset: &str) -> Result<f64, ExchangeError> {
        if lock(&self.failing_balances).contains(asset) {
            return Err(ExchangeError::ApiError(format!("balance lookup failed for {}", asset)));
        }
        Ok(lock(&self.balances).get(asset).copied().unwrap_or(0.0))
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<OrderResult, ExchangeError> {
        if *lock(&self.reject_orders) {
            return Err(ExchangeError::ApiError("order rejected".to_string()));
        }
        let mut orders = lock(&self.orders);
        orders.push((symbol.to_string(), side, quantity));
        Ok(OrderResult {
            order_id: format!("fake-{}", orders.len()),
            symbol: symbol.to_string(),
            side,
            executed_qty: quantity,
            quote_qty: quantity,
            status: "FILLED".to_string(),
        })
    }

    async fn list_tradable_symbols(&self) -> Result<BTreeSet<String>, ExchangeError> {
        Ok(lock(&self.symbols).clone())
    }
}
