//! Binance Spot Client
//!
//! Signed REST client (HMAC-SHA256) for balances, market orders and symbol
//! metadata.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use sha2::Sha256;
use tokio::sync::RwLock;

use crate::domain::OrderSide;
use crate::ports::exchange::{ExchangeClient, ExchangeError, OrderResult};
use super::types::{
    floor_to_step, format_quantity, AccountResponse, ApiErrorBody, ExchangeInfoResponse,
    OrderResponse, SymbolInfo,
};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Signed request validity window
    pub recv_window_ms: u64,
    pub timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.binance.com".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            recv_window_ms: 5000,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinanceClient {
    config: BinanceConfig,
    http: Client,
    symbols: Arc<RwLock<HashMap<String, SymbolInfo>>>,
}

impl BinanceClient {
    pub fn new(api_key: String, api_secret: String) -> Result<Self, ExchangeError> {
        Self::with_config(BinanceConfig {
            api_key,
            api_secret,
            ..BinanceConfig::default()
        })
    }

    pub fn with_config(config: BinanceConfig) -> Result<Self, ExchangeError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(ExchangeError::AuthError("API key and secret are required".into()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExchangeError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http,
            symbols: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    /// Hex HMAC-SHA256 of the query string
    fn sign(&self, query: &str) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(self.config.api_secret.as_bytes())
            .map_err(|e| ExchangeError::AuthError(format!("Invalid API secret: {}", e)))?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Append timestamp/recvWindow and signature to `params`
    fn signed_query(&self, params: &[(&str, String)]) -> Result<String, ExchangeError> {
        let mut query = encode_params(params);
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&format!(
            "recvWindow={}&timestamp={}",
            self.config.recv_window_ms,
            Self::timestamp_ms()
        ));
        let signature = self.sign(&query)?;
        Ok(format!("{}&signature={}", query, signature))
    }

    async fn signed_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}?{}", self.config.api_base_url, path, self.signed_query(params)?);
        let response = self
            .http
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ExchangeError::ApiError(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn public_request<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ExchangeError::ApiError(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ExchangeError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| format!("{} (code {})", body.msg, body.code))
                .unwrap_or(text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExchangeError::AuthError(detail),
                _ => ExchangeError::ApiError(format!("API error {}: {}", status, detail)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ExchangeError::ApiError(format!("Failed to parse response: {}", e)))
    }

    /// Refresh the symbol metadata cache from exchangeInfo
    pub async fn refresh_symbols(&self) -> Result<usize, ExchangeError> {
        let info: ExchangeInfoResponse = self.public_request("/api/v3/exchangeInfo", &[]).await?;
        let mut cache = self.symbols.write().await;
        cache.clear();
        for symbol in info.symbols {
            cache.insert(symbol.symbol.clone(), symbol);
        }
        tracing::debug!("Cached metadata for {} symbols", cache.len());
        Ok(cache.len())
    }

    /// Metadata for one symbol, fetched on cache miss
    pub async fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, ExchangeError> {
        if let Some(info) = self.symbols.read().await.get(symbol) {
            return Ok(info.clone());
        }

        let info: ExchangeInfoResponse = self
            .public_request("/api/v3/exchangeInfo", &[("symbol", symbol.to_string())])
            .await?;
        let found = info
            .symbols
            .into_iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| ExchangeError::UnknownSymbol(symbol.to_string()))?;

        self.symbols.write().await.insert(found.symbol.clone(), found.clone());
        Ok(found)
    }
}

fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn get_free_balance(&self, asset: &str) -> Result<f64, ExchangeError> {
        let account: AccountResponse = self
            .signed_request(Method::GET, "/api/v3/account", &[("omitZeroBalances", "true".to_string())])
            .await?;

        match account.balances.iter().find(|b| b.asset == asset) {
            Some(balance) => balance.free.parse().map_err(|e| {
                ExchangeError::ApiError(format!("Bad balance '{}' for {}: {}", balance.free, asset, e))
            }),
            None => Ok(0.0),
        }
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

        let mut params = vec![
            ("symbol", symbol.to_string()),
            ("side", side.as_str().to_string()),
            ("type", "MARKET".to_string()),
            ("newOrderRespType", "RESULT".to_string()),
        ];

        match side {
            // Buys are sized in quote currency
            OrderSide::Buy => params.push(("quoteOrderQty", format_quantity(quantity))),
            OrderSide::Sell => {
                let info = self.symbol_info(symbol).await?;
                let qty = info.step_size().map_or(quantity, |step| floor_to_step(quantity, step));
                if let Some(min) = info.min_qty() {
                    if qty < min {
                        return Err(ExchangeError::InvalidParameters(format!(
                            "sell quantity {} below LOT_SIZE minimum {} for {}",
                            qty, min, symbol
                        )));
                    }
                }
                params.push(("quantity", format_quantity(qty)));
            }
        }

        let order: OrderResponse = self.signed_request(Method::POST, "/api/v3/order", &params).await?;
        let (executed_qty, quote_qty) = order.filled()?;

        Ok(OrderResult {
            order_id: order.order_id.to_string(),
            symbol: order.symbol,
            side,
            executed_qty,
            quote_qty,
            status: order.status,
        })
    }

    async fn list_tradable_symbols(&self) -> Result<BTreeSet<String>, ExchangeError> {
        self.refresh_symbols().await?;
        let cache = self.symbols.read().await;
        Ok(cache
            .values()
            .filter(|s| s.is_trading())
            .map(|s| s.symbol.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BinanceClient {
        BinanceClient::new("key".to_string(), "secret".to_string()).unwrap()
    }

    #[test]
    fn test_requires_credentials() {
        assert!(matches!(
            BinanceClient::new(String::new(), "secret".to_string()),
            Err(ExchangeError::AuthError(_))
        ));
    }

    #[test]
    fn test_sign_matches_reference_vector() {
        // Example from the Binance API documentation
        let client = BinanceClient::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A".to_string(),
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j".to_string(),
        )
        .unwrap();
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            client.sign(query).unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signed_query_layout() {
        let query = client().signed_query(&[("symbol", "DOGEUSDT".to_string())]).unwrap();
        assert!(query.starts_with("symbol=DOGEUSDT&recvWindow=5000&timestamp="));
        let signature = query.rsplit("&signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_quantity() {
        let result = client().place_market_order("DOGEUSDT", OrderSide::Buy, 0.0).await;
        assert!(matches!(result, Err(ExchangeError::InvalidParameters(_))));
    }
}
