//! Binance spot REST types

use serde::Deserialize;

use crate::ports::exchange::ExchangeError;

#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub balances: Vec<AssetBalance>,
}

#[derive(Debug, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: u64,
    pub status: String,
    pub executed_qty: String,
    pub cummulative_quote_qty: String,
}

impl OrderResponse {
    /// Filled base quantity and quote amount
    pub fn filled(&self) -> Result<(f64, f64), ExchangeError> {
        Ok((
            parse_amount("executedQty", &self.executed_qty)?,
            parse_amount("cummulativeQuoteQty", &self.cummulative_quote_qty)?,
        ))
    }
}

fn parse_amount(field: &str, value: &str) -> Result<f64, ExchangeError> {
    value
        .parse()
        .map_err(|e| ExchangeError::ApiError(format!("Bad {} '{}' in order response: {}", field, value, e)))
}

#[derive(Debug, Deserialize)]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize {
        min_qty: String,
        max_qty: String,
        step_size: String,
    },
    #[serde(other)]
    Other,
}

/// Error body returned on 4xx responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

impl SymbolInfo {
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }

    /// LOT_SIZE step size, if the symbol declares one
    pub fn step_size(&self) -> Option<f64> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::LotSize { step_size, .. } => step_size.parse().ok(),
            SymbolFilter::Other => None,
        })
    }

    pub fn min_qty(&self) -> Option<f64> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::LotSize { min_qty, .. } => min_qty.parse().ok(),
            SymbolFilter::Other => None,
        })
    }
}

/// Floor `quantity` to a multiple of `step`
pub fn floor_to_step(quantity: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return quantity;
    }
    // Relative nudge so 0.3 / 0.1 style float error doesn't drop a step;
    // the result never exceeds `quantity`
    let steps = quantity / step;
    ((steps + steps.abs() * 4.0 * f64::EPSILON).floor() * step).min(quantity)
}

/// Decimal string with at most 8 fractional digits and no trailing zeros
pub fn format_quantity(quantity: f64) -> String {
    let formatted = format!("{:.8}", quantity);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbol_filters() {
        let json = r#"{
            "symbols": [{
                "symbol": "DOGEUSDT",
                "status": "TRADING",
                "baseAsset": "DOGE",
                "quoteAsset": "USDT",
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "0.00001", "maxPrice": "1000", "tickSize": "0.00001"},
                    {"filterType": "LOT_SIZE", "minQty": "1.00000000", "maxQty": "9000000.00000000", "stepSize": "1.00000000"}
                ]
            }]
        }"#;

        let info: ExchangeInfoResponse = serde_json::from_str(json).unwrap();
        let doge = &info.symbols[0];
        assert!(doge.is_trading());
        assert_eq!(doge.step_size(), Some(1.0));
        assert_eq!(doge.min_qty(), Some(1.0));
    }

    #[test]
    fn test_floor_to_step() {
        assert_eq!(floor_to_step(1234.987, 1.0), 1234.0);
        assert!((floor_to_step(0.3, 0.1) - 0.3).abs() < 1e-12);
        assert_eq!(floor_to_step(5.5, 0.0), 5.5);
    }

    #[test]
    fn test_floor_to_step_never_rounds_up() {
        assert_eq!(floor_to_step(0.99999999999, 1.0), 0.0);
        assert_eq!(floor_to_step(2.9999999, 1.0), 2.0);
        assert!(floor_to_step(0.7, 0.1) <= 0.7);
        assert!(floor_to_step(99999.99999999, 0.00000001) <= 99999.99999999);
    }

    #[test]
    fn test_order_response_fills() {
        let json = r#"{"symbol": "DOGEUSDT", "orderId": 28, "status": "FILLED",
            "executedQty": "400.00000000", "cummulativeQuoteQty": "100.00000000"}"#;
        let order: OrderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(order.filled().unwrap(), (400.0, 100.0));
    }

    #[test]
    fn test_malformed_fill_is_error() {
        let json = r#"{"symbol": "DOGEUSDT", "orderId": 28, "status": "FILLED",
            "executedQty": "4OO", "cummulativeQuoteQty": "100"}"#;
        let order: OrderResponse = serde_json::from_str(json).unwrap();
        match order.filled() {
            Err(ExchangeError::ApiError(msg)) => assert!(msg.contains("executedQty")),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(100.0), "100");
        assert_eq!(format_quantity(0.123456789), "0.12345679");
        assert_eq!(format_quantity(12.5), "12.5");
        assert_eq!(format_quantity(0.0), "0");
    }
}
