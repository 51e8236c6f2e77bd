use std::fmt;
use serde::{Deserialize, Serialize};

/// Market order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire representation used by the exchange API
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete market order to hand to the exchange.
///
/// `quantity` is quote-currency notional for buys and base-asset units for
/// sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInstruction {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
}

/// Free balances relevant to one token's pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BalanceSnapshot {
    pub quote_free: f64,
    pub base_free: f64,
}

impl BalanceSnapshot {
    pub fn new(quote_free: f64, base_free: f64) -> Self {
        Self { quote_free, base_free }
    }
}

/// Why the sizing stage declined to emit an order
#[derive(Debug, Clone, PartialEq)]
pub enum NoOpReason {
    NoAction,
    ZeroStrength,
    InsufficientQuoteBalance { free: f64, minimum: f64 },
    NoBaseBalance,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::NoAction => write!(f, "signal has no action"),
            NoOpReason::ZeroStrength => write!(f, "buy signal has zero strength"),
            NoOpReason::InsufficientQuoteBalance { free, minimum } => write!(
                f,
                "free quote balance {:.2} is not above minimum trade size {:.2}",
                free, minimum
            ),
            NoOpReason::NoBaseBalance => write!(f, "no base asset balance to sell"),
        }
    }
}

/// Output of the sizing stage
#[derive(Debug, Clone, PartialEq)]
pub enum SizingDecision {
    Order(OrderInstruction),
    NoOp(NoOpReason),
}

impl SizingDecision {
    pub fn order(&self) -> Option<&OrderInstruction> {
        match self {
            SizingDecision::Order(order) => Some(order),
            SizingDecision::NoOp(_) => None,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, SizingDecision::NoOp(_))
    }
}
