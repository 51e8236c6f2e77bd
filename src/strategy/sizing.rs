//! Position Sizing
//!
//! Buys commit `position_fraction` of the free quote balance per unit of
//! strength, capped at `max_trade_amount`, and only when the free quote
//! balance is above `min_trade_amount`. Sells liquidate the whole free base
//! balance. No lot-size rounding happens here.

use crate::domain::{
    BalanceSnapshot, NoOpReason, OrderInstruction, OrderSide, Signal, SignalAction, SizingDecision,
    TokenProfile,
};
use super::params::SizingConfig;

pub fn size(
    signal: &Signal,
    token: &TokenProfile,
    balances: &BalanceSnapshot,
    config: &SizingConfig,
) -> SizingDecision {
    match signal.action {
        SignalAction::Hold => SizingDecision::NoOp(NoOpReason::NoAction),
        SignalAction::Buy => size_buy(signal, token, balances, config),
        SignalAction::Sell => size_sell(token, balances),
    }
}

fn size_buy(
    signal: &Signal,
    token: &TokenProfile,
    balances: &BalanceSnapshot,
    config: &SizingConfig,
) -> SizingDecision {
    if signal.strength <= 0 {
        return SizingDecision::NoOp(NoOpReason::ZeroStrength);
    }

    let free = balances.quote_free;
    if free <= config.min_trade_amount {
        return SizingDecision::NoOp(NoOpReason::InsufficientQuoteBalance {
            free,
            minimum: config.min_trade_amount,
        });
    }

    let notional = (free * config.position_fraction * signal.strength as f64)
        .min(config.max_trade_amount);

    SizingDecision::Order(OrderInstruction {
        symbol: token.pair_symbol(),
        side: OrderSide::Buy,
        quantity: notional,
    })
}

fn size_sell(token: &TokenProfile, balances: &BalanceSnapshot) -> SizingDecision {
    if balances.base_free <= 0.0 {
        return SizingDecision::NoOp(NoOpReason::NoBaseBalance);
    }

    SizingDecision::Order(OrderInstruction {
        symbol: token.pair_symbol(),
        side: OrderSide::Sell,
        quantity: balances.base_free,
    })
}
