//! Immutable trade records
//!
//! A trade is never mutated or deleted once created; the trade history is the
//! sole source of historical price and volume truth, including the last-trade
//! price used to size market-buy reservations.

use crate::ids::{AccountId, MarketId, OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed match between a resting maker order and an incoming taker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    /// Per-market monotonic sequence for deterministic ordering
    pub sequence: u64,
    pub pair: MarketId,

    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker_account_id: AccountId,
    pub taker_account_id: AccountId,

    /// Side of the incoming (taker) order
    pub taker_side: Side,
    /// Execution price: always the maker's price
    pub price: Price,
    pub quantity: Quantity,

    /// Fees denominated in the quote asset, already rounded
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,

    pub executed_at: i64, // Unix nanos
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        pair: MarketId,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker_account_id: AccountId,
        taker_account_id: AccountId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        maker_fee: Decimal,
        taker_fee: Decimal,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            pair,
            maker_order_id,
            taker_order_id,
            maker_account_id,
            taker_account_id,
            taker_side,
            price,
            quantity,
            maker_fee,
            taker_fee,
            executed_at,
        }
    }

    /// Notional value in quote units (price × quantity)
    pub fn trade_value(&self) -> Decimal {
        self.quantity.as_decimal() * self.price.as_decimal()
    }

    /// Total fee leaked to the operator on this trade
    pub fn total_fees(&self) -> Decimal {
        self.maker_fee + self.taker_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade::new(
            7,
            MarketId::new("BTC/USDT"),
            OrderId::new(),
            OrderId::new(),
            AccountId::new(),
            AccountId::new(),
            Side::Buy,
            Price::from_u64(50000),
            Quantity::from_str("0.5").unwrap(),
            Decimal::from(5),
            Decimal::from(25),
            1_708_123_456_789_000_000,
        )
    }

    #[test]
    fn test_trade_value() {
        let trade = sample_trade();
        assert_eq!(trade.trade_value(), Decimal::from(25000));
    }

    #[test]
    fn test_total_fees() {
        let trade = sample_trade();
        assert_eq!(trade.total_fees(), Decimal::from(30));
    }

    #[test]
    fn test_trade_serialization() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }
}
