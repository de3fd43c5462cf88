//! Trade events
//!
//! Emitted after the market lock is released, fire-and-forget: a sink that
//! misbehaves can never roll back a settled trade.

use serde::{Deserialize, Serialize};
use types::ids::{AccountId, OrderId, TradeId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// Published for every executed trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExecutedEvent {
    pub trade_id: TradeId,
    pub sequence: u64,
    pub symbol: String,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker_account_id: AccountId,
    pub taker_account_id: AccountId,
    pub taker_side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub executed_at: i64,
}

impl From<&Trade> for TradeExecutedEvent {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id,
            sequence: trade.sequence,
            symbol: trade.pair.as_str().to_string(),
            maker_order_id: trade.maker_order_id,
            taker_order_id: trade.taker_order_id,
            maker_account_id: trade.maker_account_id,
            taker_account_id: trade.taker_account_id,
            taker_side: trade.taker_side,
            price: trade.price,
            quantity: trade.quantity,
            executed_at: trade.executed_at,
        }
    }
}

/// Receives trade events after settlement
pub trait TradeSink: Send + Sync {
    fn on_trade(&self, event: &TradeExecutedEvent);
}
