//! Ask (sell) side of the order book
//!
//! Mirror of the bid side: the lowest ask is consumed first.

use std::collections::BTreeMap;
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::Side;

use super::price_level::PriceLevel;
use super::OrderBookLevel;

#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Rest an order at its limit price, behind earlier arrivals
    pub fn insert(
        &mut self,
        price: Price,
        order_id: OrderId,
        account_id: AccountId,
        remaining: Quantity,
    ) {
        self.levels
            .entry(price)
            .or_default()
            .enqueue(order_id, account_id, remaining);
    }

    /// Remove a resting order; true if it was found at that price
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> bool {
        if let Some(level) = self.levels.get_mut(&price) {
            if level.withdraw(order_id).is_some() {
                if level.is_empty() {
                    self.levels.remove(&price);
                }
                return true;
            }
        }
        false
    }

    /// Lowest ask price in the book
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// The next order a buy taker would match: front of the lowest level
    pub(crate) fn best_entry(&self) -> Option<(Price, OrderId, AccountId, Quantity)> {
        self.levels
            .iter()
            .next()
            .and_then(|(price, level)| level.front().map(|(id, account, qty)| (*price, id, account, qty)))
    }

    /// Apply a fill to the front of the level at `price`, dropping the level
    /// once empty
    pub(crate) fn fill_front(&mut self, price: Price, quantity: Quantity) {
        if let Some(level) = self.levels.get_mut(&price) {
            level.fill_front(quantity);
            if level.is_empty() {
                self.levels.remove(&price);
            }
        }
    }

    /// Top `depth` levels, best first
    pub fn depth(&self, depth: usize) -> Vec<OrderBookLevel> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| OrderBookLevel {
                side: Side::Sell,
                price: *price,
                quantity: level.total_quantity(),
                order_count: level.order_count(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
