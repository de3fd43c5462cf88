//! Bid (buy) side of the order book
//!
//! Price levels sorted so the highest bid is consumed first. BTreeMap keys
//! give deterministic iteration; empty levels are removed eagerly so the best
//! level is always live.

use std::collections::BTreeMap;
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::Side;

use super::price_level::PriceLevel;
use super::OrderBookLevel;

#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
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

    /// Highest bid price in the book
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// The next order a sell taker would match: front of the highest level
    pub(crate) fn best_entry(&self) -> Option<(Price, OrderId, AccountId, Quantity)> {
        self.levels
            .iter()
            .next_back()
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
            .rev()
            .take(depth)
            .map(|(price, level)| OrderBookLevel {
                side: Side::Buy,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(s: &str) -> Quantity {
        Quantity::from_str(s).unwrap()
    }

    #[test]
    fn test_best_is_highest_price() {
        let mut book = BidBook::new();
        let account = AccountId::new();
        book.insert(Price::from_u64(50000), OrderId::new(), account, qty("1.0"));
        book.insert(Price::from_u64(51000), OrderId::new(), account, qty("2.0"));
        book.insert(Price::from_u64(49000), OrderId::new(), account, qty("1.5"));

        assert_eq!(book.best_price(), Some(Price::from_u64(51000)));
        let (price, _, _, remaining) = book.best_entry().unwrap();
        assert_eq!(price, Price::from_u64(51000));
        assert_eq!(remaining, qty("2.0"));
    }

    #[test]
    fn test_remove_drops_empty_level() {
        let mut book = BidBook::new();
        let order_id = OrderId::new();
        book.insert(Price::from_u64(50000), order_id, AccountId::new(), qty("1.0"));

        assert!(book.remove(&order_id, Price::from_u64(50000)));
        assert!(book.is_empty());
        assert!(!book.remove(&order_id, Price::from_u64(50000)));
    }

    #[test]
    fn test_fill_front_exhausts_level() {
        let mut book = BidBook::new();
        let price = Price::from_u64(50000);
        book.insert(price, OrderId::new(), AccountId::new(), qty("1.0"));
        book.insert(Price::from_u64(49000), OrderId::new(), AccountId::new(), qty("3.0"));

        book.fill_front(price, qty("1.0"));
        // Level at 50000 is gone, 49000 is now best
        assert_eq!(book.best_price(), Some(Price::from_u64(49000)));
    }

    #[test]
    fn test_depth_best_first() {
        let mut book = BidBook::new();
        let account = AccountId::new();
        book.insert(Price::from_u64(50000), OrderId::new(), account, qty("1.0"));
        book.insert(Price::from_u64(51000), OrderId::new(), account, qty("2.0"));
        book.insert(Price::from_u64(49000), OrderId::new(), account, qty("1.5"));
        book.insert(Price::from_u64(50000), OrderId::new(), account, qty("0.5"));

        let depth = book.depth(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].price, Price::from_u64(51000));
        assert_eq!(depth[1].price, Price::from_u64(50000));
        assert_eq!(depth[1].quantity, qty("1.5"));
        assert_eq!(depth[1].order_count, 2);
    }
}
