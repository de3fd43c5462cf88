//! FIFO queue of orders resting at one price
//!
//! Arrival order is the tie-break within a price: the matching loop always
//! consumes the front entry first, which is the oldest order at that price.

use std::collections::VecDeque;
use types::ids::{AccountId, OrderId};
use types::numeric::Quantity;

/// Entry in the queue; the full order record lives with the owning market
#[derive(Debug, Clone)]
struct RestingEntry {
    order_id: OrderId,
    account_id: AccountId,
    remaining: Quantity,
}

/// All orders resting at a single price, oldest first
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    queue: VecDeque<RestingEntry>,
    total: Quantity,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            total: Quantity::zero(),
        }
    }

    /// Append an order at the back of the queue
    pub fn enqueue(&mut self, order_id: OrderId, account_id: AccountId, remaining: Quantity) {
        self.queue.push_back(RestingEntry {
            order_id,
            account_id,
            remaining,
        });
        self.total = self.total + remaining;
    }

    /// The oldest entry at this price: (order id, account, remaining quantity)
    pub fn front(&self) -> Option<(OrderId, AccountId, Quantity)> {
        self.queue
            .front()
            .map(|entry| (entry.order_id, entry.account_id, entry.remaining))
    }

    /// Reduce the front entry by a fill, dequeuing it once exhausted
    ///
    /// A fill larger than the front entry consumes only that entry; the
    /// matching loop never asks for more than the front's remaining quantity.
    pub fn fill_front(&mut self, quantity: Quantity) {
        if let Some(entry) = self.queue.front_mut() {
            let consumed = entry.remaining.min(quantity);
            entry.remaining = entry.remaining.saturating_sub(consumed);
            if entry.remaining.is_zero() {
                self.queue.pop_front();
            }
            self.total = self.total.saturating_sub(consumed);
        }
    }

    /// Remove an order wherever it sits in the queue
    ///
    /// Returns the remaining quantity it held, or None if absent
    pub fn withdraw(&mut self, order_id: &OrderId) -> Option<Quantity> {
        let position = self
            .queue
            .iter()
            .position(|entry| &entry.order_id == order_id)?;
        let entry = self.queue.remove(position)?;
        self.total = self.total.saturating_sub(entry.remaining);
        Some(entry.remaining)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Sum of remaining quantities across the queue
    pub fn total_quantity(&self) -> Quantity {
        self.total
    }

    pub fn order_count(&self) -> usize {
        self.queue.len()
    }
}
