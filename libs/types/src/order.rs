//! Order lifecycle types
//!
//! An order is owned exclusively by the submitting account and mutated only by
//! the matching engine and the cancellation path.

use crate::ids::{AccountId, MarketId, OrderId};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type
///
/// Only market and limit orders participate in matching; stop variants are
/// accepted and funded but wait for an external trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl OrderType {
    /// Whether this type carries an explicit limit price
    pub fn has_limit_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    /// Whether this type waits for a stop trigger
    pub fn has_stop_trigger(&self) -> bool {
        matches!(self, OrderType::Stop | OrderType::StopLimit)
    }
}

/// Order lifecycle status
///
/// `pending → {partially_filled → filled | cancelled} | rejected | cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted, no fills yet
    Pending,
    /// Some quantity filled, remainder open
    PartiallyFilled,
    /// Completely filled (terminal)
    Filled,
    /// Cancelled by the owner or by the engine (terminal)
    Cancelled,
    /// Market order that found no liquidity (terminal)
    Rejected,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// Open orders contribute to the book and may still fill
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::PartiallyFilled)
    }

    /// Wire-format name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PartiallyFilled => "partially_filled",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
        }
    }
}

/// Complete order record
///
/// Invariant: `filled_quantity + remaining_quantity == quantity` at all times
/// before cancellation; cancellation freezes `remaining_quantity` at its last
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub pair: MarketId,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: Quantity,
    /// Limit price; None for market and stop-market orders
    pub price: Option<Price>,
    /// Trigger price for stop variants
    pub stop_price: Option<Price>,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Accumulated fee paid, denominated in the quote asset
    pub fee: Decimal,
    /// Per-unit quote price the buy-side reservation was sized at.
    /// Cancellation and settlement release reserved funds against this price,
    /// never the execution price. None for sells (reserved in base units).
    pub reserve_price: Option<Price>,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    /// Set when the order first reaches a fully filled state
    pub executed_at: Option<i64>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        account_id: AccountId,
        pair: MarketId,
        order_type: OrderType,
        side: Side,
        quantity: Quantity,
        price: Option<Price>,
        stop_price: Option<Price>,
        reserve_price: Option<Price>,
        created_at: i64,
    ) -> Self {
        Self {
            order_id,
            account_id,
            pair,
            order_type,
            side,
            quantity,
            price,
            stop_price,
            filled_quantity: Quantity::zero(),
            remaining_quantity: quantity,
            fee: Decimal::ZERO,
            reserve_price,
            status: OrderStatus::Pending,
            created_at,
            executed_at: None,
        }
    }

    /// Check quantity invariant: filled + remaining = total
    pub fn check_invariant(&self) -> bool {
        self.filled_quantity.as_decimal() + self.remaining_quantity.as_decimal()
            == self.quantity.as_decimal()
    }

    pub fn is_filled(&self) -> bool {
        self.filled_quantity == self.quantity
    }

    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    pub fn can_cancel(&self) -> bool {
        self.status.is_open()
    }

    /// Funds still reserved for this order: quote units for buys (priced at
    /// `reserve_price`), base units for sells
    pub fn remaining_reservation(&self) -> Decimal {
        match self.side {
            Side::Buy => {
                let unit = self.reserve_price.map(|p| p.as_decimal()).unwrap_or_default();
                self.remaining_quantity.as_decimal() * unit
            }
            Side::Sell => self.remaining_quantity.as_decimal(),
        }
    }

    /// Apply a fill, accumulating the fee and adjusting status
    ///
    /// # Panics
    /// Panics if the fill would exceed the order quantity
    pub fn apply_fill(&mut self, fill_quantity: Quantity, fee: Decimal, timestamp: i64) {
        let remaining = self
            .remaining_quantity
            .checked_sub(fill_quantity)
            .expect("fill would exceed order quantity");

        self.filled_quantity = self.filled_quantity + fill_quantity;
        self.remaining_quantity = remaining;
        self.fee += fee;

        if self.is_filled() {
            self.status = OrderStatus::Filled;
            self.executed_at.get_or_insert(timestamp);
        } else {
            self.status = OrderStatus::PartiallyFilled;
        }

        debug_assert!(self.check_invariant());
    }

    /// Mark the order cancelled, freezing the remaining quantity
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state; callers check
    /// `can_cancel` and surface `InvalidState` first
    pub fn cancel(&mut self) {
        assert!(self.can_cancel(), "cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
    }

    /// Mark a no-liquidity market order rejected
    pub fn reject(&mut self) {
        self.status = OrderStatus::Rejected;
    }
}
