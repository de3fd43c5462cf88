//! Order book infrastructure
//!
//! Bid and ask sides over sorted price levels. The book holds lightweight
//! (order id, account, remaining quantity) entries; full order records live
//! with the market that owns the book.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::PriceLevel;

use serde::{Deserialize, Serialize};
use types::numeric::{Price, Quantity};
use types::order::Side;

/// One aggregated price level in a depth snapshot
///
/// Derived view only; the book itself is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: usize,
}
