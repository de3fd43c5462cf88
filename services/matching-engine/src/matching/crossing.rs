//! Crossing detection
//!
//! A taker accepts a maker price when its own limit does not forbid it.
//! Market orders carry no limit and accept any maker price; the execution
//! price is always the maker's.

use types::numeric::Price;
use types::order::Side;

/// Whether an incoming order with `limit` will trade at `maker_price`
pub fn taker_accepts(taker_side: Side, limit: Option<Price>, maker_price: Price) -> bool {
    match (taker_side, limit) {
        (_, None) => true,
        (Side::Buy, Some(limit)) => limit >= maker_price,
        (Side::Sell, Some(limit)) => limit <= maker_price,
    }
}
