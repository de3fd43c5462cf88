//! Trade construction and fee calculation
//!
//! Fees are charged in the quote asset on both sides of a trade:
//! `fee = quantity × price × rate`, with the rates read from the base asset's
//! fee schedule and the resulting amount rounded half-up at the quote asset's
//! precision. The maker rate applies to the resting order, the taker rate to
//! the incoming one.

use rust_decimal::Decimal;
use types::asset::{Asset, TradingPair};
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// Maker and taker fees for a fill: base asset rates, quote asset units
pub(crate) fn compute_fees(
    base: &Asset,
    quote: &Asset,
    price: Price,
    quantity: Quantity,
) -> (Decimal, Decimal) {
    let trade_value = quantity.as_decimal() * price.as_decimal();
    let maker_fee = quote.round_amount(trade_value * base.maker_fee_rate);
    let taker_fee = quote.round_amount(trade_value * base.taker_fee_rate);
    (maker_fee, taker_fee)
}

/// Build the immutable trade record for a match at the maker's price
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    sequence: u64,
    pair: &TradingPair,
    base: &Asset,
    quote: &Asset,
    maker_order_id: OrderId,
    taker_order_id: OrderId,
    maker_account_id: AccountId,
    taker_account_id: AccountId,
    taker_side: Side,
    price: Price,
    quantity: Quantity,
    timestamp: i64,
) -> Trade {
    let (maker_fee, taker_fee) = compute_fees(base, quote, price, quantity);
    Trade::new(
        sequence,
        pair.symbol.clone(),
        maker_order_id,
        taker_order_id,
        maker_account_id,
        taker_account_id,
        taker_side,
        price,
        quantity,
        maker_fee,
        taker_fee,
        timestamp,
    )
}
