//! Trade settlement
//!
//! Turns one trade into four ledger legs and applies them atomically:
//!
//! - seller base: reserved drops by the traded quantity (the asset leaves)
//! - seller quote: available rises by `qty × price − seller_fee`
//! - buyer base: available rises by the traded quantity
//! - buyer quote: the reservation priced at `reserve_price` is released and
//!   `qty × price + buyer_fee` is charged from available, so any spread
//!   between the reservation price and the execution price flows back to the
//!   buyer's available balance
//!
//! Conservation per trade: base deltas sum to zero, quote deltas sum to
//! `−(maker_fee + taker_fee)`. Fees leave user wallets and are recorded on the
//! trade only.

use ledger::{Ledger, SettlementLeg};
use rust_decimal::Decimal;
use types::asset::TradingPair;
use types::errors::ExchangeError;
use types::order::{Order, Side};
use types::trade::Trade;

/// Settle one trade against the ledger and apply the fill to both orders
///
/// The ledger call is all-or-nothing; the order records are only touched after
/// it succeeds, so a settlement failure leaves both orders unfilled.
pub(crate) fn settle(
    ledger: &Ledger,
    pair: &TradingPair,
    trade: &Trade,
    maker: &mut Order,
    taker: &mut Order,
) -> Result<(), ExchangeError> {
    let quantity = trade.quantity.as_decimal();
    let gross = trade.trade_value();

    let (buyer, seller, buyer_fee, seller_fee) = match trade.taker_side {
        Side::Buy => (&*taker, &*maker, trade.taker_fee, trade.maker_fee),
        Side::Sell => (&*maker, &*taker, trade.maker_fee, trade.taker_fee),
    };
    let reserve_unit = buyer
        .reserve_price
        .expect("buy orders carry a reserve price")
        .as_decimal();

    let legs = [
        SettlementLeg {
            account_id: seller.account_id,
            asset: pair.base.clone(),
            release_reserved: quantity,
            available_delta: -quantity,
            reservation_ref: Some(seller.order_id.to_string()),
            fee: Decimal::ZERO,
            description: format!("Trade {} - Sell {}", trade.trade_id, pair.base),
        },
        SettlementLeg {
            account_id: seller.account_id,
            asset: pair.quote.clone(),
            release_reserved: Decimal::ZERO,
            available_delta: gross - seller_fee,
            reservation_ref: None,
            fee: seller_fee,
            description: format!("Trade {} - Receive {}", trade.trade_id, pair.quote),
        },
        SettlementLeg {
            account_id: buyer.account_id,
            asset: pair.base.clone(),
            release_reserved: Decimal::ZERO,
            available_delta: quantity,
            reservation_ref: None,
            fee: Decimal::ZERO,
            description: format!("Trade {} - Buy {}", trade.trade_id, pair.base),
        },
        SettlementLeg {
            account_id: buyer.account_id,
            asset: pair.quote.clone(),
            release_reserved: quantity * reserve_unit,
            available_delta: -(gross + buyer_fee),
            reservation_ref: Some(buyer.order_id.to_string()),
            fee: buyer_fee,
            description: format!("Trade {} - Pay {}", trade.trade_id, pair.quote),
        },
    ];
    ledger.settle_trade(&legs)?;

    maker.apply_fill(trade.quantity, trade.maker_fee, trade.executed_at);
    taker.apply_fill(trade.quantity, trade.taker_fee, trade.executed_at);
    Ok(())
}
