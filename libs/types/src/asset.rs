//! Asset and trading pair reference data
//!
//! Both structures are immutable configuration: created once at exchange
//! construction and only read afterwards.

use crate::ids::MarketId;
use crate::numeric::round_half_up;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tradable asset and its fee schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Symbol, e.g. "BTC"
    pub symbol: String,
    /// Decimal places amounts of this asset are rounded to
    pub precision: u32,
    /// Smallest quantity accepted in an order
    pub min_quantity: Decimal,
    /// Fee rate charged to the resting side of a trade
    pub maker_fee_rate: Decimal,
    /// Fee rate charged to the incoming side of a trade
    pub taker_fee_rate: Decimal,
}

impl Asset {
    pub fn new(
        symbol: impl Into<String>,
        precision: u32,
        min_quantity: Decimal,
        maker_fee_rate: Decimal,
        taker_fee_rate: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            precision,
            min_quantity,
            maker_fee_rate,
            taker_fee_rate,
        }
    }

    /// Round an amount denominated in this asset to its precision, half-up
    pub fn round_amount(&self, amount: Decimal) -> Decimal {
        round_half_up(amount, self.precision)
    }
}

/// An ordered (base, quote) pair of assets open for trading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    /// Unique symbol in BASE/QUOTE form
    pub symbol: MarketId,
    /// Base asset symbol (the asset being bought or sold)
    pub base: String,
    /// Quote asset symbol (the asset prices are denominated in)
    pub quote: String,
    /// Inactive pairs reject new orders
    pub active: bool,
    /// Decimal places for prices on this pair
    pub price_precision: u32,
    /// Decimal places for quantities on this pair
    pub quantity_precision: u32,
    /// Lowest accepted limit price
    pub min_price: Decimal,
    /// Highest accepted limit price
    pub max_price: Decimal,
}

impl TradingPair {
    pub fn new(
        base: impl Into<String>,
        quote: impl Into<String>,
        price_precision: u32,
        quantity_precision: u32,
        min_price: Decimal,
        max_price: Decimal,
    ) -> Self {
        let base = base.into();
        let quote = quote.into();
        Self {
            symbol: MarketId::new(format!("{base}/{quote}")),
            base,
            quote,
            active: true,
            price_precision,
            quantity_precision,
            min_price,
            max_price,
        }
    }

    /// Check a limit price against this pair's configured bounds
    pub fn price_in_bounds(&self, price: Decimal) -> bool {
        price >= self.min_price && price <= self.max_price
    }

    /// Check that a price carries no more decimal places than this pair allows
    pub fn price_matches_precision(&self, price: Decimal) -> bool {
        price.normalize().scale() <= self.price_precision
    }

    /// Check that a quantity carries no more decimal places than this pair allows
    pub fn quantity_matches_precision(&self, quantity: Decimal) -> bool {
        quantity.normalize().scale() <= self.quantity_precision
    }
}
