//! Exchange facade
//!
//! Owns one market (book + order store + trade log) per trading pair, each
//! behind its own mutex so matching on a pair is strictly serialized while
//! different pairs proceed in parallel. Every order is fully funded through
//! the ledger before it can touch a book; a failed reservation means the
//! order never existed.

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use types::asset::{Asset, TradingPair};
use types::errors::ExchangeError;
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};
use types::trade::Trade;

use crate::book::{AskBook, BidBook, OrderBookLevel};
use crate::events::{TradeExecutedEvent, TradeSink};
use crate::matching::{crossing, executor};
use crate::settlement;
use ledger::Ledger;

/// Cushion applied when sizing a market-buy reservation from the last trade
/// price: the reservation is `quantity × last_price × 1.01`, and whatever the
/// fills do not consume is returned at settlement
pub(crate) fn market_buy_reserve_buffer() -> Decimal {
    Decimal::new(101, 2)
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// All mutable state for one trading pair, guarded by one mutex
struct Market {
    bids: BidBook,
    asks: AskBook,
    /// Every order ever accepted on this pair, resting or not
    orders: HashMap<OrderId, Order>,
    /// Append-only trade log; the last entry is the market price
    trades: Vec<Trade>,
    sequence: u64,
}

impl Market {
    fn new() -> Self {
        Self {
            bids: BidBook::new(),
            asks: AskBook::new(),
            orders: HashMap::new(),
            trades: Vec::new(),
            sequence: 0,
        }
    }

    fn last_trade_price(&self) -> Option<Price> {
        self.trades.last().map(|trade| trade.price)
    }
}

/// Depth snapshot of one market, best levels first on both sides
#[derive(Debug, Clone)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

/// Spot exchange: order intake, matching, settlement and book queries
pub struct Exchange {
    ledger: Arc<Ledger>,
    assets: HashMap<String, Asset>,
    pairs: HashMap<String, TradingPair>,
    markets: DashMap<String, Arc<Mutex<Market>>>,
    sinks: Mutex<Vec<Arc<dyn TradeSink>>>,
}

impl Exchange {
    /// Create an exchange over the given reference data
    ///
    /// One market is created per pair up front; pairs and assets are frozen
    /// after construction.
    pub fn new(assets: Vec<Asset>, pairs: Vec<TradingPair>, ledger: Arc<Ledger>) -> Self {
        let markets = DashMap::new();
        for pair in &pairs {
            markets.insert(
                pair.symbol.as_str().to_string(),
                Arc::new(Mutex::new(Market::new())),
            );
        }
        Self {
            ledger,
            assets: assets
                .into_iter()
                .map(|asset| (asset.symbol.clone(), asset))
                .collect(),
            pairs: pairs
                .into_iter()
                .map(|pair| (pair.symbol.as_str().to_string(), pair))
                .collect(),
            markets,
            sinks: Mutex::new(Vec::new()),
        }
    }

    /// The ledger backing this exchange (deposits, balances, withdrawals)
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Register a trade event sink
    pub fn register_sink(&self, sink: Arc<dyn TradeSink>) {
        self.sinks.lock().expect("sink registry poisoned").push(sink);
    }

    fn pair(&self, symbol: &str) -> Result<&TradingPair, ExchangeError> {
        self.pairs.get(symbol).ok_or_else(|| ExchangeError::InvalidPair {
            symbol: symbol.to_string(),
        })
    }

    fn asset(&self, symbol: &str) -> Result<&Asset, ExchangeError> {
        self.assets.get(symbol).ok_or_else(|| ExchangeError::InvalidPair {
            symbol: symbol.to_string(),
        })
    }

    fn market(&self, symbol: &str) -> Result<Arc<Mutex<Market>>, ExchangeError> {
        self.markets
            .get(symbol)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ExchangeError::InvalidPair {
                symbol: symbol.to_string(),
            })
    }

    /// Submit an order: validate, reserve funds, match, settle, rest or reject
    ///
    /// Returns the order in its state after matching. Market orders that find
    /// no liquidity at all come back `rejected` with their reservation
    /// released; partially filled market orders keep the reservation backing
    /// their remainder and stay cancellable.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_order(
        &self,
        account_id: AccountId,
        symbol: &str,
        order_type: OrderType,
        side: Side,
        quantity: Quantity,
        price: Option<Price>,
        stop_price: Option<Price>,
    ) -> Result<Order, ExchangeError> {
        let pair = self.pair(symbol)?;
        if !pair.active {
            return Err(ExchangeError::InvalidPair {
                symbol: symbol.to_string(),
            });
        }
        let base = self.asset(&pair.base)?;
        let quote = self.asset(&pair.quote)?;

        if quantity.is_zero() {
            return Err(ExchangeError::InvalidQuantity {
                reason: "quantity must be positive".to_string(),
            });
        }
        if quantity.as_decimal() < base.min_quantity {
            return Err(ExchangeError::InvalidQuantity {
                reason: format!(
                    "quantity {quantity} below minimum {} for {}",
                    base.min_quantity, base.symbol
                ),
            });
        }
        if !pair.quantity_matches_precision(quantity.as_decimal()) {
            return Err(ExchangeError::InvalidQuantity {
                reason: format!(
                    "quantity {quantity} exceeds {} decimal places",
                    pair.quantity_precision
                ),
            });
        }

        let limit_price = if order_type.has_limit_price() {
            let limit = price.ok_or_else(|| ExchangeError::InvalidPrice {
                reason: "limit price required".to_string(),
            })?;
            if limit.is_zero() {
                return Err(ExchangeError::InvalidPrice {
                    reason: "limit price must be positive".to_string(),
                });
            }
            if !pair.price_in_bounds(limit.as_decimal()) {
                return Err(ExchangeError::InvalidPrice {
                    reason: format!(
                        "price {limit} outside bounds [{}, {}]",
                        pair.min_price, pair.max_price
                    ),
                });
            }
            if !pair.price_matches_precision(limit.as_decimal()) {
                return Err(ExchangeError::InvalidPrice {
                    reason: format!(
                        "price {limit} exceeds {} decimal places",
                        pair.price_precision
                    ),
                });
            }
            Some(limit)
        } else {
            None
        };
        let trigger_price = if order_type.has_stop_trigger() {
            let trigger = stop_price.ok_or_else(|| ExchangeError::InvalidPrice {
                reason: "stop price required".to_string(),
            })?;
            if trigger.is_zero() {
                return Err(ExchangeError::InvalidPrice {
                    reason: "stop price must be positive".to_string(),
                });
            }
            Some(trigger)
        } else {
            None
        };

        let market_arc = self.market(symbol)?;
        let mut market = market_arc.lock().expect("market mutex poisoned");

        let order_id = OrderId::new();
        let timestamp = now_nanos();

        // Size and take the reservation: quote for buys, base for sells.
        // A buy without a limit is priced off the last trade plus the buffer
        // and fails fast when the pair has never traded.
        let (reserve_asset, reserve_amount, reserve_price) = match side {
            Side::Buy => {
                let unit = match limit_price {
                    Some(limit) => limit,
                    None => {
                        let last = market.last_trade_price().ok_or_else(|| {
                            ExchangeError::InvalidPrice {
                                reason: format!("no market price available for {symbol}"),
                            }
                        })?;
                        Price::new(last.as_decimal() * market_buy_reserve_buffer())
                    }
                };
                (
                    pair.quote.clone(),
                    quantity.as_decimal() * unit.as_decimal(),
                    Some(unit),
                )
            }
            Side::Sell => (pair.base.clone(), quantity.as_decimal(), None),
        };
        self.ledger.reserve(
            account_id,
            &reserve_asset,
            reserve_amount,
            "Order reservation",
            &order_id.to_string(),
        )?;

        let mut order = Order::new(
            order_id,
            account_id,
            pair.symbol.clone(),
            order_type,
            side,
            quantity,
            limit_price,
            trigger_price,
            reserve_price,
            timestamp,
        );
        tracing::info!(
            order = %order_id,
            %account_id,
            pair = symbol,
            ?order_type,
            ?side,
            %quantity,
            "order accepted"
        );

        // Stop variants hold their funds and wait for an external trigger
        if order_type.has_stop_trigger() {
            market.orders.insert(order_id, order.clone());
            return Ok(order);
        }

        let (trades, settle_failure) = self.match_order(&mut market, pair, base, quote, &mut order);

        // The failed fill applied nothing, but the reservation sized at the
        // limit price leaves no headroom for the fee it could not pay. Give
        // back whatever still backs the remainder and retire the order so
        // no reservation can strand; fills that did settle keep their trades.
        if let Some(err) = settle_failure {
            self.ledger.release(
                account_id,
                &reserve_asset,
                order.remaining_reservation(),
                "settlement failed",
                &order_id.to_string(),
            )?;
            order.cancel();
            tracing::warn!(order = %order_id, pair = symbol, error = %err, "settlement failed, order unwound");
            market.orders.insert(order_id, order.clone());
            let events: Vec<TradeExecutedEvent> =
                trades.iter().map(TradeExecutedEvent::from).collect();
            market.trades.extend(trades);
            drop(market);
            self.dispatch(&events);
            return Err(err);
        }

        if order.status.is_open() {
            if order_type == OrderType::Market {
                if !order.has_fills() {
                    order.reject();
                    self.ledger.release(
                        account_id,
                        &reserve_asset,
                        reserve_amount,
                        "order rejected",
                        &order_id.to_string(),
                    )?;
                    tracing::info!(order = %order_id, pair = symbol, "market order rejected, no liquidity");
                }
            } else if let Some(limit) = limit_price {
                match side {
                    Side::Buy => market.bids.insert(limit, order_id, account_id, order.remaining_quantity),
                    Side::Sell => market.asks.insert(limit, order_id, account_id, order.remaining_quantity),
                }
            }
        }
        market.orders.insert(order_id, order.clone());

        let events: Vec<TradeExecutedEvent> = trades.iter().map(TradeExecutedEvent::from).collect();
        market.trades.extend(trades);
        drop(market);

        self.dispatch(&events);
        Ok(order)
    }

    /// Walk the opposite side of the book in price-time order, settling each
    /// match as it happens
    ///
    /// A settlement failure stops the walk and is returned alongside the
    /// trades that settled before it; the failed fill itself touched nothing.
    fn match_order(
        &self,
        market: &mut MutexGuard<'_, Market>,
        pair: &TradingPair,
        base: &Asset,
        quote: &Asset,
        taker: &mut Order,
    ) -> (Vec<Trade>, Option<ExchangeError>) {
        let mut trades = Vec::new();

        while !taker.is_filled() {
            let best = match taker.side {
                Side::Buy => market.asks.best_entry(),
                Side::Sell => market.bids.best_entry(),
            };
            let Some((maker_price, maker_order_id, maker_account_id, maker_remaining)) = best
            else {
                break;
            };
            if !crossing::taker_accepts(taker.side, taker.price, maker_price) {
                break;
            }

            let match_quantity = taker.remaining_quantity.min(maker_remaining);
            market.sequence += 1;
            let trade = executor::execute(
                market.sequence,
                pair,
                base,
                quote,
                maker_order_id,
                taker.order_id,
                maker_account_id,
                taker.account_id,
                taker.side,
                maker_price,
                match_quantity,
                now_nanos(),
            );

            {
                let maker = market
                    .orders
                    .get_mut(&maker_order_id)
                    .expect("book entry has a backing order");
                if let Err(err) = settlement::settle(&self.ledger, pair, &trade, maker, taker) {
                    market.sequence -= 1;
                    return (trades, Some(err));
                }
            }
            match taker.side {
                Side::Buy => market.asks.fill_front(maker_price, match_quantity),
                Side::Sell => market.bids.fill_front(maker_price, match_quantity),
            }

            tracing::info!(
                trade = %trade.trade_id,
                pair = %pair.symbol,
                price = %trade.price,
                quantity = %trade.quantity,
                "trade executed"
            );
            trades.push(trade);
        }

        (trades, None)
    }

    /// Cancel an open order, releasing the funds still reserved behind it
    ///
    /// Only the owner may cancel; `NotFound` covers both an unknown id and an
    /// id owned by someone else.
    pub fn cancel_order(
        &self,
        symbol: &str,
        order_id: OrderId,
        account_id: AccountId,
    ) -> Result<Order, ExchangeError> {
        let pair = self.pair(symbol)?;
        let market_arc = self.market(symbol)?;
        let mut market = market_arc.lock().expect("market mutex poisoned");

        let (side, order_type, limit_price, release_amount, status) = {
            let order = market
                .orders
                .get(&order_id)
                .filter(|order| order.account_id == account_id)
                .ok_or_else(|| ExchangeError::NotFound {
                    order_id: order_id.to_string(),
                })?;
            (
                order.side,
                order.order_type,
                order.price,
                order.remaining_reservation(),
                order.status,
            )
        };
        if !status.is_open() {
            return Err(ExchangeError::InvalidState {
                status: status.as_str().to_string(),
            });
        }

        let release_asset = match side {
            Side::Buy => pair.quote.clone(),
            Side::Sell => pair.base.clone(),
        };
        self.ledger.release(
            account_id,
            &release_asset,
            release_amount,
            "order cancelled",
            &order_id.to_string(),
        )?;

        if order_type == OrderType::Limit {
            if let Some(limit) = limit_price {
                match side {
                    Side::Buy => market.bids.remove(&order_id, limit),
                    Side::Sell => market.asks.remove(&order_id, limit),
                };
            }
        }

        let order = market
            .orders
            .get_mut(&order_id)
            .expect("order looked up above");
        order.cancel();
        tracing::info!(order = %order_id, pair = symbol, "order cancelled");
        Ok(order.clone())
    }

    /// Depth snapshot of a market, best `depth` levels per side
    pub fn order_book(&self, symbol: &str, depth: usize) -> Result<BookSnapshot, ExchangeError> {
        let market_arc = self.market(symbol)?;
        let market = market_arc.lock().expect("market mutex poisoned");
        Ok(BookSnapshot {
            symbol: symbol.to_string(),
            bids: market.bids.depth(depth),
            asks: market.asks.depth(depth),
        })
    }

    /// Most recent trades on a market, newest first
    pub fn recent_trades(&self, symbol: &str, limit: usize) -> Result<Vec<Trade>, ExchangeError> {
        let market_arc = self.market(symbol)?;
        let market = market_arc.lock().expect("market mutex poisoned");
        Ok(market.trades.iter().rev().take(limit).cloned().collect())
    }

    /// Look up one of the caller's orders
    pub fn order(
        &self,
        symbol: &str,
        order_id: OrderId,
        account_id: AccountId,
    ) -> Result<Order, ExchangeError> {
        let market_arc = self.market(symbol)?;
        let market = market_arc.lock().expect("market mutex poisoned");
        market
            .orders
            .get(&order_id)
            .filter(|order| order.account_id == account_id)
            .cloned()
            .ok_or_else(|| ExchangeError::NotFound {
                order_id: order_id.to_string(),
            })
    }

    fn dispatch(&self, events: &[TradeExecutedEvent]) {
        if events.is_empty() {
            return;
        }
        let sinks = self.sinks.lock().expect("sink registry poisoned").clone();
        for event in events {
            for sink in &sinks {
                sink.on_trade(event);
            }
            tracing::debug!(trade = %event.trade_id, "trade event dispatched");
        }
    }
}
