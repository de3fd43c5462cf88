//! Matching engine service
//!
//! Price-time priority matching over per-pair order books, with every order
//! fully funded before it can touch the book: submission reserves the worst
//! case cost in the owner's wallet and settlement draws it back down, so the
//! engine can never produce a trade the ledger cannot pay for.
//!
//! **Key invariants:**
//! - Maker price always wins; ties break FIFO by arrival
//! - Per trade, base deltas sum to zero and quote deltas sum to minus fees
//! - Reservation failure means no order exists anywhere
//! - Market orders never rest in the book

pub mod book;
pub mod engine;
pub mod events;
pub mod matching;
pub mod settlement;

pub use engine::{BookSnapshot, Exchange};
pub use events::{TradeExecutedEvent, TradeSink};
