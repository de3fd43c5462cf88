//! Types library for the spot exchange matching core
//!
//! This library provides all core type definitions shared by the ledger and
//! matching engine crates, ensuring type safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId, AccountId, WithdrawalId, MarketId)
//! - `numeric`: Fixed-point decimal types (Price, Quantity)
//! - `asset`: Asset and trading pair reference data
//! - `order`: Order lifecycle types
//! - `trade`: Immutable trade records
//! - `wallet`: Wallet, reservation and transaction records
//! - `errors`: Error taxonomy

pub mod asset;
pub mod errors;
pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod wallet;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::asset::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::wallet::*;
}
