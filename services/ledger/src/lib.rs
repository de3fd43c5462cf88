//! Funds-reservation ledger
//!
//! Per-(account, asset) balance store with an available/reserved split and
//! atomic reserve/release/transfer primitives. Same-wallet operations
//! serialize behind a per-wallet lock; different wallets never block each
//! other. Every balance mutation appends a transaction record under the same
//! lock, so an observer can never see a balance change without its audit row.
//!
//! **Key invariants:**
//! - available >= 0 and reserved >= 0 for every wallet at all times
//! - insufficient-funds conditions are reported, never clamped
//! - the multi-leg trade settlement applies all legs or none

pub mod ledger;

pub use ledger::{Ledger, SettlementLeg};
