//! Error taxonomy for the ledger and matching core
//!
//! Monetary errors are always reported to the caller, never silently
//! absorbed; validation errors surface before any mutation.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors reported by the funds-reservation ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient reserved balance for {asset}: required {required}, reserved {reserved}")]
    InsufficientReserved {
        asset: String,
        required: Decimal,
        reserved: Decimal,
    },

    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("withdrawal not found: {id}")]
    WithdrawalNotFound { id: String },

    #[error("withdrawal not permitted in state {state}")]
    InvalidWithdrawalState { state: String },
}

/// Errors reported by the exchange facade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("unknown or inactive trading pair: {symbol}")]
    InvalidPair { symbol: String },

    #[error("invalid quantity: {reason}")]
    InvalidQuantity { reason: String },

    #[error("invalid price: {reason}")]
    InvalidPrice { reason: String },

    #[error("order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("operation not permitted while order is {status}")]
    InvalidState { status: String },
}
