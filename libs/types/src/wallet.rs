//! Wallet, reservation and transaction records
//!
//! A wallet tracks one (account, asset) balance split into available and
//! reserved. The mutators here are the low-level, invariant-checked moves; the
//! ledger crate validates preconditions, reports errors and guarantees that
//! every mutation is paired with an appended [`Transaction`] under one lock.

use crate::ids::{AccountId, WithdrawalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-(account, asset) balance with an available/reserved split
///
/// Invariant: both parts are non-negative; total = available + reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub available: Decimal,
    pub reserved: Decimal,
}

impl Wallet {
    /// A freshly created wallet holds nothing
    pub fn zero() -> Self {
        Self {
            available: Decimal::ZERO,
            reserved: Decimal::ZERO,
        }
    }

    pub fn total(&self) -> Decimal {
        self.available + self.reserved
    }

    pub fn check_invariant(&self) -> bool {
        !self.available.is_sign_negative() && !self.reserved.is_sign_negative()
    }

    /// Move funds from available to reserved
    ///
    /// # Panics
    /// Panics if `amount` exceeds available; callers validate first
    pub fn reserve(&mut self, amount: Decimal) {
        assert!(!amount.is_sign_negative(), "reserve amount must be non-negative");
        assert!(amount <= self.available, "insufficient available balance");

        self.available -= amount;
        self.reserved += amount;
    }

    /// Move funds from reserved back to available
    ///
    /// # Panics
    /// Panics if `amount` exceeds reserved; callers validate first
    pub fn release(&mut self, amount: Decimal) {
        assert!(!amount.is_sign_negative(), "release amount must be non-negative");
        assert!(amount <= self.reserved, "insufficient reserved balance");

        self.reserved -= amount;
        self.available += amount;
    }

    /// Adjust available by a signed delta (trade proceeds or debits)
    ///
    /// # Panics
    /// Panics if the result would be negative; callers validate first
    pub fn adjust_available(&mut self, delta: Decimal) {
        let next = self.available + delta;
        assert!(!next.is_sign_negative(), "available balance would go negative");
        self.available = next;
    }

    /// Remove funds from reserved entirely (completed withdrawal)
    ///
    /// # Panics
    /// Panics if `amount` exceeds reserved; callers validate first
    pub fn consume_reserved(&mut self, amount: Decimal) {
        assert!(!amount.is_sign_negative(), "consume amount must be non-negative");
        assert!(amount <= self.reserved, "insufficient reserved balance");
        self.reserved -= amount;
    }
}

/// Audit record of why funds moved from available to reserved
///
/// Enables idempotent release by reference id: settling or cancelling an order
/// draws its reservation down and marks it inactive once exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletReservation {
    /// Amount still held by this reservation
    pub amount: Decimal,
    pub reason: String,
    /// The order or withdrawal this reservation backs
    pub reference: String,
    pub active: bool,
    pub created_at: i64,
    pub released_at: Option<i64>,
}

impl WalletReservation {
    pub fn new(amount: Decimal, reason: impl Into<String>, reference: impl Into<String>, created_at: i64) -> Self {
        Self {
            amount,
            reason: reason.into(),
            reference: reference.into(),
            active: true,
            created_at,
            released_at: None,
        }
    }
}

/// Transaction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Trade,
    Fee,
    Bonus,
    Penalty,
}

impl TransactionKind {
    /// Infer the category from a free-form description and the sign of the
    /// amount, mirroring how trade settlement and transfers tag themselves
    pub fn infer(description: &str, amount: Decimal) -> Self {
        let lower = description.to_lowercase();
        if lower.contains("trade") || lower.contains("order") {
            TransactionKind::Trade
        } else if lower.contains("withdraw") {
            TransactionKind::Withdrawal
        } else if amount.is_sign_negative() {
            TransactionKind::Withdrawal
        } else {
            TransactionKind::Deposit
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

/// Append-only ledger entry recording a balance change
///
/// Every balance mutation appends one of these in the same atomic unit; a
/// balance change with no matching transaction is an invariant violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// Signed change to the available balance
    pub amount: Decimal,
    pub fee: Decimal,
    pub description: String,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

impl Transaction {
    /// A completed entry, the common case for synchronous ledger operations
    pub fn completed(
        kind: TransactionKind,
        amount: Decimal,
        fee: Decimal,
        description: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            kind,
            status: TransactionStatus::Completed,
            amount,
            fee,
            description: description.into(),
            created_at: timestamp,
            completed_at: Some(timestamp),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Two-phase withdrawal: requesting reserves the gross amount, completion
/// consumes it, cancellation releases it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub account_id: AccountId,
    pub asset: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub net_amount: Decimal,
    pub status: WithdrawalStatus,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}
