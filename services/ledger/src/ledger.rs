//! Ledger implementation
//!
//! Wallets live in a concurrent map keyed by (account, asset); each wallet is
//! guarded by its own mutex so same-wallet operations serialize while
//! different wallets proceed independently. Trade settlement locks every
//! wallet it touches in canonical key order, validates all legs, then applies
//! them, so the four-legged transfer is all-or-nothing and a concurrent
//! balance read never observes a half-applied trade.

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use types::errors::LedgerError;
use types::ids::{AccountId, WithdrawalId};
use types::wallet::{
    Transaction, TransactionKind, Wallet, WalletReservation, WithdrawalRequest, WithdrawalStatus,
};

type WalletKey = (AccountId, String);

/// Flat 0.1% withdrawal fee, deducted from the gross amount
fn withdrawal_fee_rate() -> Decimal {
    Decimal::new(1, 3)
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Wallet state plus its audit trail, mutated under one lock
#[derive(Debug)]
struct WalletEntry {
    wallet: Wallet,
    reservations: Vec<WalletReservation>,
    transactions: Vec<Transaction>,
}

impl WalletEntry {
    fn new() -> Self {
        Self {
            wallet: Wallet::zero(),
            reservations: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Draw `amount` out of the active reservations matching `reference`,
    /// oldest first, marking exhausted rows inactive
    fn draw_reservation(&mut self, reference: &str, mut amount: Decimal, timestamp: i64) {
        for row in self.reservations.iter_mut() {
            if amount.is_zero() {
                break;
            }
            if !row.active || row.reference != reference {
                continue;
            }
            let take = row.amount.min(amount);
            row.amount -= take;
            amount -= take;
            if row.amount.is_zero() {
                row.active = false;
                row.released_at = Some(timestamp);
            }
        }
    }
}

/// One leg of an atomic multi-wallet settlement
///
/// Applied in two steps: `release_reserved` moves funds from reserved back to
/// available, then `available_delta` adjusts available. Splitting the moves
/// this way lets a buy leg return its over-reservation (sized at the limit
/// price) while paying the actual execution cost in one indivisible step.
#[derive(Debug, Clone)]
pub struct SettlementLeg {
    pub account_id: AccountId,
    pub asset: String,
    pub release_reserved: Decimal,
    pub available_delta: Decimal,
    /// Reservation audit rows to draw `release_reserved` from
    pub reservation_ref: Option<String>,
    pub fee: Decimal,
    pub description: String,
}

/// Per-user-per-asset balance store with atomic funds-reservation primitives
#[derive(Debug, Default)]
pub struct Ledger {
    wallets: DashMap<WalletKey, Arc<Mutex<WalletEntry>>>,
    withdrawals: DashMap<WithdrawalId, Mutex<WithdrawalRequest>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            wallets: DashMap::new(),
            withdrawals: DashMap::new(),
        }
    }

    /// Wallets are created lazily with zero balances on first reference
    fn entry(&self, account_id: AccountId, asset: &str) -> Arc<Mutex<WalletEntry>> {
        self.wallets
            .entry((account_id, asset.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(WalletEntry::new())))
            .clone()
    }

    /// Current balance snapshot for (account, asset)
    pub fn balance(&self, account_id: AccountId, asset: &str) -> Wallet {
        let entry = self.entry(account_id, asset);
        let guard = entry.lock().expect("wallet mutex poisoned");
        guard.wallet
    }

    /// Audit trail of balance changes for (account, asset)
    pub fn transactions(&self, account_id: AccountId, asset: &str) -> Vec<Transaction> {
        let entry = self.entry(account_id, asset);
        let guard = entry.lock().expect("wallet mutex poisoned");
        guard.transactions.clone()
    }

    /// Reservation audit rows for (account, asset)
    pub fn reservations(&self, account_id: AccountId, asset: &str) -> Vec<WalletReservation> {
        let entry = self.entry(account_id, asset);
        let guard = entry.lock().expect("wallet mutex poisoned");
        guard.reservations.clone()
    }

    /// Credit freshly arrived funds to the available balance
    pub fn deposit(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                reason: format!("deposit amount must be positive, got {amount}"),
            });
        }
        let ts = now_nanos();
        let entry = self.entry(account_id, asset);
        let mut guard = entry.lock().expect("wallet mutex poisoned");
        guard.wallet.adjust_available(amount);
        guard.transactions.push(Transaction::completed(
            TransactionKind::Deposit,
            amount,
            Decimal::ZERO,
            format!("Deposit {amount} {asset}"),
            ts,
        ));
        tracing::debug!(%account_id, asset, %amount, "deposit credited");
        Ok(())
    }

    /// Move `amount` from available to reserved, recording why
    ///
    /// Indivisible with respect to concurrent operations on the same wallet;
    /// the insufficient-funds check and the move happen under one lock.
    pub fn reserve(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
        reason: &str,
        reference: &str,
    ) -> Result<(), LedgerError> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount {
                reason: format!("reserve amount must be non-negative, got {amount}"),
            });
        }
        let ts = now_nanos();
        let entry = self.entry(account_id, asset);
        let mut guard = entry.lock().expect("wallet mutex poisoned");
        if guard.wallet.available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount,
                available: guard.wallet.available,
            });
        }
        guard.wallet.reserve(amount);
        guard
            .reservations
            .push(WalletReservation::new(amount, reason, reference, ts));
        guard.transactions.push(Transaction::completed(
            TransactionKind::infer(reason, -amount),
            -amount,
            Decimal::ZERO,
            format!("reserve: {reason}"),
            ts,
        ));
        tracing::debug!(%account_id, asset, %amount, reference, "funds reserved");
        Ok(())
    }

    /// Move `amount` from reserved back to available, retiring the matching
    /// reservation rows by reference id
    pub fn release(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
        reason: &str,
        reference: &str,
    ) -> Result<(), LedgerError> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount {
                reason: format!("release amount must be non-negative, got {amount}"),
            });
        }
        let ts = now_nanos();
        let entry = self.entry(account_id, asset);
        let mut guard = entry.lock().expect("wallet mutex poisoned");
        if guard.wallet.reserved < amount {
            return Err(LedgerError::InsufficientReserved {
                asset: asset.to_string(),
                required: amount,
                reserved: guard.wallet.reserved,
            });
        }
        guard.wallet.release(amount);
        guard.draw_reservation(reference, amount, ts);
        guard.transactions.push(Transaction::completed(
            TransactionKind::infer(reason, amount),
            amount,
            Decimal::ZERO,
            format!("release: {reason}"),
            ts,
        ));
        tracing::debug!(%account_id, asset, %amount, reference, "reservation released");
        Ok(())
    }

    /// Adjust the available balance by a signed delta
    ///
    /// Used for settlement proceeds and debits that bypass the reserve cycle.
    /// Rejects any debit that would push available below zero.
    pub fn transfer(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<(), LedgerError> {
        let ts = now_nanos();
        let entry = self.entry(account_id, asset);
        let mut guard = entry.lock().expect("wallet mutex poisoned");
        if amount.is_sign_negative() && guard.wallet.available < -amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                required: -amount,
                available: guard.wallet.available,
            });
        }
        guard.wallet.adjust_available(amount);
        guard.transactions.push(Transaction::completed(
            TransactionKind::infer(description, amount),
            amount,
            Decimal::ZERO,
            description,
            ts,
        ));
        tracing::debug!(%account_id, asset, %amount, description, "transfer applied");
        Ok(())
    }

    /// Apply every settlement leg or none
    ///
    /// Locks all involved wallets in canonical key order (no deadlock against
    /// a concurrent settlement touching the same wallets), validates every leg
    /// against a scratch copy, then applies. Failure of any leg leaves all
    /// balances untouched.
    pub fn settle_trade(&self, legs: &[SettlementLeg]) -> Result<(), LedgerError> {
        let ts = now_nanos();

        let mut keys: Vec<WalletKey> = legs
            .iter()
            .map(|leg| (leg.account_id, leg.asset.clone()))
            .collect();
        keys.sort();
        keys.dedup();

        let arcs: Vec<Arc<Mutex<WalletEntry>>> = keys
            .iter()
            .map(|(account, asset)| self.entry(*account, asset))
            .collect();
        let mut guards: Vec<_> = arcs
            .iter()
            .map(|arc| arc.lock().expect("wallet mutex poisoned"))
            .collect();

        let index_of = |leg: &SettlementLeg| {
            keys.iter()
                .position(|(account, asset)| *account == leg.account_id && *asset == leg.asset)
                .expect("settlement leg key collected above")
        };

        // Validate all legs on a scratch copy before touching real balances
        let mut scratch: Vec<Wallet> = guards.iter().map(|g| g.wallet).collect();
        for leg in legs {
            let wallet = &mut scratch[index_of(leg)];
            if wallet.reserved < leg.release_reserved {
                return Err(LedgerError::InsufficientReserved {
                    asset: leg.asset.clone(),
                    required: leg.release_reserved,
                    reserved: wallet.reserved,
                });
            }
            wallet.reserved -= leg.release_reserved;
            wallet.available += leg.release_reserved;
            if (wallet.available + leg.available_delta).is_sign_negative() {
                return Err(LedgerError::InsufficientBalance {
                    asset: leg.asset.clone(),
                    required: -leg.available_delta,
                    available: wallet.available,
                });
            }
            wallet.available += leg.available_delta;
        }

        for leg in legs {
            let guard = &mut guards[index_of(leg)];
            guard.wallet.release(leg.release_reserved);
            guard.wallet.adjust_available(leg.available_delta);
            if let Some(reference) = &leg.reservation_ref {
                guard.draw_reservation(reference, leg.release_reserved, ts);
            }
            guard.transactions.push(Transaction::completed(
                TransactionKind::Trade,
                leg.available_delta,
                leg.fee,
                leg.description.clone(),
                ts,
            ));
        }
        Ok(())
    }

    /// Start a withdrawal: computes the fee and reserves the gross amount
    pub fn request_withdrawal(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<WithdrawalRequest, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                reason: format!("withdrawal amount must be positive, got {amount}"),
            });
        }
        let id = WithdrawalId::new();
        let fee = amount * withdrawal_fee_rate();
        self.reserve(
            account_id,
            asset,
            amount,
            "withdrawal request",
            &id.to_string(),
        )?;
        let request = WithdrawalRequest {
            id,
            account_id,
            asset: asset.to_string(),
            amount,
            fee,
            net_amount: amount - fee,
            status: WithdrawalStatus::Pending,
            created_at: now_nanos(),
            completed_at: None,
        };
        self.withdrawals.insert(id, Mutex::new(request.clone()));
        tracing::info!(%account_id, asset, %amount, withdrawal = %id, "withdrawal requested");
        Ok(request)
    }

    /// Finish a pending withdrawal: the reserved gross amount leaves the wallet
    pub fn complete_withdrawal(&self, id: WithdrawalId) -> Result<WithdrawalRequest, LedgerError> {
        let ts = now_nanos();
        let entry = self
            .withdrawals
            .get(&id)
            .ok_or_else(|| LedgerError::WithdrawalNotFound { id: id.to_string() })?;
        let mut request = entry.value().lock().expect("withdrawal mutex poisoned");
        if request.status != WithdrawalStatus::Pending {
            return Err(LedgerError::InvalidWithdrawalState {
                state: format!("{:?}", request.status).to_lowercase(),
            });
        }

        let wallet_arc = self.entry(request.account_id, &request.asset);
        let mut guard = wallet_arc.lock().expect("wallet mutex poisoned");
        if guard.wallet.reserved < request.amount {
            return Err(LedgerError::InsufficientReserved {
                asset: request.asset.clone(),
                required: request.amount,
                reserved: guard.wallet.reserved,
            });
        }
        guard.wallet.consume_reserved(request.amount);
        guard.draw_reservation(&id.to_string(), request.amount, ts);
        guard.transactions.push(Transaction::completed(
            TransactionKind::Withdrawal,
            -request.amount,
            request.fee,
            format!("Withdrawal {} {}", request.amount, request.asset),
            ts,
        ));
        drop(guard);

        request.status = WithdrawalStatus::Completed;
        request.completed_at = Some(ts);
        tracing::info!(withdrawal = %id, "withdrawal completed");
        Ok(request.clone())
    }

    /// Abort a pending withdrawal and return the reserved funds
    pub fn cancel_withdrawal(&self, id: WithdrawalId) -> Result<WithdrawalRequest, LedgerError> {
        let entry = self
            .withdrawals
            .get(&id)
            .ok_or_else(|| LedgerError::WithdrawalNotFound { id: id.to_string() })?;
        let mut request = entry.value().lock().expect("withdrawal mutex poisoned");
        if request.status != WithdrawalStatus::Pending {
            return Err(LedgerError::InvalidWithdrawalState {
                state: format!("{:?}", request.status).to_lowercase(),
            });
        }
        self.release(
            request.account_id,
            &request.asset,
            request.amount,
            "withdrawal cancelled",
            &id.to_string(),
        )?;
        request.status = WithdrawalStatus::Cancelled;
        tracing::info!(withdrawal = %id, "withdrawal cancelled");
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn test_lazy_wallet_starts_at_zero() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        let wallet = ledger.balance(account, "BTC");
        assert_eq!(wallet.available, Decimal::ZERO);
        assert_eq!(wallet.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_reserve_moves_available_to_reserved() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("100")).unwrap();

        ledger
            .reserve(account, "USDT", dec("60"), "Order reservation", "order-1")
            .unwrap();

        let wallet = ledger.balance(account, "USDT");
        assert_eq!(wallet.available, dec("40"));
        assert_eq!(wallet.reserved, dec("60"));
        assert_eq!(wallet.total(), dec("100"));
    }

    #[test]
    fn test_reserve_insufficient_reports_error() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("10")).unwrap();

        let err = ledger
            .reserve(account, "USDT", dec("11"), "Order reservation", "order-1")
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                asset: "USDT".to_string(),
                required: dec("11"),
                available: dec("10"),
            }
        );
        // No partial effect
        assert_eq!(ledger.balance(account, "USDT").available, dec("10"));
    }

    #[test]
    fn test_release_retires_reservation_rows() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("100")).unwrap();
        ledger
            .reserve(account, "USDT", dec("50"), "Order reservation", "order-1")
            .unwrap();

        ledger
            .release(account, "USDT", dec("50"), "order cancelled", "order-1")
            .unwrap();

        let wallet = ledger.balance(account, "USDT");
        assert_eq!(wallet.available, dec("100"));
        assert_eq!(wallet.reserved, Decimal::ZERO);

        let rows = ledger.reservations(account, "USDT");
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].active);
        assert!(rows[0].released_at.is_some());
    }

    #[test]
    fn test_partial_release_keeps_row_active() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("100")).unwrap();
        ledger
            .reserve(account, "USDT", dec("50"), "Order reservation", "order-1")
            .unwrap();

        ledger
            .release(account, "USDT", dec("20"), "partial fill", "order-1")
            .unwrap();

        let rows = ledger.reservations(account, "USDT");
        assert!(rows[0].active);
        assert_eq!(rows[0].amount, dec("30"));
    }

    #[test]
    fn test_release_more_than_reserved_fails() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("100")).unwrap();
        ledger
            .reserve(account, "USDT", dec("30"), "Order reservation", "order-1")
            .unwrap();

        let err = ledger
            .release(account, "USDT", dec("31"), "oops", "order-1")
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientReserved { .. }));
    }

    #[test]
    fn test_transfer_rejects_overdraw() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("10")).unwrap();

        let err = ledger
            .transfer(account, "USDT", dec("-10.01"), "Trade 1 - Pay USDT")
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance(account, "USDT").available, dec("10"));
    }

    #[test]
    fn test_every_mutation_appends_transaction() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("100")).unwrap();
        ledger
            .reserve(account, "USDT", dec("50"), "Order reservation", "order-1")
            .unwrap();
        ledger
            .release(account, "USDT", dec("50"), "order cancelled", "order-1")
            .unwrap();
        ledger
            .transfer(account, "USDT", dec("-5"), "Trade 1 - Pay USDT")
            .unwrap();

        let txs = ledger.transactions(account, "USDT");
        assert_eq!(txs.len(), 4);
        assert_eq!(txs[0].kind, TransactionKind::Deposit);
        assert_eq!(txs[3].kind, TransactionKind::Trade);
    }

    #[test]
    fn test_settle_trade_is_all_or_nothing() {
        let ledger = Ledger::new();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        ledger.deposit(buyer, "USDT", dec("100")).unwrap();
        ledger.deposit(seller, "BTC", dec("1")).unwrap();
        ledger
            .reserve(buyer, "USDT", dec("100"), "Order reservation", "b")
            .unwrap();
        // Seller never reserved: the base leg must fail and nothing may apply
        let legs = vec![
            SettlementLeg {
                account_id: seller,
                asset: "BTC".to_string(),
                release_reserved: dec("1"),
                available_delta: dec("-1"),
                reservation_ref: Some("s".to_string()),
                fee: Decimal::ZERO,
                description: "Trade t - Sell BTC".to_string(),
            },
            SettlementLeg {
                account_id: buyer,
                asset: "USDT".to_string(),
                release_reserved: dec("100"),
                available_delta: dec("-100"),
                reservation_ref: Some("b".to_string()),
                fee: Decimal::ZERO,
                description: "Trade t - Pay USDT".to_string(),
            },
        ];

        let err = ledger.settle_trade(&legs).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientReserved { .. }));

        // Buyer wallet untouched despite its own leg being valid
        let wallet = ledger.balance(buyer, "USDT");
        assert_eq!(wallet.available, Decimal::ZERO);
        assert_eq!(wallet.reserved, dec("100"));
        assert_eq!(ledger.transactions(buyer, "USDT").len(), 2);
    }

    #[test]
    fn test_settle_trade_applies_all_legs() {
        let ledger = Ledger::new();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        ledger.deposit(buyer, "USDT", dec("100")).unwrap();
        ledger.deposit(seller, "BTC", dec("2")).unwrap();
        ledger
            .reserve(buyer, "USDT", dec("100"), "Order reservation", "b")
            .unwrap();
        ledger
            .reserve(seller, "BTC", dec("2"), "Order reservation", "s")
            .unwrap();

        // 2 BTC at 45 with a 10 over-reservation on the buyer and 1 fee each
        let legs = vec![
            SettlementLeg {
                account_id: seller,
                asset: "BTC".to_string(),
                release_reserved: dec("2"),
                available_delta: dec("-2"),
                reservation_ref: Some("s".to_string()),
                fee: Decimal::ZERO,
                description: "Trade t - Sell BTC".to_string(),
            },
            SettlementLeg {
                account_id: seller,
                asset: "USDT".to_string(),
                release_reserved: Decimal::ZERO,
                available_delta: dec("89"),
                reservation_ref: None,
                fee: dec("1"),
                description: "Trade t - Receive USDT".to_string(),
            },
            SettlementLeg {
                account_id: buyer,
                asset: "BTC".to_string(),
                release_reserved: Decimal::ZERO,
                available_delta: dec("2"),
                reservation_ref: None,
                fee: Decimal::ZERO,
                description: "Trade t - Buy BTC".to_string(),
            },
            SettlementLeg {
                account_id: buyer,
                asset: "USDT".to_string(),
                release_reserved: dec("100"),
                available_delta: dec("-91"),
                reservation_ref: Some("b".to_string()),
                fee: dec("1"),
                description: "Trade t - Pay USDT".to_string(),
            },
        ];
        ledger.settle_trade(&legs).unwrap();

        assert_eq!(ledger.balance(seller, "BTC").total(), Decimal::ZERO);
        assert_eq!(ledger.balance(seller, "USDT").available, dec("89"));
        assert_eq!(ledger.balance(buyer, "BTC").available, dec("2"));
        // Over-reservation flowed back: 100 reserved, 91 paid
        let buyer_quote = ledger.balance(buyer, "USDT");
        assert_eq!(buyer_quote.available, dec("9"));
        assert_eq!(buyer_quote.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_concurrent_reserves_serialize() {
        let ledger = Arc::new(Ledger::new());
        let account = AccountId::new();
        ledger.deposit(account, "USDT", dec("100")).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    ledger
                        .reserve(account, "USDT", dec("60"), "Order reservation", &format!("o{i}"))
                        .is_ok()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        // 60 + 60 > 100: exactly one reservation can succeed
        assert_eq!(wins, 1);
        let wallet = ledger.balance(account, "USDT");
        assert_eq!(wallet.available, dec("40"));
        assert_eq!(wallet.reserved, dec("60"));
    }

    #[test]
    fn test_withdrawal_two_phase() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "BTC", dec("1")).unwrap();

        let request = ledger.request_withdrawal(account, "BTC", dec("0.5")).unwrap();
        assert_eq!(request.fee, dec("0.0005"));
        assert_eq!(request.net_amount, dec("0.4995"));
        assert_eq!(ledger.balance(account, "BTC").reserved, dec("0.5"));

        let done = ledger.complete_withdrawal(request.id).unwrap();
        assert_eq!(done.status, WithdrawalStatus::Completed);
        let wallet = ledger.balance(account, "BTC");
        assert_eq!(wallet.available, dec("0.5"));
        assert_eq!(wallet.reserved, Decimal::ZERO);

        // Completing again is an invalid state, not a double spend
        let err = ledger.complete_withdrawal(request.id).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidWithdrawalState { .. }));
    }

    #[test]
    fn test_withdrawal_cancel_releases() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, "BTC", dec("1")).unwrap();

        let request = ledger.request_withdrawal(account, "BTC", dec("0.7")).unwrap();
        ledger.cancel_withdrawal(request.id).unwrap();

        let wallet = ledger.balance(account, "BTC");
        assert_eq!(wallet.available, dec("1"));
        assert_eq!(wallet.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_withdrawal_not_found() {
        let ledger = Ledger::new();
        let err = ledger.complete_withdrawal(WithdrawalId::new()).unwrap_err();
        assert!(matches!(err, LedgerError::WithdrawalNotFound { .. }));
    }

    proptest! {
        /// Whatever sequence of operations is thrown at a wallet, balances
        /// never go negative and failures leave no partial effects.
        #[test]
        fn prop_wallet_never_negative(ops in proptest::collection::vec((0u8..4, 1u64..1_000), 1..40)) {
            let ledger = Ledger::new();
            let account = AccountId::new();

            for (op, raw) in ops {
                let amount = Decimal::from(raw);
                let _ = match op {
                    0 => ledger.deposit(account, "USDT", amount),
                    1 => ledger.reserve(account, "USDT", amount, "Order reservation", "o"),
                    2 => ledger.release(account, "USDT", amount, "order cancelled", "o"),
                    _ => ledger.transfer(account, "USDT", -amount, "Trade x - Pay USDT"),
                };
                let wallet = ledger.balance(account, "USDT");
                prop_assert!(wallet.check_invariant(), "negative balance: {wallet:?}");
            }
        }
    }
}
