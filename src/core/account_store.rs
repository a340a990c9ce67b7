//! Account store
//!
//! This module provides the `AccountStore`, which owns the mapping of
//! account identifier to account record and enforces the non-negative
//! balance invariant.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) so that reads of
//! different accounts never block each other and per-entry mutations are
//! atomic. [`AccountStore::apply_delta`] is the only balance-mutation
//! primitive in the system; every higher-level operation routes its
//! balance changes through it, so the negative-balance guard cannot be
//! bypassed by any caller, however the operations interleave.

use crate::types::{Account, AccountId, LedgerError};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Concurrent store of account records
///
/// Multiple threads can safely read and mutate different accounts
/// simultaneously; operations on the same account are serialized by the
/// map's per-entry locking. Reads return snapshots, never references into
/// the map.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Map of account identifier to account record
    accounts: DashMap<AccountId, Account>,
}

impl AccountStore {
    /// Create a new empty store
    pub fn new() -> Self {
        AccountStore {
            accounts: DashMap::new(),
        }
    }

    /// Build a store from previously persisted accounts
    ///
    /// Used when opening an engine over an existing ledger document.
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = AccountStore::new();
        for account in accounts {
            store.accounts.insert(account.id.clone(), account);
        }
        store
    }

    /// Insert or replace an account record
    pub fn insert(&self, account: Account) {
        self.accounts.insert(account.id.clone(), account);
    }

    /// Get a snapshot of an account
    ///
    /// # Arguments
    ///
    /// * `account_id` - The identifier to look up
    ///
    /// # Returns
    ///
    /// * `Some(Account)` - A clone of the record at the time of the call
    /// * `None` - If the account does not exist
    pub fn get(&self, account_id: &str) -> Option<Account> {
        self.accounts
            .get(account_id)
            .map(|entry| entry.value().clone())
    }

    /// Check whether an account exists
    pub fn exists(&self, account_id: &str) -> bool {
        self.accounts.contains_key(account_id)
    }

    /// Atomically add `delta` (positive or negative) to an account's balance
    ///
    /// This is the only balance-mutation primitive. The store re-validates
    /// its own invariant on every call rather than trusting the caller: a
    /// delta that would leave the balance negative is rejected without
    /// mutating anything.
    ///
    /// # Arguments
    ///
    /// * `account_id` - The account to mutate
    /// * `delta` - Signed amount to add to the stored balance
    ///
    /// # Returns
    ///
    /// A snapshot of the account after the mutation
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - The account does not exist
    /// * `ArithmeticOverflow` - Applying the delta would overflow
    /// * `InsufficientFunds` - The resulting balance would be negative
    pub fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Account, LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;

        let account = entry.value_mut();
        let new_balance = account
            .balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::arithmetic_overflow("apply_delta", account_id))?;

        if new_balance < Decimal::ZERO {
            return Err(LedgerError::insufficient_funds(
                account_id,
                account.balance,
                delta.abs(),
            ));
        }

        account.balance = new_balance;
        Ok(account.clone())
    }

    /// Remove an account record
    ///
    /// Removes only the live record; ledger history referencing the
    /// account is owned elsewhere and is never touched.
    ///
    /// # Returns
    ///
    /// The removed record, or `None` if the account did not exist
    pub fn remove(&self, account_id: &str) -> Option<Account> {
        self.accounts.remove(account_id).map(|(_, account)| account)
    }

    /// Number of live accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Snapshot all accounts, keyed and ordered by identifier
    ///
    /// Used to render the durable ledger document; the ordered map keeps
    /// the serialized form deterministic.
    pub fn snapshot(&self) -> BTreeMap<AccountId, Account> {
        self.accounts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Sum of all account balances
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the sum does not fit in a `Decimal`.
    pub fn total_balance(&self) -> Result<Decimal, LedgerError> {
        let mut total = Decimal::ZERO;
        for entry in self.accounts.iter() {
            total = total
                .checked_add(entry.value().balance)
                .ok_or_else(|| LedgerError::arithmetic_overflow("total_balance", entry.key()))?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(id: &str, balance: i64) -> Account {
        Account {
            id: id.to_string(),
            name: format!("owner of {id}"),
            balance: Decimal::new(balance, 2),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = AccountStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let store = AccountStore::new();
        store.insert(account("ACC0001", 100_00));

        let fetched = store.get("ACC0001").unwrap();
        assert_eq!(fetched.balance, Decimal::new(100_00, 2));
        assert!(store.exists("ACC0001"));
        assert!(!store.exists("ACC0002"));
    }

    #[test]
    fn test_apply_delta_adds_positive_amount() {
        let store = AccountStore::new();
        store.insert(account("ACC0001", 100_00));

        let updated = store
            .apply_delta("ACC0001", Decimal::new(50_00, 2))
            .unwrap();
        assert_eq!(updated.balance, Decimal::new(150_00, 2));
        assert_eq!(store.get("ACC0001").unwrap().balance, Decimal::new(150_00, 2));
    }

    #[test]
    fn test_apply_delta_subtracts_negative_amount() {
        let store = AccountStore::new();
        store.insert(account("ACC0001", 100_00));

        let updated = store
            .apply_delta("ACC0001", Decimal::new(-40_00, 2))
            .unwrap();
        assert_eq!(updated.balance, Decimal::new(60_00, 2));
    }

    #[test]
    fn test_apply_delta_rejects_negative_result_without_mutating() {
        let store = AccountStore::new();
        store.insert(account("ACC0001", 100_00));

        let result = store.apply_delta("ACC0001", Decimal::new(-100_01, 2));

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { .. })
        ));
        // Balance unchanged after the rejection
        assert_eq!(store.get("ACC0001").unwrap().balance, Decimal::new(100_00, 2));
    }

    #[test]
    fn test_apply_delta_to_exactly_zero_is_allowed() {
        let store = AccountStore::new();
        store.insert(account("ACC0001", 100_00));

        let updated = store
            .apply_delta("ACC0001", Decimal::new(-100_00, 2))
            .unwrap();
        assert_eq!(updated.balance, Decimal::ZERO);
    }

    #[test]
    fn test_apply_delta_on_missing_account() {
        let store = AccountStore::new();
        let result = store.apply_delta("ACC0009", Decimal::ONE);
        assert!(matches!(result, Err(LedgerError::AccountNotFound { .. })));
    }

    #[test]
    fn test_remove_returns_record_and_clears_entry() {
        let store = AccountStore::new();
        store.insert(account("ACC0001", 0));

        let removed = store.remove("ACC0001").unwrap();
        assert_eq!(removed.id, "ACC0001");
        assert!(!store.exists("ACC0001"));
        assert!(store.remove("ACC0001").is_none());
    }

    #[test]
    fn test_snapshot_is_ordered_by_identifier() {
        let store = AccountStore::new();
        store.insert(account("ACC0002", 200_00));
        store.insert(account("ACC0001", 100_00));
        store.insert(account("ACC0003", 300_00));

        let snapshot = store.snapshot();
        let ids: Vec<&String> = snapshot.keys().collect();
        assert_eq!(ids, vec!["ACC0001", "ACC0002", "ACC0003"]);
    }

    #[test]
    fn test_total_balance_sums_all_accounts() {
        let store = AccountStore::new();
        store.insert(account("ACC0001", 100_00));
        store.insert(account("ACC0002", 250_50));

        assert_eq!(store.total_balance().unwrap(), Decimal::new(350_50, 2));
    }

    #[test]
    fn test_from_accounts_restores_entries() {
        let store =
            AccountStore::from_accounts(vec![account("ACC0001", 100_00), account("ACC0002", 0)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("ACC0001").unwrap().balance, Decimal::new(100_00, 2));
    }
}
