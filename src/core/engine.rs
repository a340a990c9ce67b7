//! Ledger mutation engine
//!
//! This module provides the `LedgerEngine` that orchestrates every
//! balance mutation by coordinating the account store, the transaction
//! ledger, the identifier allocator, and the persistence gateway.
//!
//! # The Commit Protocol
//!
//! Every operation has one of three terminal outcomes:
//! - **Committed**: validated, durably persisted, applied in memory.
//! - **Rejected**: a precondition failed; nothing changed anywhere.
//! - **Fatal**: the gateway could not durably commit after validation;
//!   the commit unit was discarded in full, so state is exactly what it
//!   was before the operation started.
//!
//! An operation acquires its account locks in a fixed order (lexicographic
//! on account identifier), validates against fresh reads under those
//! locks, then enters the commit critical section: identifiers are drawn
//! from a staged allocator copy, the commit unit (balance deltas, new
//! ledger records, staged counters) is rendered into a full ledger
//! document, and the gateway replaces the durable state atomically. Only
//! after the gateway confirms durability is the unit applied to the
//! in-memory structures and the staged allocator installed.
//!
//! Collapsing the balance updates and ledger appends of one operation
//! into a single durable replace is what makes a half-applied transfer
//! ("debited but not credited") structurally impossible.

use crate::core::account_store::AccountStore;
use crate::core::allocator::IdAllocator;
use crate::core::config::{DeletePolicy, EngineConfig};
use crate::core::ledger::TransactionLedger;
use crate::persist::{LedgerDocument, PersistenceGateway};
use crate::types::{
    Account, AccountId, LedgerError, TransactionId, TransactionKind, TransactionRecord,
};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Result of a committed deposit or withdrawal
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReceipt {
    /// Identifier of the ledger record the operation appended
    pub transaction_id: TransactionId,

    /// The account's balance after the operation
    pub new_balance: Decimal,
}

/// Result of a committed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    /// Identifier of the `TransferOut` record on the source account
    pub out_transaction_id: TransactionId,

    /// Identifier of the `TransferIn` record on the destination account
    pub in_transaction_id: TransactionId,

    /// Source balance after the transfer
    pub from_balance: Decimal,

    /// Destination balance after the transfer
    pub to_balance: Decimal,
}

/// Aggregate counters over the whole ledger
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStats {
    /// Number of live accounts
    pub account_count: usize,

    /// Number of ledger records ever committed
    pub transaction_count: usize,

    /// Sum of all live account balances
    pub total_balance: Decimal,
}

/// One operation's set of mutations, applied all-or-nothing
///
/// Rendered into the durable document before the gateway commit and
/// applied to the in-memory structures after it.
#[derive(Debug, Default)]
struct CommitUnit {
    /// Accounts created by this operation
    creates: Vec<Account>,

    /// Signed balance deltas, routed through the store's delta primitive
    deltas: Vec<(AccountId, Decimal)>,

    /// Accounts removed by this operation
    removals: Vec<AccountId>,

    /// Ledger records appended by this operation
    records: Vec<TransactionRecord>,
}

/// The ledger engine
///
/// Owns the in-memory state (account store, transaction ledger, identifier
/// allocator) and the persistence gateway, and exposes the collaborator
/// interface: account lifecycle, deposits, withdrawals, transfers, history
/// queries, and stats. All methods take `&self`; the engine is safe to
/// share across threads behind an `Arc`.
pub struct LedgerEngine {
    store: AccountStore,
    ledger: TransactionLedger,
    allocator: Mutex<IdAllocator>,
    gateway: Box<dyn PersistenceGateway>,
    config: EngineConfig,

    /// Per-account operation locks, created on first use
    ///
    /// Multi-account operations acquire these in lexicographic identifier
    /// order, which makes deadlock impossible by construction.
    op_locks: DashMap<AccountId, Arc<Mutex<()>>>,

    /// Serializes durable commits
    ///
    /// Identifier draw, document render, and gateway commit happen under
    /// this lock, so commit order equals identifier order.
    commit_lock: Mutex<()>,
}

impl LedgerEngine {
    /// Open an engine over a gateway
    ///
    /// Loads the last durably committed document and rebuilds the
    /// in-memory state from it. A gateway with no committed state yields
    /// an empty ledger with fresh identifier counters.
    ///
    /// # Arguments
    ///
    /// * `gateway` - The durable storage the engine commits through
    /// * `config` - Engine policies; see [`EngineConfig`]
    ///
    /// # Errors
    ///
    /// Returns `Io` if the committed state cannot be loaded.
    pub fn open(
        gateway: Box<dyn PersistenceGateway>,
        config: EngineConfig,
    ) -> Result<Self, LedgerError> {
        let document = gateway.load()?;
        tracing::info!(
            accounts = document.accounts.len(),
            transactions = document.transactions.len(),
            "ledger opened"
        );

        Ok(LedgerEngine {
            store: AccountStore::from_accounts(document.accounts.into_values()),
            ledger: TransactionLedger::from_records(document.transactions),
            allocator: Mutex::new(document.allocator),
            gateway,
            config,
            op_locks: DashMap::new(),
            commit_lock: Mutex::new(()),
        })
    }

    // ==================== account lifecycle ====================

    /// Create a new account
    ///
    /// # Arguments
    ///
    /// * `name` - Display name; surrounding whitespace is trimmed
    /// * `initial_balance` - Starting balance; must not be negative
    ///
    /// # Returns
    ///
    /// The identifier of the new account
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - Empty/whitespace name or negative balance
    /// * `Io` - The creation could not be durably committed
    pub fn create_account(
        &self,
        name: &str,
        initial_balance: Decimal,
    ) -> Result<AccountId, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::invalid_input("account name must not be empty"));
        }
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_input(
                "initial balance must not be negative",
            ));
        }

        // No account lock needed: the account is invisible to every other
        // operation until the commit completes.
        let name = name.to_string();
        let account_id = self.commit_with(move |staged| {
            let id = staged.take_account_id();
            let account = Account::new(id.clone(), name, initial_balance);
            let unit = CommitUnit {
                creates: vec![account],
                ..CommitUnit::default()
            };
            Ok((unit, id))
        })?;

        tracing::info!(%account_id, %initial_balance, "account created");
        Ok(account_id)
    }

    /// Get a snapshot of an account
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no live account has this identifier.
    pub fn get_account(&self, account_id: &str) -> Result<Account, LedgerError> {
        self.store
            .get(account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))
    }

    /// Check whether an account exists
    pub fn account_exists(&self, account_id: &str) -> bool {
        self.store.exists(account_id)
    }

    /// Delete an account
    ///
    /// Removes the account from the live store; its ledger history is
    /// retained and stays queryable. Under the default
    /// [`DeletePolicy::RequireZeroBalance`] the balance must be exactly
    /// zero.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - No live account has this identifier
    /// * `AccountNotEmpty` - Non-zero balance under the default policy
    /// * `Io` - The deletion could not be durably committed
    pub fn delete_account(&self, account_id: &str) -> Result<(), LedgerError> {
        let id = account_id.to_string();
        self.with_account_locks(&[&id], || {
            let account = self
                .store
                .get(&id)
                .ok_or_else(|| LedgerError::account_not_found(&id))?;

            if self.config.delete_policy == DeletePolicy::RequireZeroBalance
                && !account.balance.is_zero()
            {
                return Err(LedgerError::account_not_empty(&id, account.balance));
            }

            self.commit_with(|_staged| {
                let unit = CommitUnit {
                    removals: vec![id.clone()],
                    ..CommitUnit::default()
                };
                Ok((unit, ()))
            })?;

            tracing::info!(account_id = %id, "account deleted");
            Ok(())
        })
    }

    // ==================== mutations ====================

    /// Deposit funds into an account
    ///
    /// # Arguments
    ///
    /// * `account_id` - The credited account
    /// * `amount` - Amount to deposit; must be strictly positive
    ///
    /// # Returns
    ///
    /// A receipt with the new transaction identifier and resulting balance
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - `amount <= 0`
    /// * `AccountNotFound` - The account does not exist
    /// * `ArithmeticOverflow` - The balance would overflow
    /// * `LockTimeout` - The account lock was not acquired in time
    /// * `Io` - The deposit could not be durably committed
    pub fn deposit(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> Result<MutationReceipt, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }
        if !self.store.exists(account_id) {
            return Err(LedgerError::account_not_found(account_id));
        }

        let id = account_id.to_string();
        let receipt = self.with_account_locks(&[&id], || {
            // Re-read under the lock; the pre-check above only exists to
            // reject obvious misses before any lock is taken.
            let account = self
                .store
                .get(&id)
                .ok_or_else(|| LedgerError::account_not_found(&id))?;
            let new_balance = account
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", &id))?;

            self.commit_with(|staged| {
                let transaction_id = staged.take_transaction_id();
                let record = TransactionRecord {
                    id: transaction_id.clone(),
                    account_id: id.clone(),
                    kind: TransactionKind::Deposit,
                    amount,
                    balance_after: new_balance,
                    timestamp: Utc::now(),
                    related_account_id: None,
                };
                let unit = CommitUnit {
                    deltas: vec![(id.clone(), amount)],
                    records: vec![record],
                    ..CommitUnit::default()
                };
                Ok((
                    unit,
                    MutationReceipt {
                        transaction_id,
                        new_balance,
                    },
                ))
            })
        })?;

        tracing::info!(
            %account_id,
            %amount,
            transaction_id = %receipt.transaction_id,
            "deposit committed"
        );
        Ok(receipt)
    }

    /// Withdraw funds from an account
    ///
    /// # Arguments
    ///
    /// * `account_id` - The debited account
    /// * `amount` - Amount to withdraw; must be strictly positive
    ///
    /// # Returns
    ///
    /// A receipt with the new transaction identifier and resulting balance
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - `amount <= 0`
    /// * `AccountNotFound` - The account does not exist
    /// * `InsufficientFunds` - `amount` exceeds the balance; no ledger
    ///   record is written and the balance is unchanged
    /// * `BelowMinimumBalance` - The retained-balance policy would be
    ///   violated (only when configured)
    /// * `LockTimeout` - The account lock was not acquired in time
    /// * `Io` - The withdrawal could not be durably committed
    pub fn withdraw(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> Result<MutationReceipt, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }
        if !self.store.exists(account_id) {
            return Err(LedgerError::account_not_found(account_id));
        }

        let id = account_id.to_string();
        let receipt = self.with_account_locks(&[&id], || {
            let account = self
                .store
                .get(&id)
                .ok_or_else(|| LedgerError::account_not_found(&id))?;

            if amount > account.balance {
                return Err(LedgerError::insufficient_funds(&id, account.balance, amount));
            }
            let new_balance = account
                .balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("withdraw", &id))?;
            self.check_retained_balance(&id, new_balance)?;

            self.commit_with(|staged| {
                let transaction_id = staged.take_transaction_id();
                let record = TransactionRecord {
                    id: transaction_id.clone(),
                    account_id: id.clone(),
                    kind: TransactionKind::Withdraw,
                    amount,
                    balance_after: new_balance,
                    timestamp: Utc::now(),
                    related_account_id: None,
                };
                let unit = CommitUnit {
                    deltas: vec![(id.clone(), -amount)],
                    records: vec![record],
                    ..CommitUnit::default()
                };
                Ok((
                    unit,
                    MutationReceipt {
                        transaction_id,
                        new_balance,
                    },
                ))
            })
        })?;

        tracing::info!(
            %account_id,
            %amount,
            transaction_id = %receipt.transaction_id,
            "withdrawal committed"
        );
        Ok(receipt)
    }

    /// Transfer funds between two accounts, all-or-nothing
    ///
    /// Both balance changes and both ledger records (a linked
    /// `TransferOut`/`TransferIn` pair) commit as one unit: either all of
    /// them become durable and visible, or none do.
    ///
    /// # Arguments
    ///
    /// * `from_id` - Source account
    /// * `to_id` - Destination account
    /// * `amount` - Amount to move; must be strictly positive
    ///
    /// # Returns
    ///
    /// A receipt with both new balances and both transaction identifiers
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - `amount <= 0`
    /// * `SelfTransfer` - `from_id == to_id`
    /// * `AccountNotFound` - Either side is missing (the error names it)
    /// * `InsufficientFunds` - `amount` exceeds the source balance
    /// * `BelowMinimumBalance` - The retained-balance policy would be
    ///   violated (only when configured)
    /// * `LockTimeout` - The locks were not acquired in time
    /// * `Io` - The transfer could not be durably committed
    pub fn transfer(
        &self,
        from_id: &str,
        to_id: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }
        if from_id == to_id {
            return Err(LedgerError::self_transfer(from_id));
        }
        if !self.store.exists(from_id) {
            return Err(LedgerError::account_not_found(from_id));
        }
        if !self.store.exists(to_id) {
            return Err(LedgerError::account_not_found(to_id));
        }

        let from = from_id.to_string();
        let to = to_id.to_string();
        let receipt = self.with_account_locks(&[&from, &to], || {
            // Re-read both balances under the locks; the earlier existence
            // checks ran unlocked and must not be trusted for amounts.
            let from_account = self
                .store
                .get(&from)
                .ok_or_else(|| LedgerError::account_not_found(&from))?;
            let to_account = self
                .store
                .get(&to)
                .ok_or_else(|| LedgerError::account_not_found(&to))?;

            if amount > from_account.balance {
                return Err(LedgerError::insufficient_funds(
                    &from,
                    from_account.balance,
                    amount,
                ));
            }
            let from_new_balance = from_account
                .balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", &from))?;
            self.check_retained_balance(&from, from_new_balance)?;
            let to_new_balance = to_account
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", &to))?;

            self.commit_with(|staged| {
                let out_transaction_id = staged.take_transaction_id();
                let in_transaction_id = staged.take_transaction_id();
                let timestamp = Utc::now();

                let out_record = TransactionRecord {
                    id: out_transaction_id.clone(),
                    account_id: from.clone(),
                    kind: TransactionKind::TransferOut,
                    amount,
                    balance_after: from_new_balance,
                    timestamp,
                    related_account_id: Some(to.clone()),
                };
                let in_record = TransactionRecord {
                    id: in_transaction_id.clone(),
                    account_id: to.clone(),
                    kind: TransactionKind::TransferIn,
                    amount,
                    balance_after: to_new_balance,
                    timestamp,
                    related_account_id: Some(from.clone()),
                };

                let unit = CommitUnit {
                    deltas: vec![(from.clone(), -amount), (to.clone(), amount)],
                    records: vec![out_record, in_record],
                    ..CommitUnit::default()
                };
                Ok((
                    unit,
                    TransferReceipt {
                        out_transaction_id,
                        in_transaction_id,
                        from_balance: from_new_balance,
                        to_balance: to_new_balance,
                    },
                ))
            })
        })?;

        tracing::info!(
            from = %from_id,
            to = %to_id,
            %amount,
            out = %receipt.out_transaction_id,
            "transfer committed"
        );
        Ok(receipt)
    }

    // ==================== queries ====================

    /// An account's transaction records, newest first
    ///
    /// `limit = 0` means unbounded. Works for deleted accounts too; the
    /// ledger never forgets.
    pub fn history(&self, account_id: &str, limit: usize) -> Vec<TransactionRecord> {
        self.ledger.history_for(account_id, limit)
    }

    /// An account's records of one kind, newest first
    ///
    /// Same semantics as [`LedgerEngine::history`], pre-filtered by kind.
    pub fn history_by_kind(
        &self,
        account_id: &str,
        kind: TransactionKind,
        limit: usize,
    ) -> Vec<TransactionRecord> {
        self.ledger.history_for_by_kind(account_id, kind, limit)
    }

    /// Every transaction record, in insertion (identifier) order
    pub fn all_transactions(&self) -> Vec<TransactionRecord> {
        self.ledger.all()
    }

    /// Aggregate counters over the whole ledger
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the balance total does not fit.
    pub fn stats(&self) -> Result<LedgerStats, LedgerError> {
        Ok(LedgerStats {
            account_count: self.store.len(),
            transaction_count: self.ledger.len(),
            total_balance: self.store.total_balance()?,
        })
    }

    // ==================== internals ====================

    /// Enforce the optional minimum-retained-balance policy on a debit
    fn check_retained_balance(
        &self,
        account_id: &str,
        would_remain: Decimal,
    ) -> Result<(), LedgerError> {
        if let Some(minimum) = self.config.min_retained_balance {
            if would_remain < minimum {
                return Err(LedgerError::below_minimum_balance(
                    account_id,
                    minimum,
                    would_remain,
                ));
            }
        }
        Ok(())
    }

    /// Handle for an account's operation lock, created on first use
    fn op_lock_handle(&self, account_id: &AccountId) -> Arc<Mutex<()>> {
        let entry = self.op_locks.entry(account_id.clone()).or_default();
        Arc::clone(entry.value())
    }

    /// Run `f` while holding the operation locks of all given accounts
    ///
    /// Locks are acquired in lexicographic identifier order regardless of
    /// the order `ids` lists them, so concurrent multi-account operations
    /// cannot deadlock. Acquisition is all-or-nothing: if a configured
    /// timeout expires while waiting for any lock, every lock already
    /// taken is released and `LockTimeout` is returned with no side
    /// effects.
    fn with_account_locks<T>(
        &self,
        ids: &[&AccountId],
        f: impl FnOnce() -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut ordered: Vec<&AccountId> = ids.to_vec();
        ordered.sort();
        ordered.dedup();

        let handles: Vec<Arc<Mutex<()>>> =
            ordered.iter().map(|id| self.op_lock_handle(id)).collect();

        let mut guards = Vec::with_capacity(handles.len());
        for (handle, id) in handles.iter().zip(&ordered) {
            let guard = match self.config.lock_timeout {
                Some(timeout) => handle
                    .try_lock_for(timeout)
                    .ok_or_else(|| LedgerError::lock_timeout(id.as_str()))?,
                None => handle.lock(),
            };
            guards.push(guard);
        }

        f()
    }

    /// Build, persist, and apply one commit unit
    ///
    /// `build` runs inside the commit critical section with a staged copy
    /// of the allocator; identifiers it draws become permanent only if the
    /// gateway confirms the commit. Transient gateway failures are retried
    /// up to the configured count with all locks still held; any other
    /// outcome discards the unit in full.
    fn commit_with<T>(
        &self,
        build: impl FnOnce(&mut IdAllocator) -> Result<(CommitUnit, T), LedgerError>,
    ) -> Result<T, LedgerError> {
        let _commit = self.commit_lock.lock();

        let mut staged = self.allocator.lock().clone();
        let (unit, outcome) = build(&mut staged)?;
        let document = self.render_document(&unit, &staged)?;

        let mut attempt: u32 = 0;
        loop {
            match self.gateway.commit(&document) {
                Ok(()) => break,
                Err(error) if error.is_transient() && attempt < self.config.commit_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, %error, "retrying durable commit");
                }
                Err(error) => {
                    tracing::error!(%error, "durable commit failed; unit discarded");
                    return Err(error);
                }
            }
        }

        // Durable. Apply the unit in memory: every balance change routes
        // through the store's delta primitive, which re-validates the
        // non-negative invariant as the last line of defense.
        for account in &unit.creates {
            self.store.insert(account.clone());
        }
        for (account_id, delta) in &unit.deltas {
            self.store.apply_delta(account_id, *delta)?;
        }
        for account_id in &unit.removals {
            self.store.remove(account_id);
        }
        self.ledger.append_all(&unit.records);
        *self.allocator.lock() = staged;

        Ok(outcome)
    }

    /// Render the durable document for the state after `unit` is applied
    fn render_document(
        &self,
        unit: &CommitUnit,
        staged: &IdAllocator,
    ) -> Result<LedgerDocument, LedgerError> {
        let mut accounts = self.store.snapshot();
        for account in &unit.creates {
            accounts.insert(account.id.clone(), account.clone());
        }
        for (account_id, delta) in &unit.deltas {
            let account = accounts
                .get_mut(account_id)
                .ok_or_else(|| LedgerError::account_not_found(account_id))?;
            account.balance = account
                .balance
                .checked_add(*delta)
                .ok_or_else(|| LedgerError::arithmetic_overflow("commit", account_id))?;
        }
        for account_id in &unit.removals {
            accounts.remove(account_id);
        }

        let mut transactions = self.ledger.snapshot();
        transactions.extend(unit.records.iter().cloned());

        Ok(LedgerDocument {
            accounts,
            transactions,
            allocator: staged.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryGateway;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Gateway that fails its first `failures` commits, then delegates
    struct FlakyGateway {
        inner: MemoryGateway,
        remaining_failures: AtomicU32,
    }

    impl FlakyGateway {
        fn failing(failures: u32) -> Self {
            FlakyGateway {
                inner: MemoryGateway::new(),
                remaining_failures: AtomicU32::new(failures),
            }
        }
    }

    impl PersistenceGateway for FlakyGateway {
        fn load(&self) -> Result<LedgerDocument, LedgerError> {
            self.inner.load()
        }

        fn commit(&self, document: &LedgerDocument) -> Result<(), LedgerError> {
            if self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(LedgerError::io("simulated commit failure"));
            }
            self.inner.commit(document)
        }
    }

    fn engine() -> LedgerEngine {
        LedgerEngine::open(Box::new(MemoryGateway::new()), EngineConfig::default()).unwrap()
    }

    fn engine_with(config: EngineConfig) -> LedgerEngine {
        LedgerEngine::open(Box::new(MemoryGateway::new()), config).unwrap()
    }

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 2)
    }

    #[test]
    fn test_create_account_assigns_sequential_ids() {
        let engine = engine();
        assert_eq!(engine.create_account("Alice", dec(1000_00)).unwrap(), "ACC0001");
        assert_eq!(engine.create_account("Bob", dec(500_00)).unwrap(), "ACC0002");
    }

    #[test]
    fn test_create_account_trims_name() {
        let engine = engine();
        let id = engine.create_account("  Alice  ", Decimal::ZERO).unwrap();
        assert_eq!(engine.get_account(&id).unwrap().name, "Alice");
    }

    #[test]
    fn test_create_account_rejects_blank_name() {
        let engine = engine();
        let result = engine.create_account("   ", Decimal::ZERO);
        assert!(matches!(result, Err(LedgerError::InvalidInput { .. })));
    }

    #[test]
    fn test_create_account_rejects_negative_balance() {
        let engine = engine();
        let result = engine.create_account("Alice", dec(-1));
        assert!(matches!(result, Err(LedgerError::InvalidInput { .. })));
    }

    #[test]
    fn test_get_account_after_create() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(1000_00)).unwrap();

        let account = engine.get_account(&id).unwrap();
        assert_eq!(account.name, "Alice");
        assert_eq!(account.balance, dec(1000_00));
        assert!(engine.account_exists(&id));
    }

    #[test]
    fn test_get_missing_account() {
        let engine = engine();
        assert!(matches!(
            engine.get_account("ACC0042"),
            Err(LedgerError::AccountNotFound { .. })
        ));
        assert!(!engine.account_exists("ACC0042"));
    }

    #[test]
    fn test_deposit_updates_balance_and_appends_record() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(1000_00)).unwrap();

        let receipt = engine.deposit(&id, dec(500_00)).unwrap();
        assert_eq!(receipt.new_balance, dec(1500_00));
        assert_eq!(receipt.transaction_id, "TXN0001");

        let history = engine.history(&id, 0);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Deposit);
        assert_eq!(history[0].amount, dec(500_00));
        assert_eq!(history[0].balance_after, dec(1500_00));
    }

    #[test]
    fn test_deposit_rejects_non_positive_amounts() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(100_00)).unwrap();

        assert!(matches!(
            engine.deposit(&id, Decimal::ZERO),
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert!(matches!(
            engine.deposit(&id, dec(-5_00)),
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert!(engine.history(&id, 0).is_empty());
    }

    #[test]
    fn test_deposit_into_missing_account() {
        let engine = engine();
        assert!(matches!(
            engine.deposit("ACC0042", dec(10_00)),
            Err(LedgerError::AccountNotFound { .. })
        ));
    }

    #[test]
    fn test_withdraw_updates_balance_and_appends_record() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(1000_00)).unwrap();

        let receipt = engine.withdraw(&id, dec(300_00)).unwrap();
        assert_eq!(receipt.new_balance, dec(700_00));

        let history = engine.history_by_kind(&id, TransactionKind::Withdraw, 0);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].balance_after, dec(700_00));
    }

    #[test]
    fn test_withdraw_insufficient_funds_leaves_no_trace() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(100_00)).unwrap();

        let result = engine.withdraw(&id, dec(1000_00));
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));

        // No balance change, no ledger record
        assert_eq!(engine.get_account(&id).unwrap().balance, dec(100_00));
        assert!(engine.history(&id, 0).is_empty());
    }

    #[test]
    fn test_withdraw_to_exactly_zero_is_allowed() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(100_00)).unwrap();

        let receipt = engine.withdraw(&id, dec(100_00)).unwrap();
        assert_eq!(receipt.new_balance, Decimal::ZERO);
    }

    #[test]
    fn test_transfer_moves_funds_and_links_records() {
        let engine = engine();
        let alice = engine.create_account("Alice", dec(1000_00)).unwrap();
        let bob = engine.create_account("Bob", dec(500_00)).unwrap();

        let receipt = engine.transfer(&alice, &bob, dec(300_00)).unwrap();
        assert_eq!(receipt.from_balance, dec(700_00));
        assert_eq!(receipt.to_balance, dec(800_00));

        let out = engine.history_by_kind(&alice, TransactionKind::TransferOut, 0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, receipt.out_transaction_id);
        assert_eq!(out[0].related_account_id.as_deref(), Some(bob.as_str()));

        let incoming = engine.history_by_kind(&bob, TransactionKind::TransferIn, 0);
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].id, receipt.in_transaction_id);
        assert_eq!(incoming[0].related_account_id.as_deref(), Some(alice.as_str()));

        // Conservation: amounts on the linked pair are equal
        assert_eq!(out[0].amount, incoming[0].amount);
    }

    #[test]
    fn test_transfer_conserves_total_balance() {
        let engine = engine();
        let alice = engine.create_account("Alice", dec(1000_00)).unwrap();
        let bob = engine.create_account("Bob", dec(500_00)).unwrap();
        let before = engine.stats().unwrap().total_balance;

        engine.transfer(&alice, &bob, dec(123_45)).unwrap();

        assert_eq!(engine.stats().unwrap().total_balance, before);
    }

    #[test]
    fn test_transfer_to_self_is_rejected() {
        let engine = engine();
        let alice = engine.create_account("Alice", dec(1000_00)).unwrap();

        let result = engine.transfer(&alice, &alice, dec(50_00));
        assert!(matches!(result, Err(LedgerError::SelfTransfer { .. })));
        assert_eq!(engine.get_account(&alice).unwrap().balance, dec(1000_00));
        assert!(engine.history(&alice, 0).is_empty());
    }

    #[test]
    fn test_transfer_names_the_missing_side() {
        let engine = engine();
        let alice = engine.create_account("Alice", dec(1000_00)).unwrap();

        match engine.transfer(&alice, "ACC0099", dec(10_00)) {
            Err(LedgerError::AccountNotFound { account_id }) => {
                assert_eq!(account_id, "ACC0099");
            }
            other => panic!("expected AccountNotFound, got {other:?}"),
        }

        match engine.transfer("ACC0098", &alice, dec(10_00)) {
            Err(LedgerError::AccountNotFound { account_id }) => {
                assert_eq!(account_id, "ACC0098");
            }
            other => panic!("expected AccountNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_transfer_insufficient_funds_changes_nothing() {
        let engine = engine();
        let alice = engine.create_account("Alice", dec(100_00)).unwrap();
        let bob = engine.create_account("Bob", dec(500_00)).unwrap();

        let result = engine.transfer(&alice, &bob, dec(100_01));
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(engine.get_account(&alice).unwrap().balance, dec(100_00));
        assert_eq!(engine.get_account(&bob).unwrap().balance, dec(500_00));
        assert!(engine.all_transactions().is_empty());
    }

    #[test]
    fn test_min_retained_balance_blocks_withdrawals() {
        let engine = engine_with(EngineConfig {
            min_retained_balance: Some(dec(100_00)),
            ..EngineConfig::default()
        });
        let id = engine.create_account("Alice", dec(150_00)).unwrap();

        let result = engine.withdraw(&id, dec(100_00));
        assert!(matches!(result, Err(LedgerError::BelowMinimumBalance { .. })));

        // Leaving exactly the minimum is allowed
        let receipt = engine.withdraw(&id, dec(50_00)).unwrap();
        assert_eq!(receipt.new_balance, dec(100_00));
    }

    #[test]
    fn test_min_retained_balance_blocks_transfers() {
        let engine = engine_with(EngineConfig {
            min_retained_balance: Some(dec(100_00)),
            ..EngineConfig::default()
        });
        let alice = engine.create_account("Alice", dec(150_00)).unwrap();
        let bob = engine.create_account("Bob", Decimal::ZERO).unwrap();

        let result = engine.transfer(&alice, &bob, dec(60_00));
        assert!(matches!(result, Err(LedgerError::BelowMinimumBalance { .. })));
        assert_eq!(engine.get_account(&bob).unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_delete_requires_zero_balance_by_default() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(100_00)).unwrap();

        let result = engine.delete_account(&id);
        assert!(matches!(result, Err(LedgerError::AccountNotEmpty { .. })));
        assert!(engine.account_exists(&id));

        engine.withdraw(&id, dec(100_00)).unwrap();
        engine.delete_account(&id).unwrap();
        assert!(!engine.account_exists(&id));
    }

    #[test]
    fn test_delete_keeps_ledger_history() {
        let engine = engine();
        let id = engine.create_account("Alice", Decimal::ZERO).unwrap();
        engine.deposit(&id, dec(10_00)).unwrap();
        engine.withdraw(&id, dec(10_00)).unwrap();

        engine.delete_account(&id).unwrap();

        // History outlives the account
        assert_eq!(engine.history(&id, 0).len(), 2);
    }

    #[test]
    fn test_delete_with_nonzero_balance_when_policy_allows() {
        let engine = engine_with(EngineConfig {
            delete_policy: DeletePolicy::AllowNonZeroBalance,
            ..EngineConfig::default()
        });
        let id = engine.create_account("Alice", dec(100_00)).unwrap();

        engine.delete_account(&id).unwrap();
        assert!(!engine.account_exists(&id));
    }

    #[test]
    fn test_delete_missing_account() {
        let engine = engine();
        assert!(matches!(
            engine.delete_account("ACC0042"),
            Err(LedgerError::AccountNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_commit_is_fatal_and_leaves_no_trace() {
        let engine =
            LedgerEngine::open(Box::new(FlakyGateway::failing(u32::MAX)), EngineConfig::default())
                .unwrap();

        let result = engine.create_account("Alice", dec(1000_00));
        assert!(matches!(result, Err(LedgerError::Io { .. })));
        assert_eq!(engine.stats().unwrap().account_count, 0);
    }

    #[test]
    fn test_identifier_from_failed_commit_is_reused() {
        let engine =
            LedgerEngine::open(Box::new(FlakyGateway::failing(1)), EngineConfig::default())
                .unwrap();

        // First attempt consumes ACC0001 but fails before persistence
        assert!(engine.create_account("Alice", Decimal::ZERO).is_err());

        // The identifier was never committed, so the retry gets it
        assert_eq!(engine.create_account("Alice", Decimal::ZERO).unwrap(), "ACC0001");
    }

    #[test]
    fn test_transient_failures_are_retried_when_configured() {
        let engine = LedgerEngine::open(
            Box::new(FlakyGateway::failing(2)),
            EngineConfig {
                commit_retries: 2,
                ..EngineConfig::default()
            },
        )
        .unwrap();

        // Two failures, then success on the third attempt of the same commit
        let id = engine.create_account("Alice", dec(100_00)).unwrap();
        assert_eq!(id, "ACC0001");
        assert_eq!(engine.stats().unwrap().account_count, 1);
    }

    #[test]
    fn test_stats_counts_accounts_transactions_and_balance() {
        let engine = engine();
        let alice = engine.create_account("Alice", dec(1000_00)).unwrap();
        let bob = engine.create_account("Bob", dec(500_00)).unwrap();
        engine.deposit(&alice, dec(250_00)).unwrap();
        engine.transfer(&alice, &bob, dec(100_00)).unwrap();

        let stats = engine.stats().unwrap();
        assert_eq!(stats.account_count, 2);
        assert_eq!(stats.transaction_count, 3); // deposit + transfer pair
        assert_eq!(stats.total_balance, dec(1750_00));
    }

    #[test]
    fn test_transaction_ids_are_strictly_increasing_across_operations() {
        let engine = engine();
        let alice = engine.create_account("Alice", dec(1000_00)).unwrap();
        let bob = engine.create_account("Bob", dec(500_00)).unwrap();

        engine.deposit(&alice, dec(1_00)).unwrap();
        engine.withdraw(&alice, dec(1_00)).unwrap();
        engine.transfer(&alice, &bob, dec(1_00)).unwrap();

        let all = engine.all_transactions();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["TXN0001", "TXN0002", "TXN0003", "TXN0004"]);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let engine = engine();
        let id = engine.create_account("Alice", dec(1000_00)).unwrap();
        engine.deposit(&id, dec(10_00)).unwrap();

        assert_eq!(engine.get_account(&id), engine.get_account(&id));
        assert_eq!(engine.history(&id, 0), engine.history(&id, 0));
    }
}
