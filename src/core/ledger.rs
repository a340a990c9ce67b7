//! Transaction ledger
//!
//! This module provides the `TransactionLedger`, the append-only sequence
//! of transaction records. Records are appended when an operation commits
//! and are never mutated or removed afterwards; the ledger is the source
//! of truth for how every balance was reached.
//!
//! # Ordering
//!
//! Records append in the order commits complete, which is also the order
//! transaction identifiers are drawn. Newest-first queries therefore walk
//! the sequence in reverse, which yields exactly the documented total
//! order: descending timestamp, with the higher identifier first when
//! timestamps are equal.

use crate::types::{TransactionKind, TransactionRecord};
use parking_lot::RwLock;

/// Append-only sequence of transaction records
///
/// Appends happen inside the engine's commit path; queries may run
/// concurrently from any thread and never observe a partially appended
/// commit unit, because each unit's records are appended under a single
/// write-lock acquisition.
#[derive(Debug, Default)]
pub struct TransactionLedger {
    /// Records in append (identifier) order
    records: RwLock<Vec<TransactionRecord>>,
}

impl TransactionLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        TransactionLedger {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Build a ledger from previously persisted records
    ///
    /// Records must already be in append order, as produced by
    /// [`TransactionLedger::snapshot`].
    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        TransactionLedger {
            records: RwLock::new(records),
        }
    }

    /// Append all records of one commit unit
    ///
    /// The records become visible to readers together; a query running
    /// concurrently sees either none or all of them.
    pub fn append_all(&self, records: &[TransactionRecord]) {
        if records.is_empty() {
            return;
        }
        self.records.write().extend_from_slice(records);
    }

    /// An account's records, newest first
    ///
    /// # Arguments
    ///
    /// * `account_id` - The account whose history to return
    /// * `limit` - Maximum number of records; `0` means unbounded
    ///
    /// # Returns
    ///
    /// At most `limit` of the account's most recent records, newest first.
    /// Records of deleted accounts remain queryable; deletion never
    /// rewrites history.
    pub fn history_for(&self, account_id: &str, limit: usize) -> Vec<TransactionRecord> {
        self.collect_newest_first(limit, |record| record.account_id == account_id)
    }

    /// An account's records of one kind, newest first
    ///
    /// Same semantics as [`TransactionLedger::history_for`], pre-filtered
    /// by `kind`.
    pub fn history_for_by_kind(
        &self,
        account_id: &str,
        kind: TransactionKind,
        limit: usize,
    ) -> Vec<TransactionRecord> {
        self.collect_newest_first(limit, |record| {
            record.account_id == account_id && record.kind == kind
        })
    }

    /// All records, in insertion (identifier) order
    ///
    /// Administrative dump; the returned order is stable across calls.
    pub fn all(&self) -> Vec<TransactionRecord> {
        self.records.read().clone()
    }

    /// Number of records in the ledger
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the ledger holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of all records in append order
    ///
    /// Used to render the durable ledger document.
    pub fn snapshot(&self) -> Vec<TransactionRecord> {
        self.records.read().clone()
    }

    fn collect_newest_first(
        &self,
        limit: usize,
        predicate: impl Fn(&TransactionRecord) -> bool,
    ) -> Vec<TransactionRecord> {
        let cap = if limit == 0 { usize::MAX } else { limit };
        self.records
            .read()
            .iter()
            .rev()
            .filter(|record| predicate(record))
            .take(cap)
            .cloned()
            .collect()
    }
}
