//! Identifier allocation
//!
//! This module provides the `IdAllocator`, which produces unique,
//! monotonically increasing account and transaction identifiers. The
//! counters are persisted inside the ledger document, so a restart never
//! reuses an identifier that made it into a durable commit.
//!
//! # Staging Discipline
//!
//! Counters advance only as part of the durable commit that consumes the
//! identifier. The engine clones the live allocator at the start of a
//! commit critical section, draws identifiers from the clone, persists the
//! clone's counters inside the commit unit, and installs the clone as the
//! live allocator only after the gateway confirms durability. A failed
//! commit discards the clone, so its identifiers may be reused by the next
//! operation; duplicates are impossible because draw and commit are
//! serialized under the engine's commit lock.

use crate::types::{AccountId, TransactionId};
use serde::{Deserialize, Serialize};

/// Monotonic identifier counters for accounts and transactions
///
/// Both counters start at 1. Identifiers are rendered as `ACC0001` /
/// `TXN0001`, widening past four digits once the sequence outgrows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    /// Sequence number the next account identifier will use
    pub next_account_seq: u64,

    /// Sequence number the next transaction identifier will use
    pub next_transaction_seq: u64,
}

impl IdAllocator {
    /// Create a fresh allocator with both sequences at 1
    pub fn new() -> Self {
        IdAllocator {
            next_account_seq: 1,
            next_transaction_seq: 1,
        }
    }

    /// Draw the next account identifier, advancing the account sequence
    ///
    /// Callers must follow the staging discipline described in the module
    /// documentation: draw from a clone inside the commit critical section
    /// and install the clone only after the commit is durable.
    ///
    /// # Returns
    ///
    /// The formatted identifier, e.g. `ACC0001`
    pub fn take_account_id(&mut self) -> AccountId {
        let id = format!("ACC{:04}", self.next_account_seq);
        self.next_account_seq += 1;
        id
    }

    /// Draw the next transaction identifier, advancing the transaction sequence
    ///
    /// Same staging discipline as [`IdAllocator::take_account_id`].
    ///
    /// # Returns
    ///
    /// The formatted identifier, e.g. `TXN0001`
    pub fn take_transaction_id(&mut self) -> TransactionId {
        let id = format!("TXN{:04}", self.next_transaction_seq);
        self.next_transaction_seq += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
