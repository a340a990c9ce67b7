//! Persistence gateway contract
//!
//! This module defines the `PersistenceGateway` trait the mutation engine
//! depends on for its all-or-nothing guarantee, and the `LedgerDocument`
//! that crosses it. The trait abstracts over the storage medium so that
//! durable file storage, volatile test storage, and fault-injecting test
//! doubles are interchangeable.

use crate::core::allocator::IdAllocator;
use crate::types::{Account, AccountId, LedgerError, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete durable state of a ledger
///
/// One document holds all three persisted structures — the account map,
/// the transaction sequence, and the allocator counters — so a commit is
/// a single replace and the all-or-nothing guarantee is structural rather
/// than coordinated across files.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    /// Account identifier -> account record, ordered by identifier
    pub accounts: BTreeMap<AccountId, Account>,

    /// Transaction records in append (identifier) order
    pub transactions: Vec<TransactionRecord>,

    /// Identifier counters as of the last committed operation
    pub allocator: IdAllocator,
}

/// Durable commit primitive the mutation engine depends on
///
/// A gateway must guarantee that [`PersistenceGateway::commit`] makes the
/// given document durably visible in full or not at all, and that
/// [`PersistenceGateway::load`] never observes an in-progress commit.
/// The engine serializes `commit` calls; implementations do not need to
/// handle concurrent commits.
pub trait PersistenceGateway: Send + Sync {
    /// Load the last durably committed document
    ///
    /// # Returns
    ///
    /// The committed document, or an empty [`LedgerDocument`] if nothing
    /// has ever been committed.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the stored state exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<LedgerDocument, LedgerError>;

    /// Durably replace the stored state with `document`
    ///
    /// Either every mutation in the document becomes durably visible, or
    /// none does; a failure must leave the previously committed state
    /// intact and loadable.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the document could not be made durable.
    fn commit(&self, document: &LedgerDocument) -> Result<(), LedgerError>;
}
