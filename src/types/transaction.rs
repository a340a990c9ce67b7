//! Transaction-related types for the ledger engine
//!
//! This module defines the transaction kinds, the immutable transaction
//! record stored in the append-only ledger, and the identifier aliases
//! used throughout the system.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Opaque unique string in the form `ACC0001`. Assigned at account creation
/// by the identifier allocator and never reused, even across restarts.
pub type AccountId = String;

/// Transaction identifier
///
/// Opaque unique string in the form `TXN0001`. Strictly increasing in the
/// order commits complete, and never reused.
pub type TransactionId = String;

/// Kinds of transactions recorded in the ledger
///
/// Deposits and withdrawals touch a single account. Transfers produce a
/// linked pair of records: a `TransferOut` on the source account and a
/// `TransferIn` on the destination, each naming the other side via
/// [`TransactionRecord::related_account_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Credit funds to an account
    Deposit,

    /// Debit funds from an account (requires sufficient balance)
    Withdraw,

    /// Debit side of a transfer; `related_account_id` names the receiver
    TransferOut,

    /// Credit side of a transfer; `related_account_id` names the sender
    TransferIn,
}

impl TransactionKind {
    /// Human-readable label used in log output and CLI rendering
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdraw => "WITHDRAW",
            TransactionKind::TransferOut => "TRANSFER_OUT",
            TransactionKind::TransferIn => "TRANSFER_IN",
        }
    }
}

/// Immutable transaction record
///
/// One entry in the append-only ledger. Records are created once when an
/// operation commits and are never mutated or deleted afterwards; together
/// they form the audit trail explaining how every balance was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique transaction identifier (`TXN0001`)
    pub id: TransactionId,

    /// The account this record belongs to
    pub account_id: AccountId,

    /// The kind of operation that produced this record
    pub kind: TransactionKind,

    /// Transaction amount; always positive
    pub amount: Decimal,

    /// The account's balance immediately after this record was applied
    ///
    /// Replaying an account's records in identifier order from its initial
    /// balance reproduces every `balance_after` exactly.
    pub balance_after: Decimal,

    /// Creation time of the record
    pub timestamp: DateTime<Utc>,

    /// Counterparty account for transfer records
    ///
    /// Present only for `TransferOut`/`TransferIn`; omitted from the
    /// serialized form otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_account_id: Option<AccountId>,
}
