//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types
//! - `transaction`: Transaction record types and identifiers
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod transaction;

pub use account::Account;
pub use error::LedgerError;
pub use transaction::{AccountId, TransactionId, TransactionKind, TransactionRecord};
