//! Bank Ledger Engine Library
//! # Overview
//!
//! This library maintains account balances and an auditable, append-only
//! transaction history, with deposits, withdrawals, and atomic transfers
//! that stay consistent under concurrent callers and partial failure.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransactionRecord, errors)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - The mutation engine and its commit protocol
//!   - [`core::account_store`] - Concurrent account state; the only
//!     balance-mutation primitive lives here
//!   - [`core::ledger`] - Append-only transaction history
//!   - [`core::allocator`] - Crash-resumable identifier allocation
//! - [`persist`] - Durable storage behind the [`persist::PersistenceGateway`]
//!   trait, with a file-backed and an in-memory implementation
//! - [`cli`] - CLI argument parsing for the thin presentation binary
//!
//! # Guarantees
//!
//! - Balances never go negative between operations.
//! - A transfer's two balance changes and two ledger records commit as one
//!   atomic unit; money is never created, destroyed, or left half-moved.
//! - Ledger records are immutable and never deleted, even when their
//!   account is.
//! - Identifiers are unique and monotonic, across restarts included.
//!
//! # Example
//!
//! ```
//! use bank_ledger::{EngineConfig, LedgerEngine, MemoryGateway};
//! use rust_decimal::Decimal;
//!
//! let engine = LedgerEngine::open(Box::new(MemoryGateway::new()), EngineConfig::default())?;
//! let alice = engine.create_account("Alice", Decimal::new(1000_00, 2))?;
//! let bob = engine.create_account("Bob", Decimal::new(500_00, 2))?;
//!
//! let receipt = engine.transfer(&alice, &bob, Decimal::new(300_00, 2))?;
//! assert_eq!(receipt.from_balance, Decimal::new(700_00, 2));
//! assert_eq!(receipt.to_balance, Decimal::new(800_00, 2));
//! # Ok::<(), bank_ledger::LedgerError>(())
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod persist;
pub mod types;

pub use crate::core::{
    DeletePolicy, EngineConfig, LedgerEngine, LedgerStats, MutationReceipt, TransferReceipt,
};
pub use persist::{JsonFileGateway, LedgerDocument, MemoryGateway, PersistenceGateway};
pub use types::{Account, AccountId, LedgerError, TransactionId, TransactionKind, TransactionRecord};
