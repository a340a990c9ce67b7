//! Error types for the ledger engine
//!
//! This module defines all error types that can occur while operating on
//! the ledger. Errors are designed to be descriptive and user-friendly for
//! CLI output.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Bad arguments detected before any lock is taken
//!   or any mutation attempted; returned with zero side effects.
//! - **Business-Rule Rejections**: Insufficient funds, self transfers,
//!   non-empty deletes; never retried, never partially applied.
//! - **Fatal Errors**: The persistence gateway could not durably commit;
//!   the operation's effects were discarded in full.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger engine
///
/// This enum represents all possible errors that can occur while mutating
/// or querying the ledger. Each variant includes relevant context to help
/// diagnose and resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Invalid input to account creation
    ///
    /// The account name was empty/whitespace or the initial balance was
    /// negative. Nothing was created.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input
        message: String,
    },

    /// Non-positive amount supplied to a mutation
    ///
    /// Deposit, withdrawal, and transfer amounts must be strictly positive.
    /// The operation was rejected before taking any lock.
    #[error("Invalid amount {amount}: must be greater than zero")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// The referenced account does not exist
    #[error("Account not found: {account_id}")]
    AccountNotFound {
        /// The identifier that was not found
        account_id: String,
    },

    /// Transfer where source and destination are the same account
    ///
    /// Rejected before taking any lock; no state changes.
    #[error("Cannot transfer from account {account_id} to itself")]
    SelfTransfer {
        /// The account named on both sides
        account_id: String,
    },

    /// Insufficient funds for a withdrawal or transfer
    ///
    /// Applying the debit would make the balance negative. The operation
    /// was rejected and no ledger record was written.
    #[error("Insufficient funds in {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The debited account
        account_id: String,
        /// Balance at the time of the check
        balance: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Debit blocked by the minimum-retained-balance policy
    ///
    /// Only raised when `EngineConfig::min_retained_balance` is set. The
    /// operation was rejected and no state changed.
    #[error("Operation on {account_id} would leave {would_remain}, below the minimum retained balance {minimum}")]
    BelowMinimumBalance {
        /// The debited account
        account_id: String,
        /// Configured minimum the account must retain
        minimum: Decimal,
        /// Balance the account would have been left with
        would_remain: Decimal,
    },

    /// Deletion blocked by a non-zero balance
    ///
    /// Raised under the default `RequireZeroBalance` delete policy.
    #[error("Account {account_id} still holds {balance} and cannot be deleted")]
    AccountNotEmpty {
        /// The account that was not deleted
        account_id: String,
        /// Its current balance
        balance: Decimal,
    },

    /// Lock acquisition exceeded the configured timeout
    ///
    /// Acquisition is all-or-nothing: any lock already taken was released
    /// before reporting this error, and no state changed.
    #[error("Timed out waiting for the lock on account {account_id}")]
    LockTimeout {
        /// The account whose lock could not be acquired in time
        account_id: String,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation was rejected to maintain balance integrity.
    #[error("Arithmetic overflow in {operation} for account {account_id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// The affected account
        account_id: String,
    },

    /// The persistence gateway failed to durably commit
    ///
    /// This is the fatal outcome: the commit unit was discarded in full,
    /// so state is exactly what it was before the operation started.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the persistence failure
        message: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

// Conversion from serde_json::Error to LedgerError
impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account_id: &str) -> Self {
        LedgerError::AccountNotFound {
            account_id: account_id.to_string(),
        }
    }

    /// Create a SelfTransfer error
    pub fn self_transfer(account_id: &str) -> Self {
        LedgerError::SelfTransfer {
            account_id: account_id.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account_id: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account_id: account_id.to_string(),
            balance,
            requested,
        }
    }

    /// Create a BelowMinimumBalance error
    pub fn below_minimum_balance(
        account_id: &str,
        minimum: Decimal,
        would_remain: Decimal,
    ) -> Self {
        LedgerError::BelowMinimumBalance {
            account_id: account_id.to_string(),
            minimum,
            would_remain,
        }
    }

    /// Create an AccountNotEmpty error
    pub fn account_not_empty(account_id: &str, balance: Decimal) -> Self {
        LedgerError::AccountNotEmpty {
            account_id: account_id.to_string(),
            balance,
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(account_id: &str) -> Self {
        LedgerError::LockTimeout {
            account_id: account_id.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account_id: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account_id: account_id.to_string(),
        }
    }

    /// Create an Io error
    pub fn io(message: impl Into<String>) -> Self {
        LedgerError::Io {
            message: message.into(),
        }
    }

    /// Whether this failure may be retried by the engine
    ///
    /// Only persistence failures are transient; business-rule rejections
    /// are final and the engine never retries them.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Io { .. })
    }
}
