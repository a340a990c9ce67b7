//! Engine configuration
//!
//! This module provides the `EngineConfig` passed to
//! [`LedgerEngine::open`](crate::core::engine::LedgerEngine::open). The
//! defaults match the reference behavior; the optional policies exist so
//! callers can decide them at the collaborator boundary instead of the
//! engine baking in a guess.

use rust_decimal::Decimal;
use std::time::Duration;

/// Policy for deleting accounts that still hold funds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Reject deletion unless the balance is exactly zero (default)
    #[default]
    RequireZeroBalance,

    /// Allow deletion regardless of balance
    ///
    /// The remaining funds leave the ledger's live total; history is
    /// retained either way.
    AllowNonZeroBalance,
}

/// Configuration for a [`LedgerEngine`](crate::core::engine::LedgerEngine)
///
/// Construct with [`EngineConfig::default`] and override fields as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How to treat deletion of accounts with a non-zero balance
    pub delete_policy: DeletePolicy,

    /// Minimum balance every debit must leave in the source account
    ///
    /// `None` (default) disables the policy. When set, withdrawals and
    /// transfers that would leave less than this amount are rejected with
    /// `BelowMinimumBalance`.
    pub min_retained_balance: Option<Decimal>,

    /// Maximum time to wait for an account lock
    ///
    /// `None` (default) waits indefinitely. When set, an operation that
    /// cannot acquire all of its locks within the timeout is rejected with
    /// `LockTimeout` and has no side effects.
    pub lock_timeout: Option<Duration>,

    /// How many times to retry a transient persistence failure
    ///
    /// Retries happen with the operation's locks still held, preserving
    /// atomicity. `0` (default) surfaces the first failure.
    pub commit_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            delete_policy: DeletePolicy::default(),
            min_retained_balance: None,
            lock_timeout: None,
            commit_retries: 0,
        }
    }
}
