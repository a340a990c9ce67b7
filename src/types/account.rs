//! Account-related types for the ledger engine
//!
//! This module defines the Account structure representing one monetary
//! account owned by the account store.

use super::transaction::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary account
///
/// Represents the current state of one account in the ledger. The balance
/// is mutated exclusively by the mutation engine through the account
/// store's delta primitive and never goes negative between operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier (`ACC0001`); never reused
    pub id: AccountId,

    /// Non-empty display name
    pub name: String,

    /// Current balance
    ///
    /// Invariant: `balance >= 0` at all times observable between
    /// operations. Enforced by the account store's delta primitive.
    pub balance: Decimal,

    /// Creation time; immutable after creation
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record
    ///
    /// # Arguments
    ///
    /// * `id` - The allocated account identifier
    /// * `name` - Display name; already validated as non-empty
    /// * `balance` - Initial balance; already validated as non-negative
    ///
    /// # Returns
    ///
    /// A new Account stamped with the current time
    pub fn new(id: AccountId, name: String, balance: Decimal) -> Self {
        Account {
            id,
            name,
            balance,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_fields() {
        let account = Account::new(
            "ACC0001".to_string(),
            "Alice".to_string(),
            Decimal::new(100000, 2),
        );

        assert_eq!(account.id, "ACC0001");
        assert_eq!(account.name, "Alice");
        assert_eq!(account.balance, Decimal::new(100000, 2));
    }

    #[test]
    fn test_account_round_trips_through_json() {
        let account = Account::new("ACC0002".to_string(), "Bob".to_string(), Decimal::ZERO);

        let json = serde_json::to_string(&account).unwrap();
        let parsed: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, account);
    }
}
