use crate::types::TransactionKind;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Manage accounts and transactions in a durable bank ledger
#[derive(Parser, Debug)]
#[command(name = "bank-ledger")]
#[command(about = "Manage accounts and transactions in a durable bank ledger", long_about = None)]
pub struct CliArgs {
    /// Directory holding the durable ledger state
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        default_value = "data",
        help = "Directory holding the durable ledger state"
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Ledger operations exposed by the CLI
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new account
    CreateAccount {
        /// Display name of the account holder
        #[arg(value_name = "NAME")]
        name: String,

        /// Starting balance (must not be negative)
        #[arg(value_name = "BALANCE")]
        initial_balance: Decimal,
    },

    /// Show one account's current state
    Show {
        /// Account identifier, e.g. ACC0001
        #[arg(value_name = "ACCOUNT")]
        account_id: String,
    },

    /// Deposit funds into an account
    Deposit {
        /// Account identifier, e.g. ACC0001
        #[arg(value_name = "ACCOUNT")]
        account_id: String,

        /// Amount to deposit (must be positive)
        #[arg(value_name = "AMOUNT")]
        amount: Decimal,
    },

    /// Withdraw funds from an account
    Withdraw {
        /// Account identifier, e.g. ACC0001
        #[arg(value_name = "ACCOUNT")]
        account_id: String,

        /// Amount to withdraw (must be positive)
        #[arg(value_name = "AMOUNT")]
        amount: Decimal,
    },

    /// Transfer funds between two accounts atomically
    Transfer {
        /// Source account identifier
        #[arg(value_name = "FROM")]
        from: String,

        /// Destination account identifier
        #[arg(value_name = "TO")]
        to: String,

        /// Amount to transfer (must be positive)
        #[arg(value_name = "AMOUNT")]
        amount: Decimal,
    },

    /// List an account's transaction history, newest first
    History {
        /// Account identifier, e.g. ACC0001
        #[arg(value_name = "ACCOUNT")]
        account_id: String,

        /// Maximum records to show (0 shows everything)
        #[arg(long = "limit", value_name = "N", default_value_t = 10)]
        limit: usize,

        /// Only show records of this kind
        #[arg(long = "kind", value_name = "KIND")]
        kind: Option<KindArg>,
    },

    /// Delete an account (history is retained)
    DeleteAccount {
        /// Account identifier, e.g. ACC0001
        #[arg(value_name = "ACCOUNT")]
        account_id: String,
    },

    /// Show ledger-wide counters
    Stats,
}

/// Transaction kinds selectable on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Deposit,
    Withdraw,
    TransferOut,
    TransferIn,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Deposit => TransactionKind::Deposit,
            KindArg::Withdraw => TransactionKind::Withdraw,
            KindArg::TransferOut => TransactionKind::TransferOut,
            KindArg::TransferIn => TransactionKind::TransferIn,
        }
    }
}
