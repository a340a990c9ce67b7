//! Bank Ledger CLI
//!
//! Thin presentation shell over the ledger engine. Every subcommand opens
//! the engine on the durable data directory, runs one operation, and
//! prints the result; all correctness guarantees live in the library.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- create-account "Alice" 1000
//! cargo run -- deposit ACC0001 500
//! cargo run -- transfer ACC0001 ACC0002 300
//! cargo run -- history ACC0001 --limit 5
//! cargo run -- --data-dir /var/lib/bank stats
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid input, unknown account, insufficient funds,
//!   persistence failure, etc.)

use bank_ledger::cli::{self, Command};
use bank_ledger::{
    EngineConfig, JsonFileGateway, LedgerEngine, LedgerError, TransactionRecord,
};
use std::process;

fn main() {
    // Log to stderr so command output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: cli::CliArgs) -> Result<(), LedgerError> {
    let gateway = JsonFileGateway::new(&args.data_dir)?;
    let engine = LedgerEngine::open(Box::new(gateway), EngineConfig::default())?;

    match args.command {
        Command::CreateAccount {
            name,
            initial_balance,
        } => {
            let account_id = engine.create_account(&name, initial_balance)?;
            println!("Created account {account_id} ({name}) with balance {initial_balance}");
        }
        Command::Show { account_id } => {
            let account = engine.get_account(&account_id)?;
            println!("{}  {}", account.id, account.name);
            println!("  balance:    {}", account.balance);
            println!("  created at: {}", account.created_at);
        }
        Command::Deposit { account_id, amount } => {
            let receipt = engine.deposit(&account_id, amount)?;
            println!(
                "{}: deposited {amount} into {account_id}, new balance {}",
                receipt.transaction_id, receipt.new_balance
            );
        }
        Command::Withdraw { account_id, amount } => {
            let receipt = engine.withdraw(&account_id, amount)?;
            println!(
                "{}: withdrew {amount} from {account_id}, new balance {}",
                receipt.transaction_id, receipt.new_balance
            );
        }
        Command::Transfer { from, to, amount } => {
            let receipt = engine.transfer(&from, &to, amount)?;
            println!(
                "{} / {}: transferred {amount} from {from} to {to}",
                receipt.out_transaction_id, receipt.in_transaction_id
            );
            println!("  {from} balance: {}", receipt.from_balance);
            println!("  {to} balance: {}", receipt.to_balance);
        }
        Command::History {
            account_id,
            limit,
            kind,
        } => {
            let records = match kind {
                Some(kind) => engine.history_by_kind(&account_id, kind.into(), limit),
                None => engine.history(&account_id, limit),
            };
            if records.is_empty() {
                println!("No transactions for {account_id}");
            }
            for record in &records {
                print_record(record);
            }
        }
        Command::DeleteAccount { account_id } => {
            engine.delete_account(&account_id)?;
            println!("Deleted account {account_id}");
        }
        Command::Stats => {
            let stats = engine.stats()?;
            println!("accounts:     {}", stats.account_count);
            println!("transactions: {}", stats.transaction_count);
            println!("total:        {}", stats.total_balance);
        }
    }

    Ok(())
}

fn print_record(record: &TransactionRecord) {
    let counterparty = record
        .related_account_id
        .as_ref()
        .map(|id| format!("  ({id})"))
        .unwrap_or_default();
    println!(
        "{}  {:<12}  {:>14}  balance {:>14}  {}{}",
        record.id,
        record.kind.label(),
        record.amount,
        record.balance_after,
        record.timestamp,
        counterparty
    );
}
