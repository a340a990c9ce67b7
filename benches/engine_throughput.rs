//! Benchmark suite for ledger engine throughput
//!
//! These benchmarks measure the cost of the commit protocol per operation
//! using the divan benchmarking framework, over the in-memory gateway so
//! the numbers reflect engine overhead rather than disk speed.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```

use bank_ledger::{EngineConfig, LedgerEngine, MemoryGateway};
use rust_decimal::Decimal;

fn main() {
    divan::main();
}

fn engine_with_accounts(count: usize) -> (LedgerEngine, Vec<String>) {
    let engine = LedgerEngine::open(Box::new(MemoryGateway::new()), EngineConfig::default())
        .expect("failed to open engine");
    let ids = (0..count)
        .map(|i| {
            engine
                .create_account(&format!("bench-{i}"), Decimal::new(1_000_000_00, 2))
                .expect("account creation failed")
        })
        .collect();
    (engine, ids)
}

/// Benchmark a single-account deposit commit
#[divan::bench]
fn deposit(bencher: divan::Bencher) {
    let (engine, ids) = engine_with_accounts(1);

    bencher.bench_local(|| {
        engine
            .deposit(&ids[0], Decimal::ONE)
            .expect("deposit failed")
    });
}

/// Benchmark a two-account transfer commit (linked record pair)
#[divan::bench]
fn transfer(bencher: divan::Bencher) {
    let (engine, ids) = engine_with_accounts(2);

    bencher.bench_local(|| {
        engine
            .transfer(&ids[0], &ids[1], Decimal::ONE)
            .expect("transfer failed")
    });
}

/// Benchmark a newest-first history query over a populated ledger
#[divan::bench]
fn history_limit_10(bencher: divan::Bencher) {
    let (engine, ids) = engine_with_accounts(1);
    for _ in 0..1_000 {
        engine.deposit(&ids[0], Decimal::ONE).expect("deposit failed");
    }

    bencher.bench_local(|| engine.history(&ids[0], 10));
}
