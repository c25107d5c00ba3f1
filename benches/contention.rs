//! Benchmark suite for the balance guards
//!
//! Compares uncontended and contended deposit/withdraw cycles on the blocking
//! guard, and the same cycle on the async guard, using the divan benchmarking
//! framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use balance_guard::{AsyncBalanceGuard, BalanceGuard};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;

fn main() {
    divan::main();
}

/// Deposit then withdraw the same amount on one thread; never waits
#[divan::bench]
fn uncontended_cycle(bencher: divan::Bencher) {
    let guard = BalanceGuard::new(Decimal::ZERO).expect("valid initial balance");

    bencher.bench_local(|| {
        guard.deposit(Decimal::ONE).expect("deposit failed");
        guard.withdraw(Decimal::ONE).expect("withdrawal failed")
    });
}

/// Withdrawer threads that must wait on depositor threads
#[divan::bench(args = [1, 2, 4, 8])]
fn contended_cycles(threads: usize) {
    const ROUNDS: usize = 1_000;

    let guard = Arc::new(BalanceGuard::new(Decimal::ZERO).expect("valid initial balance"));

    let withdrawers: Vec<_> = (0..threads)
        .map(|_| {
            let guard = Arc::clone(&guard);
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    guard.withdraw(Decimal::ONE).expect("withdrawal failed");
                }
            })
        })
        .collect();

    let depositors: Vec<_> = (0..threads)
        .map(|_| {
            let guard = Arc::clone(&guard);
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    guard.deposit(Decimal::ONE).expect("deposit failed");
                }
            })
        })
        .collect();

    for handle in depositors.into_iter().chain(withdrawers) {
        handle.join().expect("worker panicked");
    }
}

/// Deposit then withdraw on the async guard inside a current-thread runtime
#[divan::bench]
fn async_uncontended_cycle(bencher: divan::Bencher) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to create tokio runtime");
    let guard = AsyncBalanceGuard::new(Decimal::ZERO).expect("valid initial balance");

    bencher.bench_local(|| {
        runtime.block_on(async {
            guard.deposit(Decimal::ONE).await.expect("deposit failed");
            guard.withdraw(Decimal::ONE).await.expect("withdrawal failed")
        })
    });
}
