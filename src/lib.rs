//! Balance Guard Library
//! # Overview
//!
//! This library provides a shared balance for concurrent depositors and
//! withdrawers, implementing a bounded-wait mutual-exclusion protocol: a
//! withdrawal that cannot be satisfied blocks without busy-waiting and is
//! woken when a deposit may have made it satisfiable.
//!
//! # Architecture
//!
//! - [`core`] - The guards:
//!   - [`core::balance_guard`] - Blocking guard (`Mutex` + `Condvar`) for OS threads
//!   - [`core::r#async`] - Async guard (`tokio` `Mutex` + `Notify`) for tasks
//!   - [`core::cancellation`] - Token for abandoning blocked withdrawals
//! - [`types`] - Amount validation, errors and demo reports
//! - [`cli`] - Demo CLI arguments parsing
//! - [`strategy`] - Demo drivers on threads or tasks
//! - [`io`] - CSV output of demo reports
//!
//! # Operations
//!
//! - **Deposit**: unconditional addition; wakes every blocked withdrawal
//! - **Withdrawal**: conditional subtraction; blocks until the balance covers
//!   it, optionally bounded by a deadline or a cancellation token
//! - **Balance**: consistent read under the lock
//!
//! # Guarantees
//!
//! - the balance is only read or written under the lock
//! - a withdrawal only commits when `balance >= amount`, so the balance never
//!   goes negative
//! - cancelled or timed-out withdrawals never touch the balance

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AsyncBalanceGuard, BalanceGuard, CancellationToken};
pub use io::write_report;
pub use types::{
    amount_from_f64, parse_amount, validate_amount, DemoReport, GuardError, WithdrawalOutcome,
};
