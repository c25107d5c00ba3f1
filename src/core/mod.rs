//! Core synchronization module
//!
//! This module contains the balance guard components:
//! - `balance_guard` - Blocking guard built on `Mutex` + `Condvar`
//! - `cancellation` - Token for abandoning blocked withdrawals
//! - `async` - tokio implementation of the guard

pub mod r#async;
pub mod balance_guard;
pub mod cancellation;

pub use balance_guard::BalanceGuard;
pub use cancellation::CancellationToken;
pub use r#async::AsyncBalanceGuard;
