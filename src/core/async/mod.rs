//! Asynchronous implementations of core components
//!
//! This module provides the tokio counterpart of the blocking guard.
//!
//! # Architecture
//!
//! The async guard keeps the same operations and guarantees as the
//! synchronous version, built on tokio primitives:
//!
//! - **AsyncBalanceGuard**: `tokio::sync::Mutex` + `tokio::sync::Notify`
//!
//! # Thread Safety
//!
//! The guard is `Send + Sync`; share it between tasks with `Arc`.

pub mod balance_guard;

pub use balance_guard::AsyncBalanceGuard;
