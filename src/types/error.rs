//! Error types for the balance guard
//!
//! This module defines every error a guard operation can surface to its caller.
//!
//! # Error Categories
//!
//! - **Validation Errors**: negative or non-finite amounts
//! - **Wait Outcomes**: a blocked withdrawal was cancelled or ran out of time
//! - **Arithmetic Errors**: a deposit would overflow the balance
//! - **Corruption**: the lock was poisoned by a panic inside a critical section

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for balance guard operations
///
/// None of these errors is ever partially applied: when an operation returns
/// an error the balance is exactly what it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuardError {
    /// Amount is negative or not a finite number
    #[error("Invalid amount '{amount}' for {operation}")]
    InvalidAmount {
        /// The rejected amount, as given by the caller
        amount: String,
        /// Operation that rejected it
        operation: String,
    },

    /// A blocked withdrawal was cancelled before funds became sufficient
    #[error("Withdrawal of {requested} was cancelled while waiting for funds")]
    Cancelled {
        /// Requested withdrawal amount
        requested: Decimal,
    },

    /// The withdrawal deadline elapsed before funds became sufficient
    #[error("Withdrawal of {requested} timed out with balance {balance}")]
    TimedOut {
        /// Requested withdrawal amount
        requested: Decimal,
        /// Balance observed when the deadline elapsed
        balance: Decimal,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// The balance lock was poisoned
    ///
    /// A thread panicked while holding the lock, so the balance can no longer
    /// be trusted. Every later operation on the same guard fails with this error.
    #[error("Balance lock poisoned during {operation}")]
    Poisoned {
        /// Operation that found the lock poisoned
        operation: String,
    },
}

impl GuardError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString, operation: &str) -> Self {
        GuardError::InvalidAmount {
            amount: amount.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create a Cancelled error
    pub fn cancelled(requested: Decimal) -> Self {
        GuardError::Cancelled { requested }
    }

    /// Create a TimedOut error
    pub fn timed_out(requested: Decimal, balance: Decimal) -> Self {
        GuardError::TimedOut { requested, balance }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        GuardError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create a Poisoned error
    pub fn poisoned(operation: &str) -> Self {
        GuardError::Poisoned {
            operation: operation.to_string(),
        }
    }
}
