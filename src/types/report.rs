//! Demo run report types
//!
//! A `DemoReport` captures what one demo run did to the shared balance, so the
//! caller can print it and check the conservation identity.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// How the demo's withdrawal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalOutcome {
    /// Funds became sufficient and the amount was deducted
    Settled,
    /// Deposits ran out before funds became sufficient
    Cancelled,
    /// The configured deadline elapsed first
    TimedOut,
}

impl fmt::Display for WithdrawalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawalOutcome::Settled => write!(f, "settled"),
            WithdrawalOutcome::Cancelled => write!(f, "cancelled"),
            WithdrawalOutcome::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Result of one demo run
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    /// Balance the guard was created with
    pub initial_balance: Decimal,

    /// Deposit made before the worker threads start
    pub opening_deposit: Decimal,

    /// Deposits applied by the depositor, in order
    pub deposits: Vec<Decimal>,

    /// Amount the withdrawer asked for
    pub withdrawal: Decimal,

    /// How the withdrawal ended
    pub outcome: WithdrawalOutcome,

    /// Balance read after every worker finished
    pub final_balance: Decimal,
}

impl DemoReport {
    /// Sum of the depositor's deposits (the opening deposit excluded)
    pub fn deposited(&self) -> Decimal {
        self.deposits.iter().sum()
    }

    /// Balance implied by the recorded movements
    ///
    /// `initial + opening + deposits - withdrawal`, the withdrawal counted only
    /// when it settled.
    pub fn expected_balance(&self) -> Decimal {
        let withdrawn = match self.outcome {
            WithdrawalOutcome::Settled => self.withdrawal,
            WithdrawalOutcome::Cancelled | WithdrawalOutcome::TimedOut => Decimal::ZERO,
        };
        self.initial_balance + self.opening_deposit + self.deposited() - withdrawn
    }

    /// Whether the final balance matches the movements and is non-negative
    pub fn is_consistent(&self) -> bool {
        self.final_balance >= Decimal::ZERO && self.final_balance == self.expected_balance()
    }
}
