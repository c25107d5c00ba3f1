//! Demo strategy module
//!
//! This module defines the Strategy pattern for demo runs: one depositor and one
//! withdrawer working against a shared balance. The same scenario can run on OS
//! threads with the blocking guard or on tokio tasks with the async guard,
//! selected at runtime.

use crate::cli::StrategyType;
use crate::types::{DemoReport, GuardError, WithdrawalOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;

pub mod r#async;
pub mod sync;

pub use self::r#async::AsyncDemoStrategy;
pub use sync::SyncDemoStrategy;

/// Configuration for a demo run
///
/// Defaults reproduce the classic scenario: a 100000 balance, a 3000 opening
/// deposit, a 105000 withdrawal and five random deposits below 1000.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// Balance the guard starts with
    pub initial_balance: Decimal,
    /// Deposit made before the workers start
    pub opening_deposit: Decimal,
    /// Amount the withdrawer requests
    pub withdrawal: Decimal,
    /// Number of random deposits
    pub deposits: usize,
    /// Deposits are drawn from `[0, max_deposit)`
    pub max_deposit: u32,
    /// Pause after each deposit is drawn from `[0, max_delay_ms)` milliseconds
    pub max_delay_ms: u64,
    /// Optional deadline for the withdrawal
    pub timeout: Option<Duration>,
    /// Seed for a reproducible deposit plan
    pub seed: Option<u64>,
    /// tokio worker threads for the async strategy
    pub worker_threads: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::new(100_000, 0),
            opening_deposit: Decimal::new(3_000, 0),
            withdrawal: Decimal::new(105_000, 0),
            deposits: 5,
            max_deposit: 1_000,
            max_delay_ms: 1_500,
            timeout: None,
            seed: None,
            worker_threads: num_cpus::get(),
        }
    }
}

impl DemoConfig {
    /// Replace invalid settings with their defaults
    pub fn validated(mut self) -> Self {
        if self.worker_threads == 0 {
            let default = Self::default().worker_threads;
            warn!(
                worker_threads = self.worker_threads,
                default, "invalid worker thread count, using default"
            );
            self.worker_threads = default;
        }
        self
    }

    /// Draw the amounts and pauses of the depositor's deposits
    ///
    /// The plan is fixed up front so a seeded run is reproducible regardless of
    /// how the threads interleave.
    pub fn deposit_plan(&self) -> Vec<ScheduledDeposit> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        (0..self.deposits)
            .map(|_| {
                let amount = if self.max_deposit == 0 {
                    Decimal::ZERO
                } else {
                    Decimal::from(rng.gen_range(0..self.max_deposit))
                };
                let delay = if self.max_delay_ms == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rng.gen_range(0..self.max_delay_ms))
                };
                ScheduledDeposit { amount, delay }
            })
            .collect()
    }
}

/// One step of the depositor: deposit `amount`, then pause for `delay`
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledDeposit {
    pub amount: Decimal,
    pub delay: Duration,
}

/// Demo strategy trait
///
/// Each strategy runs the full scenario: create the guard, make the opening
/// deposit, run the depositor and the withdrawer concurrently, cancel the
/// withdrawal once no more deposits are coming, and report the result.
pub trait DemoStrategy: Send + Sync {
    /// Run the scenario described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be built, a worker panics, or
    /// a guard operation fails for any reason other than the withdrawal
    /// being cancelled or timing out.
    fn run(&self, config: &DemoConfig) -> Result<DemoReport, String>;
}

/// Create a demo strategy based on the specified strategy type
///
/// Both strategies run the same scenario against the same guard protocol;
/// they differ only in whether the depositor and the withdrawer are OS
/// threads or tokio tasks.
///
/// # Arguments
///
/// * `strategy_type` - Which strategy to create (Sync or Async)
///
/// # Returns
///
/// A boxed trait object implementing the `DemoStrategy` trait
pub fn create_strategy(strategy_type: StrategyType) -> Box<dyn DemoStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncDemoStrategy),
        StrategyType::Async => Box::new(AsyncDemoStrategy),
    }
}

/// Map the withdrawer's result onto a report outcome
///
/// Cancellation and time-out are expected endings of the demo; any other
/// error is fatal.
pub(crate) fn classify_withdrawal(
    result: Result<Decimal, GuardError>,
) -> Result<WithdrawalOutcome, String> {
    match result {
        Ok(_) => Ok(WithdrawalOutcome::Settled),
        Err(GuardError::Cancelled { .. }) => Ok(WithdrawalOutcome::Cancelled),
        Err(GuardError::TimedOut { .. }) => Ok(WithdrawalOutcome::TimedOut),
        Err(e) => Err(format!("Withdrawal failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config_matches_classic_scenario() {
        let config = DemoConfig::default();

        assert_eq!(config.initial_balance, Decimal::new(100_000, 0));
        assert_eq!(config.opening_deposit, Decimal::new(3_000, 0));
        assert_eq!(config.withdrawal, Decimal::new(105_000, 0));
        assert_eq!(config.deposits, 5);
        assert_eq!(config.worker_threads, num_cpus::get());
    }

    #[test]
    fn test_validated_replaces_zero_worker_threads() {
        let config = DemoConfig {
            worker_threads: 0,
            ..DemoConfig::default()
        }
        .validated();

        assert_eq!(config.worker_threads, num_cpus::get());
    }

    #[test]
    fn test_deposit_plan_respects_bounds() {
        let config = DemoConfig {
            deposits: 50,
            max_deposit: 10,
            max_delay_ms: 5,
            seed: Some(1),
            ..DemoConfig::default()
        };

        let plan = config.deposit_plan();

        assert_eq!(plan.len(), 50);
        for step in plan {
            assert!(step.amount >= Decimal::ZERO && step.amount < Decimal::new(10, 0));
            assert!(step.delay < Duration::from_millis(5));
        }
    }

    #[test]
    fn test_seeded_deposit_plan_is_reproducible() {
        let config = DemoConfig {
            seed: Some(42),
            ..DemoConfig::default()
        };

        assert_eq!(config.deposit_plan(), config.deposit_plan());
    }

    #[test]
    fn test_zero_bounds_give_zero_deposits_without_pauses() {
        let config = DemoConfig {
            deposits: 3,
            max_deposit: 0,
            max_delay_ms: 0,
            ..DemoConfig::default()
        };

        for step in config.deposit_plan() {
            assert_eq!(step.amount, Decimal::ZERO);
            assert_eq!(step.delay, Duration::ZERO);
        }
    }

    #[rstest]
    #[case::settled(Ok(Decimal::ZERO), Ok(WithdrawalOutcome::Settled))]
    #[case::cancelled(Err(GuardError::cancelled(Decimal::ONE)), Ok(WithdrawalOutcome::Cancelled))]
    #[case::timed_out(
        Err(GuardError::timed_out(Decimal::ONE, Decimal::ZERO)),
        Ok(WithdrawalOutcome::TimedOut)
    )]
    #[case::poisoned(
        Err(GuardError::poisoned("withdrawal")),
        Err("Withdrawal failed: Balance lock poisoned during withdrawal".to_string())
    )]
    fn test_classify_withdrawal(
        #[case] result: Result<Decimal, GuardError>,
        #[case] expected: Result<WithdrawalOutcome, String>,
    ) {
        assert_eq!(classify_withdrawal(result), expected);
    }
}
