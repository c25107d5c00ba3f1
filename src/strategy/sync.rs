//! Thread-based demo strategy
//!
//! This module runs the demo on OS threads against the blocking `BalanceGuard`.
//!
//! # Design
//!
//! - one depositor thread applies the deposit plan, pausing between deposits
//! - one withdrawer thread calls `withdraw_with` with the configured deadline
//!   and a cancellation token
//! - once the depositor finishes no more funds can arrive, so the driver
//!   cancels the token; an unsatisfiable withdrawal then ends as `Cancelled`
//!   instead of blocking forever

use crate::core::{BalanceGuard, CancellationToken};
use crate::strategy::{classify_withdrawal, DemoConfig, DemoStrategy};
use crate::types::{DemoReport, GuardError};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::info;

/// Thread-based demo strategy
#[derive(Debug, Clone, Copy)]
pub struct SyncDemoStrategy;

impl DemoStrategy for SyncDemoStrategy {
    fn run(&self, config: &DemoConfig) -> Result<DemoReport, String> {
        let guard = Arc::new(
            BalanceGuard::new(config.initial_balance)
                .map_err(|e| format!("Failed to create balance guard: {}", e))?,
        );
        guard
            .deposit(config.opening_deposit)
            .map_err(|e| format!("Opening deposit failed: {}", e))?;

        let plan = config.deposit_plan();
        let token = CancellationToken::new();
        let deadline = config
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));

        info!(
            deposits = plan.len(),
            withdrawal = %config.withdrawal,
            "starting thread-based demo"
        );

        let withdrawer = {
            let guard = Arc::clone(&guard);
            let token = token.clone();
            let amount = config.withdrawal;
            thread::Builder::new()
                .name("withdrawer".to_string())
                .spawn(move || guard.withdraw_with(amount, deadline, Some(&token)))
                .map_err(|e| format!("Failed to spawn withdrawer thread: {}", e))?
        };

        let depositor = {
            let guard = Arc::clone(&guard);
            thread::Builder::new()
                .name("depositor".to_string())
                .spawn(move || -> Result<Vec<Decimal>, GuardError> {
                    let mut applied = Vec::with_capacity(plan.len());
                    for step in plan {
                        guard.deposit(step.amount)?;
                        applied.push(step.amount);
                        thread::sleep(step.delay);
                    }
                    Ok(applied)
                })
        };

        // Whatever happened to the depositor, no more deposits are coming
        let deposited = match depositor {
            Ok(handle) => handle.join(),
            Err(e) => {
                token.cancel();
                return Err(format!("Failed to spawn depositor thread: {}", e));
            }
        };
        token.cancel();

        let deposits = deposited
            .map_err(|_| "Depositor thread panicked".to_string())?
            .map_err(|e| format!("Deposit failed: {}", e))?;

        let outcome = classify_withdrawal(
            withdrawer
                .join()
                .map_err(|_| "Withdrawer thread panicked".to_string())?,
        )?;

        let final_balance = guard
            .balance()
            .map_err(|e| format!("Failed to read final balance: {}", e))?;
        info!(%outcome, balance = %final_balance, "thread-based demo finished");

        Ok(DemoReport {
            initial_balance: config.initial_balance,
            opening_deposit: config.opening_deposit,
            deposits,
            withdrawal: config.withdrawal,
            outcome,
            final_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WithdrawalOutcome;

    fn quick_config() -> DemoConfig {
        DemoConfig {
            max_delay_ms: 0,
            seed: Some(7),
            ..DemoConfig::default()
        }
    }

    #[test]
    fn test_classic_scenario_is_consistent() {
        let report = SyncDemoStrategy.run(&quick_config()).unwrap();

        assert_eq!(report.deposits.len(), 5);
        assert!(report.is_consistent());

        // 100000 + 3000 + deposits covers 105000 exactly when deposits reach 2000
        let expected = if report.deposited() >= Decimal::new(2_000, 0) {
            WithdrawalOutcome::Settled
        } else {
            WithdrawalOutcome::Cancelled
        };
        assert_eq!(report.outcome, expected);
    }

    #[test]
    fn test_covered_withdrawal_settles() {
        let config = DemoConfig {
            initial_balance: Decimal::ZERO,
            opening_deposit: Decimal::new(500, 0),
            withdrawal: Decimal::new(500, 0),
            deposits: 0,
            ..quick_config()
        };

        let report = SyncDemoStrategy.run(&config).unwrap();

        assert_eq!(report.outcome, WithdrawalOutcome::Settled);
        assert_eq!(report.final_balance, Decimal::ZERO);
    }

    #[test]
    fn test_unreachable_withdrawal_is_cancelled() {
        let config = DemoConfig {
            initial_balance: Decimal::ZERO,
            opening_deposit: Decimal::ZERO,
            withdrawal: Decimal::new(1_000_000, 0),
            deposits: 3,
            max_deposit: 10,
            ..quick_config()
        };

        let report = SyncDemoStrategy.run(&config).unwrap();

        assert_eq!(report.outcome, WithdrawalOutcome::Cancelled);
        assert_eq!(report.final_balance, report.deposited());
        assert!(report.is_consistent());
    }

    #[test]
    fn test_invalid_initial_balance_is_fatal() {
        let config = DemoConfig {
            initial_balance: Decimal::new(-1, 0),
            ..quick_config()
        };

        let error = SyncDemoStrategy.run(&config).unwrap_err();
        assert!(error.starts_with("Failed to create balance guard"));
    }
}
