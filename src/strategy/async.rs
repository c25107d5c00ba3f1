//! Task-based demo strategy
//!
//! This module runs the demo on a multi-threaded tokio runtime against the
//! `AsyncBalanceGuard`.
//!
//! # Architecture
//!
//! ```text
//! AsyncDemoStrategy
//!     ├── tokio runtime (worker_threads from DemoConfig)
//!     ├── depositor task (tokio::time::sleep between deposits)
//!     └── withdrawer task (withdraw_with: cancellation token, optional deadline)
//!         └── AsyncBalanceGuard (tokio Mutex + Notify)
//! ```

use crate::core::{AsyncBalanceGuard, CancellationToken};
use crate::strategy::{classify_withdrawal, DemoConfig, DemoStrategy};
use crate::types::{DemoReport, GuardError};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

/// Task-based demo strategy
#[derive(Debug, Clone, Copy)]
pub struct AsyncDemoStrategy;

impl DemoStrategy for AsyncDemoStrategy {
    fn run(&self, config: &DemoConfig) -> Result<DemoReport, String> {
        // Create tokio runtime for async execution
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let guard = Arc::new(
                AsyncBalanceGuard::new(config.initial_balance)
                    .map_err(|e| format!("Failed to create balance guard: {}", e))?,
            );
            guard
                .deposit(config.opening_deposit)
                .await
                .map_err(|e| format!("Opening deposit failed: {}", e))?;

            let plan = config.deposit_plan();
            let token = CancellationToken::new();

            info!(
                deposits = plan.len(),
                withdrawal = %config.withdrawal,
                worker_threads = config.worker_threads,
                "starting task-based demo"
            );

            let withdrawer = {
                let guard = Arc::clone(&guard);
                let token = token.clone();
                let amount = config.withdrawal;
                let timeout = config.timeout;
                tokio::spawn(async move {
                    let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
                    guard.withdraw_with(amount, deadline, Some(&token)).await
                })
            };

            let depositor = {
                let guard = Arc::clone(&guard);
                tokio::spawn(async move {
                    let mut applied = Vec::with_capacity(plan.len());
                    for step in plan {
                        guard.deposit(step.amount).await?;
                        applied.push(step.amount);
                        tokio::time::sleep(step.delay).await;
                    }
                    Ok::<Vec<Decimal>, GuardError>(applied)
                })
            };

            // Whatever happened to the depositor, no more deposits are coming
            let deposited = depositor.await;
            token.cancel();

            let deposits = deposited
                .map_err(|e| format!("Depositor task failed: {}", e))?
                .map_err(|e| format!("Deposit failed: {}", e))?;

            let outcome = classify_withdrawal(
                withdrawer
                    .await
                    .map_err(|e| format!("Withdrawer task failed: {}", e))?,
            )?;

            let final_balance = guard.balance().await;
            info!(%outcome, balance = %final_balance, "task-based demo finished");

            Ok(DemoReport {
                initial_balance: config.initial_balance,
                opening_deposit: config.opening_deposit,
                deposits,
                withdrawal: config.withdrawal,
                outcome,
                final_balance,
            })
        })
    }
}
