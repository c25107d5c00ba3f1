//! Balance guard for tokio tasks
//!
//! This module provides `AsyncBalanceGuard`, the async counterpart of the
//! blocking `BalanceGuard`. It suspends a task instead of parking a thread.
//!
//! # Design
//!
//! - `tokio::sync::Mutex<Decimal>` holds the balance
//! - `tokio::sync::Notify` plays the "sufficient funds" condition;
//!   deposits call `notify_waiters` to wake every suspended withdrawal
//! - a withdrawal enables its `Notified` future *before* checking the
//!   balance, so a deposit landing between the check and the `.await` is
//!   still delivered
//!
//! # Cancellation
//!
//! The balance is only mutated in a critical section with no `.await` between
//! the check and the subtraction. Dropping a pending `withdraw` future (abort,
//! `select!`, `timeout`) therefore never leaves a partial withdrawal behind.
//!
//! Cancellation tokens and deadlines are checked inside that same critical
//! section, after the funds check. Wrap `withdraw` in `select!` or
//! `tokio::time::timeout` only when giving up mid-lock is acceptable.

use crate::core::cancellation::CancellationToken;
use crate::types::{validate_amount, GuardError};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Async balance shared by concurrent depositor and withdrawer tasks
///
/// Share it between tasks with `Arc<AsyncBalanceGuard>`.
#[derive(Debug)]
pub struct AsyncBalanceGuard {
    balance: Mutex<Decimal>,
    sufficient_funds: Notify,
    waiting: AtomicUsize,
}

/// Counts a suspended withdrawal for as long as it lives
struct WaitingSlot<'a>(&'a AtomicUsize);

impl<'a> WaitingSlot<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        WaitingSlot(counter)
    }
}

impl Drop for WaitingSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncBalanceGuard {
    /// Create a guard holding `initial_balance`
    pub fn new(initial_balance: Decimal) -> Result<Self, GuardError> {
        let balance = validate_amount(initial_balance, "initial balance")?;

        Ok(Self {
            balance: Mutex::new(balance),
            sufficient_funds: Notify::new(),
            waiting: AtomicUsize::new(0),
        })
    }

    /// Add `amount` to the balance and wake every suspended withdrawal
    ///
    /// Returns the balance after the deposit.
    pub async fn deposit(&self, amount: Decimal) -> Result<Decimal, GuardError> {
        let amount = validate_amount(amount, "deposit")?;
        let mut balance = self.balance.lock().await;

        let new_balance = balance
            .checked_add(amount)
            .ok_or_else(|| GuardError::arithmetic_overflow("deposit"))?;
        *balance = new_balance;

        info!(%amount, balance = %new_balance, waiting = self.waiting_withdrawals(), "deposit applied");
        self.sufficient_funds.notify_waiters();

        Ok(new_balance)
    }

    /// Subtract `amount`, suspending until the balance covers it
    ///
    /// Returns the balance after the withdrawal. The future is cancel-safe:
    /// dropping it before completion leaves the balance untouched.
    pub async fn withdraw(&self, amount: Decimal) -> Result<Decimal, GuardError> {
        self.withdraw_with(amount, None, None).await
    }

    /// Like `withdraw`, but gives up with `TimedOut` after `timeout`
    pub async fn withdraw_timeout(
        &self,
        amount: Decimal,
        timeout: Duration,
    ) -> Result<Decimal, GuardError> {
        let deadline = Instant::now().checked_add(timeout);
        self.withdraw_with(amount, deadline, None).await
    }

    /// Like `withdraw`, but gives up with `Cancelled` once `token` is cancelled
    ///
    /// A withdrawal that can settle when the token fires still settles.
    pub async fn withdraw_cancellable(
        &self,
        amount: Decimal,
        token: &CancellationToken,
    ) -> Result<Decimal, GuardError> {
        self.withdraw_with(amount, None, Some(token)).await
    }

    /// Subtract `amount` once the balance covers it, with optional exit conditions
    ///
    /// Every check runs under the lock, in this order:
    /// 1. funds sufficient: settle and return the new balance
    /// 2. `token` cancelled: return `Cancelled`
    /// 3. `deadline` passed: return `TimedOut` with the balance seen in that check
    ///
    /// The token and the deadline only interrupt the suspension between
    /// checks, never the wait for the lock, so a withdrawal that can settle
    /// always does.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` for a negative amount
    /// - `Cancelled` / `TimedOut` as described above
    pub async fn withdraw_with(
        &self,
        amount: Decimal,
        deadline: Option<Instant>,
        token: Option<&CancellationToken>,
    ) -> Result<Decimal, GuardError> {
        let amount = validate_amount(amount, "withdrawal")?;
        let mut slot: Option<WaitingSlot<'_>> = None;

        loop {
            let notified = self.sufficient_funds.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut balance = self.balance.lock().await;
                if *balance >= amount {
                    *balance -= amount;
                    info!(%amount, balance = %*balance, "withdrawal settled");
                    return Ok(*balance);
                }

                let abandoned = if token.is_some_and(CancellationToken::is_cancelled) {
                    Some(GuardError::cancelled(amount))
                } else if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    Some(GuardError::timed_out(amount, *balance))
                } else {
                    None
                };
                if let Some(e) = abandoned {
                    warn!(%amount, balance = %*balance, error = %e, "withdrawal abandoned");
                    return Err(e);
                }

                if slot.is_none() {
                    slot = Some(WaitingSlot::enter(&self.waiting));
                    debug!(%amount, balance = %*balance, waiting = self.waiting_withdrawals(), "insufficient funds, waiting");
                }
            }

            tokio::select! {
                _ = notified => {}
                _ = cancelled(token) => {}
                _ = expired(deadline) => {}
            }
            debug!(%amount, "woken, re-checking funds");
        }
    }

    /// Current balance, read under the lock
    pub async fn balance(&self) -> Decimal {
        *self.balance.lock().await
    }

    /// Number of withdrawals currently suspended waiting for funds
    pub fn waiting_withdrawals(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

/// Completes once `token` is cancelled; never without a token
async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Completes at `deadline`; never without one
async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
