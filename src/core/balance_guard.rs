//! Blocking balance guard
//!
//! This module provides the `BalanceGuard` struct: one balance behind a mutex,
//! paired with a "sufficient funds" condition variable.
//!
//! # Protocol
//!
//! - `deposit` adds to the balance and notifies every blocked withdrawal
//!   before releasing the lock. It never waits on the condition.
//! - `withdraw` checks `balance >= amount` under the lock. While the check
//!   fails it waits on the condition, which releases the lock while asleep
//!   and re-acquires it on wake, then checks again. Several withdrawals can
//!   wake from one deposit and race for the same funds, so the predicate is
//!   re-checked after every wake.
//! - Holding the lock across check-then-wait rules out lost wakeups.
//!
//! # Failure
//!
//! The lock is a `std::sync::Mutex`. If a thread panics while holding it the
//! guard is considered corrupted: every later operation returns
//! `GuardError::Poisoned` instead of continuing with a suspect balance.

use crate::core::cancellation::CancellationToken;
use crate::types::{validate_amount, GuardError};
use rust_decimal::Decimal;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// State protected by the guard's mutex
#[derive(Debug)]
pub(crate) struct Ledger {
    balance: Decimal,
    /// Withdrawals currently parked on the condition
    waiting: usize,
}

/// Mutex and condition shared between a guard and the tokens watching it
#[derive(Debug)]
pub(crate) struct Monitor {
    ledger: Mutex<Ledger>,
    sufficient_funds: Condvar,
}

impl Monitor {
    /// Wake every parked withdrawal so it re-evaluates its exit conditions
    ///
    /// Taking the lock first orders this wake after any in-flight
    /// check-then-wait, so a waiter cannot miss it.
    pub(crate) fn wake_all(&self) {
        let _ledger = self
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.sufficient_funds.notify_all();
    }
}

/// A balance shared by concurrent depositors and withdrawers
///
/// Share it between threads with `Arc<BalanceGuard>`; every operation takes
/// `&self`.
///
/// # Examples
///
/// ```
/// use balance_guard::BalanceGuard;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
/// use std::thread;
///
/// let guard = Arc::new(BalanceGuard::new(Decimal::new(100, 0)).unwrap());
///
/// let withdrawer = {
///     let guard = Arc::clone(&guard);
///     thread::spawn(move || guard.withdraw(Decimal::new(150, 0)))
/// };
///
/// guard.deposit(Decimal::new(50, 0)).unwrap();
/// assert_eq!(withdrawer.join().unwrap(), Ok(Decimal::ZERO));
/// ```
#[derive(Debug)]
pub struct BalanceGuard {
    monitor: Arc<Monitor>,
}

impl BalanceGuard {
    /// Create a guard holding `initial_balance`
    ///
    /// # Errors
    ///
    /// Returns `GuardError::InvalidAmount` for a negative initial balance.
    pub fn new(initial_balance: Decimal) -> Result<Self, GuardError> {
        let balance = validate_amount(initial_balance, "initial balance")?;

        Ok(BalanceGuard {
            monitor: Arc::new(Monitor {
                ledger: Mutex::new(Ledger {
                    balance,
                    waiting: 0,
                }),
                sufficient_funds: Condvar::new(),
            }),
        })
    }

    /// Add `amount` to the balance and wake every blocked withdrawal
    ///
    /// Returns the balance after the deposit.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` for a negative amount
    /// - `ArithmeticOverflow` if the balance cannot hold the sum
    /// - `Poisoned` if the guard is corrupted
    ///
    /// On error the balance is unchanged and nobody is woken.
    pub fn deposit(&self, amount: Decimal) -> Result<Decimal, GuardError> {
        let amount = validate_amount(amount, "deposit")?;
        let mut ledger = self.lock("deposit")?;

        let new_balance = ledger
            .balance
            .checked_add(amount)
            .ok_or_else(|| GuardError::arithmetic_overflow("deposit"))?;
        ledger.balance = new_balance;

        info!(%amount, balance = %new_balance, waiting = ledger.waiting, "deposit applied");

        // Notify all: any subset of the parked withdrawals may now be satisfiable
        self.monitor.sufficient_funds.notify_all();

        Ok(new_balance)
    }

    /// Subtract `amount`, blocking until the balance covers it
    ///
    /// Blocks indefinitely if no sufficient deposit ever arrives; use
    /// `withdraw_timeout` or `withdraw_cancellable` when that matters.
    /// Returns the balance after the withdrawal.
    pub fn withdraw(&self, amount: Decimal) -> Result<Decimal, GuardError> {
        self.withdraw_with(amount, None, None)
    }

    /// Like `withdraw`, but gives up with `TimedOut` once `deadline` passes
    pub fn withdraw_until(&self, amount: Decimal, deadline: Instant) -> Result<Decimal, GuardError> {
        self.withdraw_with(amount, Some(deadline), None)
    }

    /// Like `withdraw`, but gives up with `TimedOut` after `timeout`
    pub fn withdraw_timeout(&self, amount: Decimal, timeout: Duration) -> Result<Decimal, GuardError> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.withdraw_until(amount, deadline),
            None => self.withdraw(amount),
        }
    }

    /// Like `withdraw`, but gives up with `Cancelled` once `token` is cancelled
    pub fn withdraw_cancellable(
        &self,
        amount: Decimal,
        token: &CancellationToken,
    ) -> Result<Decimal, GuardError> {
        self.withdraw_with(amount, None, Some(token))
    }

    /// Subtract `amount` once the balance covers it, with optional exit conditions
    ///
    /// After every wake the conditions are checked in this order:
    /// 1. funds sufficient: settle and return the new balance
    /// 2. `token` cancelled: return `Cancelled`
    /// 3. `deadline` passed: return `TimedOut`
    ///
    /// A withdrawal that can settle therefore always does. `Cancelled` and
    /// `TimedOut` leave the balance untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` for a negative amount
    /// - `Cancelled` / `TimedOut` as described above
    /// - `Poisoned` if the guard is corrupted
    pub fn withdraw_with(
        &self,
        amount: Decimal,
        deadline: Option<Instant>,
        token: Option<&CancellationToken>,
    ) -> Result<Decimal, GuardError> {
        let amount = validate_amount(amount, "withdrawal")?;

        // Register before the first check so a concurrent cancel reaches this guard
        if let Some(token) = token {
            token.watch(&self.monitor);
        }

        let mut ledger = self.lock("withdrawal")?;
        if ledger.balance < amount {
            ledger = self.wait_for_funds(ledger, amount, deadline, token)?;
        }

        ledger.balance -= amount;
        info!(%amount, balance = %ledger.balance, "withdrawal settled");

        Ok(ledger.balance)
    }

    /// Current balance, read under the lock
    ///
    /// Two reads with no mutation in between return the same value.
    pub fn balance(&self) -> Result<Decimal, GuardError> {
        Ok(self.lock("balance read")?.balance)
    }

    /// Number of withdrawals currently blocked waiting for funds
    pub fn waiting_withdrawals(&self) -> Result<usize, GuardError> {
        Ok(self.lock("waiting count")?.waiting)
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, Ledger>, GuardError> {
        self.monitor.ledger.lock().map_err(|_| {
            error!(operation, "balance lock poisoned");
            GuardError::poisoned(operation)
        })
    }

    /// Park on the condition until `amount` is covered or an exit condition fires
    ///
    /// Returns the re-acquired lock with `balance >= amount`.
    fn wait_for_funds<'a>(
        &'a self,
        mut ledger: MutexGuard<'a, Ledger>,
        amount: Decimal,
        deadline: Option<Instant>,
        token: Option<&CancellationToken>,
    ) -> Result<MutexGuard<'a, Ledger>, GuardError> {
        ledger.waiting += 1;
        debug!(%amount, balance = %ledger.balance, waiting = ledger.waiting, "insufficient funds, waiting");

        let outcome = loop {
            if ledger.balance >= amount {
                break Ok(());
            }
            if token.is_some_and(CancellationToken::is_cancelled) {
                break Err(GuardError::cancelled(amount));
            }

            let woken = match deadline {
                None => self.monitor.sufficient_funds.wait(ledger),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break Err(GuardError::timed_out(amount, ledger.balance));
                    }
                    self.monitor
                        .sufficient_funds
                        .wait_timeout(ledger, deadline - now)
                        .map(|(guard, _)| guard)
                        .map_err(|poisoned| PoisonError::new(poisoned.into_inner().0))
                }
            };

            ledger = match woken {
                Ok(guard) => guard,
                Err(poisoned) => {
                    let mut guard = poisoned.into_inner();
                    guard.waiting -= 1;
                    error!(%amount, "balance lock poisoned while waiting for funds");
                    return Err(GuardError::poisoned("withdrawal"));
                }
            };
            debug!(%amount, balance = %ledger.balance, "woken, re-checking funds");
        };

        ledger.waiting -= 1;
        match outcome {
            Ok(()) => Ok(ledger),
            Err(e) => {
                warn!(%amount, balance = %ledger.balance, error = %e, "withdrawal abandoned");
                Err(e)
            }
        }
    }
}
