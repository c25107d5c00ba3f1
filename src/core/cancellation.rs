//! Cancellation for blocked withdrawals
//!
//! A `CancellationToken` ends waits on both guard flavours:
//! - blocking guards re-check `is_cancelled` after every wake, and `cancel`
//!   wakes every guard a cancellable withdrawal has registered with the token
//! - async guards check `is_cancelled` under their lock and wake on `cancelled()`
//!
//! The flag itself is a `tokio_util::sync::CancellationToken`, so cloning a
//! token shares its state.

use crate::core::balance_guard::Monitor;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Cloneable handle used to abandon blocked withdrawals
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: tokio_util::sync::CancellationToken,
    /// Blocking guards with a withdrawal watching this token
    watched: Arc<Mutex<Vec<Weak<Monitor>>>>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token and wake every blocked withdrawal watching it
    ///
    /// Withdrawals that can already settle still settle; the others return
    /// `GuardError::Cancelled`. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        self.inner.cancel();

        let watched = self.watched.lock().unwrap_or_else(PoisonError::into_inner);
        for monitor in watched.iter().filter_map(Weak::upgrade) {
            monitor.wake_all();
        }
    }

    /// Whether `cancel` has been called on this token or a clone of it
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Completes once the token is cancelled
    pub async fn cancelled(&self) {
        self.inner.cancelled().await
    }

    /// Register a blocking guard so `cancel` can wake its waiters
    pub(crate) fn watch(&self, monitor: &Arc<Monitor>) {
        let mut watched = self.watched.lock().unwrap_or_else(PoisonError::into_inner);
        watched.retain(|m| m.strong_count() > 0);
        if !watched
            .iter()
            .any(|m| std::ptr::eq(m.as_ptr(), Arc::as_ptr(monitor)))
        {
            watched.push(Arc::downgrade(monitor));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BalanceGuard;
    use crate::types::GuardError;
    use rust_decimal::Decimal;
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_for_waiters(guard: &BalanceGuard, expected: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while guard.waiting_withdrawals().unwrap() != expected {
            assert!(Instant::now() < deadline, "waiters never parked");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_new_token_is_not_cancelled() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn test_clones_share_cancellation() {
        let token = CancellationToken::new();
        let clone = token.clone();

        clone.cancel();

        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_watch_registers_each_guard_once() {
        let guard = BalanceGuard::new(Decimal::ONE).unwrap();
        let token = CancellationToken::new();

        guard.withdraw_cancellable(Decimal::ZERO, &token).unwrap();
        guard.withdraw_cancellable(Decimal::ZERO, &token).unwrap();

        assert_eq!(token.watched.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_dropped_guards_are_pruned() {
        let token = CancellationToken::new();
        {
            let guard = BalanceGuard::new(Decimal::ONE).unwrap();
            guard.withdraw_cancellable(Decimal::ZERO, &token).unwrap();
        }

        let guard = BalanceGuard::new(Decimal::ONE).unwrap();
        guard.withdraw_cancellable(Decimal::ZERO, &token).unwrap();

        assert_eq!(token.watched.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_cancel_wakes_waiters_on_several_guards() {
        let first = Arc::new(BalanceGuard::new(Decimal::ZERO).unwrap());
        let second = Arc::new(BalanceGuard::new(Decimal::ZERO).unwrap());
        let token = CancellationToken::new();

        let handles: Vec<_> = [Arc::clone(&first), Arc::clone(&second)]
            .into_iter()
            .map(|guard| {
                let token = token.clone();
                thread::spawn(move || guard.withdraw_cancellable(Decimal::ONE, &token))
            })
            .collect();
        wait_for_waiters(&first, 1);
        wait_for_waiters(&second, 1);

        token.cancel();

        for handle in handles {
            assert_eq!(
                handle.join().unwrap(),
                Err(GuardError::cancelled(Decimal::ONE))
            );
        }
    }
}
