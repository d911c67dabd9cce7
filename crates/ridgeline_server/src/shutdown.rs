//! # Shutdown Coordinator
//!
//! Cooperative shutdown: a shared flag observed at loop boundaries, plus a
//! notifier so the accept loop can stop parking on `accept()` promptly.
//!
//! Connection handlers check the flag only between requests. A handler
//! blocked on a header read finishes serving that request before it
//! notices; nothing is interrupted mid-frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Clonable handle to the server's shutdown state.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    /// Creates an un-triggered handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the flag and wakes the accept loop.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// True once shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Resolves when [`trigger`](Self::trigger) is called (or immediately
    /// if it already was).
    pub async fn triggered(&self) {
        loop {
            // Register before checking the flag; notify_waiters only wakes
            // waiters that are already registered.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_is_observed() {
        let handle = ShutdownHandle::new();
        assert!(!handle.is_triggered());

        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.triggered().await });

        handle.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter woke up")
            .unwrap();
        assert!(handle.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_immediately_after_the_fact() {
        let handle = ShutdownHandle::new();
        handle.trigger();
        handle.triggered().await; // must not hang
    }
}
