//! # Pending-configuration hook.
//!
//! Device discovery often needs to know when every slot has finished its initial
//! attach. The controller takes one hold when it starts its worker and the worker
//! releases it the first time it finds the queue empty.
//!
//! [`PendingCounter`] is the built-in implementation: a counter that can be awaited.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Receiver of configuration holds.
pub trait PendingConfig: Send + Sync + 'static {
    /// Takes one hold.
    fn increment(&self);

    /// Releases one hold.
    fn decrement(&self);
}

/// Awaitable hold counter.
///
/// ## Example
/// ```rust
/// use cardslot::{PendingConfig, PendingCounter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pending = PendingCounter::new();
/// pending.increment();
/// assert_eq!(pending.pending(), 1);
/// pending.decrement();
/// pending.wait_settled().await;
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PendingCounter {
    holds: AtomicUsize,
    settled: Notify,
}

impl PendingCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding holds.
    pub fn pending(&self) -> usize {
        self.holds.load(Ordering::Acquire)
    }

    /// Resolves once no hold is outstanding.
    pub async fn wait_settled(&self) {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl PendingConfig for PendingCounter {
    fn increment(&self) {
        self.holds.fetch_add(1, Ordering::AcqRel);
    }

    fn decrement(&self) {
        let prev = self
            .holds
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match prev {
            Ok(1) => self.settled.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("pending configuration released without a hold"),
        }
    }
}
