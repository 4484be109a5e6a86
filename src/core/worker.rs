//! # EventWorker: the single consumer of a slot's event queue.
//!
//! ## Loop
//! ```text
//! while enabled {
//!   lock
//!   ├─ queue empty:
//!   │    ├─ first time → unlock, release pending hold, publish Settled
//!   │    └─ wait (wake | stop), re-check enabled
//!   └─ pop e, suppress chatter at head
//!   unlock
//!   ├─ Insert X → attach child X (unless a card already works)
//!   └─ Remove X → deactivate [+ disable for B] + detach, clear occupancy
//! }
//! release the pending hold if still held, publish WorkerStopped, drop exit guard
//! ```
//!
//! ## Rules
//! - The lock is never held across a child call or an `.await`.
//! - Only this worker calls child operations and mutates the [`SlotState`](crate::SlotState).
//! - Exactly one outcome event is published per processed slot event.
//! - The exit guard cancels the controller's "exited" token on return **and** on panic;
//!   the pending hold is released the same way.

use std::sync::Arc;

use tokio_util::sync::{CancellationToken, DropGuard};

use crate::children::{ChildRef, PendingConfig};
use crate::events::EventKind;
use crate::slot::{Occupant, Personality, SlotAction, SlotEvent, Work};

use super::shared::Shared;

pub(super) struct EventWorker {
    shared: Arc<Shared>,
    pending: Arc<dyn PendingConfig>,
    enabled: CancellationToken,
}

/// What a removal has to do once the lock is released.
enum Teardown {
    /// Occupied by another personality (or empty).
    Ignore,
    /// Occupied by this personality but not working.
    Clear,
    /// Working card; tear it down through its child.
    Detach(ChildRef),
    /// Working card whose child is gone.
    Orphan,
}

/// The worker's pending-configuration hold, released at most once.
///
/// Dropping it releases a hold still taken, so a worker that panics in a child
/// call does not leave `PendingConfig` waiting forever.
struct SettleHold {
    pending: Arc<dyn PendingConfig>,
    held: bool,
}

impl SettleHold {
    fn new(pending: Arc<dyn PendingConfig>) -> Self {
        Self { pending, held: true }
    }

    /// Returns `true` if this call released the hold.
    fn release(&mut self) -> bool {
        let released = std::mem::replace(&mut self.held, false);
        if released {
            self.pending.decrement();
        }
        released
    }
}

impl Drop for SettleHold {
    fn drop(&mut self) {
        self.release();
    }
}

impl EventWorker {
    pub fn new(
        shared: Arc<Shared>,
        pending: Arc<dyn PendingConfig>,
        enabled: CancellationToken,
    ) -> Self {
        Self {
            shared,
            pending,
            enabled,
        }
    }

    /// Runs until the enabled token is cancelled.
    pub async fn run(self, exited: DropGuard) {
        let _exited = exited;
        let mut hold = SettleHold::new(Arc::clone(&self.pending));

        self.shared
            .publish(self.shared.event(EventKind::WorkerStarted));

        while !self.enabled.is_cancelled() {
            let next = {
                let mut inner = self.shared.inner.lock();
                inner.queue.pop_front().map(|ev| {
                    let pairs = inner.queue.suppress_chatter(ev);
                    (ev, pairs)
                })
            };

            let Some((ev, pairs)) = next else {
                if hold.release() {
                    self.shared.publish(self.shared.event(EventKind::Settled));
                }
                tokio::select! {
                    _ = self.enabled.cancelled() => {}
                    _ = self.shared.wake.notified() => {}
                }
                continue;
            };

            if pairs > 0 {
                tracing::debug!(slot = %self.shared.name, event = %ev, pairs, "chatter suppressed");
                self.shared.publish(
                    self.shared
                        .event(EventKind::ChatterSuppressed)
                        .with_slot_event(ev)
                        .with_count(pairs),
                );
            }

            match ev.action() {
                SlotAction::Insert(p) => self.insert(ev, p).await,
                SlotAction::Remove(p) => self.remove(ev, p).await,
            }
        }

        // Stopped before the queue ever ran dry.
        hold.release();
        self.shared
            .publish(self.shared.event(EventKind::WorkerStopped));
    }

    async fn insert(&self, ev: SlotEvent, p: Personality) {
        let child = {
            let mut inner = self.shared.inner.lock();
            if inner.state.is_working() {
                None
            } else if let Some(child) = inner.children.get(p) {
                inner.state.set_occupant(p.into());
                Some(Ok(child))
            } else {
                inner.state.set_work(Work::NotWorking);
                Some(Err(()))
            }
        };

        let child = match child {
            None => {
                tracing::debug!(slot = %self.shared.name, event = %ev, "card already working");
                self.outcome(EventKind::InsertIgnored, ev);
                return;
            }
            Some(Err(())) => {
                tracing::warn!(slot = %self.shared.name, personality = %p, "no child bus for inserted card");
                self.outcome(EventKind::ChildMissing, ev);
                return;
            }
            Some(Ok(child)) => child,
        };

        let units = child.attach().await;

        let work = if units > 0 {
            Work::Working
        } else {
            Work::NotWorking
        };
        self.shared.inner.lock().state.set_work(work);

        if units > 0 {
            tracing::debug!(slot = %self.shared.name, child = child.name(), units, "card attached");
            self.shared.publish(
                self.shared
                    .event(EventKind::CardAttached)
                    .with_slot_event(ev)
                    .with_units(units),
            );
        } else {
            tracing::warn!(slot = %self.shared.name, child = child.name(), "card has no functional units");
            self.outcome(EventKind::AttachFailed, ev);
        }
    }

    async fn remove(&self, ev: SlotEvent, p: Personality) {
        let teardown = {
            let inner = self.shared.inner.lock();
            let state = inner.state;
            if !state.occupant().is(p) {
                Teardown::Ignore
            } else if state.work() != Work::Working {
                Teardown::Clear
            } else {
                match inner.children.get(p) {
                    Some(child) => Teardown::Detach(child),
                    None => Teardown::Orphan,
                }
            }
        };

        let kind = match teardown {
            Teardown::Ignore => {
                tracing::debug!(slot = %self.shared.name, event = %ev, "nothing to remove");
                self.outcome(EventKind::RemoveIgnored, ev);
                return;
            }
            Teardown::Clear => EventKind::SlotCleared,
            Teardown::Orphan => {
                tracing::warn!(slot = %self.shared.name, personality = %p, "working card lost its child bus");
                EventKind::SlotCleared
            }
            Teardown::Detach(child) => {
                child.deactivate().await;
                let force = p == Personality::TypeB;
                if force {
                    child.disable().await;
                }
                match child.detach(force).await {
                    Ok(()) => {
                        tracing::debug!(slot = %self.shared.name, child = child.name(), "card detached");
                        EventKind::CardDetached
                    }
                    Err(err) => {
                        tracing::warn!(slot = %self.shared.name, child = child.name(), error = %err, "detach failed");
                        self.clear();
                        self.shared.publish(
                            self.shared
                                .event(EventKind::DetachFailed)
                                .with_slot_event(ev)
                                .with_reason(err.to_string()),
                        );
                        return;
                    }
                }
            }
        };

        self.clear();
        self.outcome(kind, ev);
    }

    /// `None/NotWorking`, in that order under one lock.
    fn clear(&self) {
        let mut inner = self.shared.inner.lock();
        inner.state.set_work(Work::NotWorking);
        inner.state.set_occupant(Occupant::None);
    }

    fn outcome(&self, kind: EventKind, ev: SlotEvent) {
        self.shared
            .publish(self.shared.event(kind).with_slot_event(ev));
    }
}
