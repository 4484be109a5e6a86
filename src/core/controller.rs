//! # SlotController: owner of a slot's queue, state, children and worker.
//!
//! ## Architecture
//! ```text
//! probe / interrupt ──► raise_event(e) ──► lock ─► queue.push(e) ─► unlock ─► wake
//!                                                                              │
//!                              start() ──► spawn EventWorker ◄─────────────────┘
//!                                             │ attach / deactivate / disable / detach
//!                                             ▼
//!                                        ChildBus (A | B)
//!
//! stop():
//!   lifecycle Running → Draining
//!   enabled.cancel() + wake
//!   await exited (worker's drop guard)  ─► join worker
//!   lifecycle → Stopped, drop orphaned events (EventsOrphaned)
//! ```
//!
//! ## Rules
//! - `raise_event` only takes the controller lock for a push; it never waits on the worker.
//! - `start` spawns at most one worker and only if a child is installed.
//! - `stop` returns only after the worker has exited; afterwards no child is called.
//! - `stop` is idempotent; concurrent callers all wait for the same exit.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::children::{ChildRef, PendingConfig};
use crate::error::ControllerError;
use crate::events::{Event, EventKind};
use crate::slot::{Personality, SlotEvent, SlotState};

use super::builder::SlotControllerBuilder;
use super::config::SlotConfig;
use super::shared::{Lifecycle, Shared};
use super::worker::EventWorker;

/// Hot-plug slot controller.
///
/// Created through [`SlotController::builder`].
///
/// Call [`stop`](SlotController::stop) and await it before dropping the controller.
/// Dropping it without `stop` only asks the worker to leave: an attach or detach
/// already in progress still completes, and may call its child after the owner
/// has gone.
pub struct SlotController {
    cfg: SlotConfig,
    shared: Arc<Shared>,
    pending: Arc<dyn PendingConfig>,
    /// Worker-enabled flag; cancelled by `stop`.
    enabled: CancellationToken,
    /// Cancelled by the worker's drop guard when it leaves its loop.
    exited: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Stops the subscriber listener when the controller goes away.
    _listener: Option<DropGuard>,
}

impl SlotController {
    /// Returns a builder with the given configuration.
    pub fn builder(cfg: SlotConfig) -> SlotControllerBuilder {
        SlotControllerBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: SlotConfig,
        shared: Arc<Shared>,
        pending: Arc<dyn PendingConfig>,
        listener: Option<DropGuard>,
    ) -> Self {
        Self {
            cfg,
            shared,
            pending,
            enabled: CancellationToken::new(),
            exited: CancellationToken::new(),
            worker: Mutex::new(None),
            _listener: listener,
        }
    }

    /// Slot name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Configuration this controller was built with.
    pub fn config(&self) -> &SlotConfig {
        &self.cfg
    }

    /// Snapshot of the occupancy register.
    pub fn state(&self) -> SlotState {
        self.shared.inner.lock().state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.inner.lock().lifecycle
    }

    /// Number of slot events waiting for the worker.
    pub fn pending_events(&self) -> usize {
        self.shared.inner.lock().queue.len()
    }

    /// Receiver for runtime events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// Installs (or replaces) the child bus for `p`.
    ///
    /// The controller keeps a weak reference; the caller owns the child.
    pub fn install_child(&self, p: Personality, child: &ChildRef) {
        tracing::debug!(slot = %self.shared.name, personality = %p, child = child.name(), "child installed");
        self.shared.inner.lock().children.install(p, child);
    }

    /// Detach notification from the owner of the child for `p`.
    ///
    /// Clears the controller's reference; later events for `p` see no child.
    pub fn child_detached(&self, p: Personality) {
        let released = self.shared.inner.lock().children.release(p);
        if released {
            tracing::debug!(slot = %self.shared.name, personality = %p, "child released");
            self.shared.publish(
                self.shared
                    .event(EventKind::ChildReleased)
                    .with_personality(p),
            );
        }
    }

    /// Queues a slot event and wakes the worker.
    ///
    /// Safe to call from any thread, before or after `start`. Never waits on the worker.
    pub fn raise_event(&self, ev: SlotEvent) {
        self.shared.inner.lock().queue.push(ev);
        self.shared.wake.notify_one();

        tracing::trace!(slot = %self.shared.name, event = %ev, "event raised");
        self.shared
            .publish(self.shared.event(EventKind::EventRaised).with_slot_event(ev));
    }

    /// Spawns the worker and probes installed children for seated cards.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// ### Errors
    /// - [`ControllerError::NoChildren`]: no child installed; no worker is started.
    /// - [`ControllerError::AlreadyStarted`]: worker already running.
    /// - [`ControllerError::Stopped`]: `stop` was called.
    pub fn start(&self) -> Result<(), ControllerError> {
        let probes: Vec<(Personality, ChildRef)> = {
            let mut inner = self.shared.inner.lock();
            match inner.lifecycle {
                Lifecycle::Created => {}
                Lifecycle::Running => return Err(ControllerError::AlreadyStarted),
                Lifecycle::Draining | Lifecycle::Stopped => return Err(ControllerError::Stopped),
            }
            if !inner.children.any() {
                return Err(ControllerError::NoChildren);
            }
            inner.lifecycle = Lifecycle::Running;

            if self.cfg.probe_on_start {
                Personality::ALL
                    .iter()
                    .filter_map(|p| inner.children.get(*p).map(|c| (*p, c)))
                    .collect()
            } else {
                Vec::new()
            }
        };

        self.pending.increment();
        let worker = EventWorker::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.pending),
            self.enabled.clone(),
        );
        let guard = self.exited.clone().drop_guard();
        *self.worker.lock() = Some(tokio::spawn(worker.run(guard)));

        for (p, child) in probes {
            if child.is_card_present() {
                tracing::debug!(slot = %self.shared.name, child = child.name(), "card present at start");
                self.raise_event(SlotEvent::insert(p));
            }
        }
        Ok(())
    }

    /// Stops the worker and waits until it has exited.
    ///
    /// Events still queued afterwards are dropped and reported as `EventsOrphaned`.
    /// Calling `stop` again (or concurrently) only waits for the same exit.
    pub async fn stop(&self) {
        let started = {
            let mut inner = self.shared.inner.lock();
            match inner.lifecycle {
                Lifecycle::Stopped => return,
                Lifecycle::Created => {
                    inner.lifecycle = Lifecycle::Stopped;
                    false
                }
                Lifecycle::Running | Lifecycle::Draining => {
                    inner.lifecycle = Lifecycle::Draining;
                    true
                }
            }
        };

        if started {
            self.enabled.cancel();
            self.shared.wake.notify_one();
            self.exited.cancelled().await;

            let join = self.worker.lock().take();
            if let Some(join) = join {
                if let Err(err) = join.await {
                    tracing::error!(slot = %self.shared.name, error = %err, "slot worker died");
                    self.shared.publish(
                        self.shared
                            .event(EventKind::WorkerDead)
                            .with_reason(err.to_string()),
                    );
                }
            }
        }

        let orphaned = {
            let mut inner = self.shared.inner.lock();
            inner.lifecycle = Lifecycle::Stopped;
            inner.queue.clear()
        };
        if orphaned > 0 {
            tracing::warn!(slot = %self.shared.name, count = orphaned, "events outstanding at stop");
            self.shared.publish(
                self.shared
                    .event(EventKind::EventsOrphaned)
                    .with_count(orphaned),
            );
        }
    }
}

impl Drop for SlotController {
    fn drop(&mut self) {
        // Worker only holds `Shared`; make it leave instead of idling forever.
        self.enabled.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::children::PendingCounter;
    use crate::slot::{Occupant, SlotEvent::*, Work};
    use crate::testkit::{Call, MockChild, child_ref, collect_until, outcomes};
    use std::time::Duration;

    fn slot_with(children: &[(Personality, &Arc<MockChild>)]) -> Arc<SlotController> {
        let mut builder = SlotController::builder(SlotConfig::named("test-slot"));
        for (p, child) in children {
            builder = builder.with_child(*p, &child_ref(child));
        }
        builder.build()
    }

    fn assert_state(slot: &SlotController, occupant: Occupant, work: Work) {
        let state = slot.state();
        assert_eq!((state.occupant(), state.work()), (occupant, work));
    }

    #[tokio::test]
    async fn insert_with_working_card_attaches() {
        let a = Arc::new(MockChild::new("cardbus").with_units(2));
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);

        let seen = collect_until(&mut rx, 1, Event::is_outcome).await;
        let attached = seen.last().unwrap();
        assert_eq!(attached.kind, EventKind::CardAttached);
        assert_eq!(attached.units, Some(2));
        assert_eq!(attached.slot.as_deref(), Some("test-slot"));
        assert_state(&slot, Occupant::TypeA, Work::Working);
        assert_eq!(a.count(Call::Attach), 1);
        slot.stop().await;
    }

    #[tokio::test]
    async fn remove_of_working_card_deactivates_then_detaches() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        slot.raise_event(RemoveCardTypeA);

        assert_eq!(
            outcomes(&mut rx, 2).await,
            vec![EventKind::CardAttached, EventKind::CardDetached]
        );
        assert_eq!(
            a.calls(),
            vec![Call::Attach, Call::Deactivate, Call::Detach { force: false }]
        );
        assert_state(&slot, Occupant::None, Work::NotWorking);
        slot.stop().await;
    }

    #[tokio::test]
    async fn insert_of_other_personality_is_ignored_while_card_works() {
        let a = MockChild::arc("cardbus");
        let b = MockChild::arc("pcmcia");
        let slot = slot_with(&[(Personality::TypeA, &a), (Personality::TypeB, &b)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        slot.raise_event(InsertCardTypeB);

        assert_eq!(
            outcomes(&mut rx, 2).await,
            vec![EventKind::CardAttached, EventKind::InsertIgnored]
        );
        assert!(b.calls().is_empty());
        assert_state(&slot, Occupant::TypeA, Work::Working);
        slot.stop().await;
    }

    #[tokio::test]
    async fn insert_without_child_is_reported_and_not_working() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeB);

        assert_eq!(outcomes(&mut rx, 1).await, vec![EventKind::ChildMissing]);
        assert_state(&slot, Occupant::None, Work::NotWorking);
        assert!(a.calls().is_empty());
        slot.stop().await;
    }

    #[tokio::test]
    async fn bounce_before_drain_collapses_to_single_remove() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();

        slot.raise_event(RemoveCardTypeA);
        slot.raise_event(InsertCardTypeA);
        slot.raise_event(RemoveCardTypeA);
        slot.start().unwrap();

        let seen = collect_until(&mut rx, 1, |e| e.kind == EventKind::Settled).await;
        let kinds: Vec<EventKind> = seen
            .iter()
            .filter(|e| e.is_outcome())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::RemoveIgnored]);

        let suppressed = seen
            .iter()
            .find(|e| e.kind == EventKind::ChatterSuppressed)
            .expect("suppression reported");
        assert_eq!(suppressed.count, Some(1));
        assert_eq!(suppressed.slot_event, Some(RemoveCardTypeA));

        assert_eq!(a.count(Call::Attach), 0);
        slot.stop().await;
    }

    #[tokio::test]
    async fn bounce_while_attaching_removes_the_card_once() {
        let a = Arc::new(MockChild::new("cardbus").gated());
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        a.attach_entered().await;
        slot.raise_event(RemoveCardTypeA);
        slot.raise_event(InsertCardTypeA);
        slot.raise_event(RemoveCardTypeA);
        a.release_attach();

        assert_eq!(
            outcomes(&mut rx, 2).await,
            vec![EventKind::CardAttached, EventKind::CardDetached]
        );
        assert_eq!(a.count(Call::Attach), 1);
        assert_eq!(slot.pending_events(), 0);
        assert_state(&slot, Occupant::None, Work::NotWorking);
        slot.stop().await;
    }

    #[tokio::test]
    async fn repeated_insert_does_not_reattach() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        slot.raise_event(InsertCardTypeA);

        assert_eq!(
            outcomes(&mut rx, 2).await,
            vec![EventKind::CardAttached, EventKind::InsertIgnored]
        );
        assert_eq!(a.count(Call::Attach), 1);
        slot.stop().await;
    }

    #[tokio::test]
    async fn failed_attach_keeps_occupant_until_removed() {
        let a = Arc::new(MockChild::new("cardbus").with_units(0));
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        assert_eq!(outcomes(&mut rx, 1).await, vec![EventKind::AttachFailed]);
        assert_state(&slot, Occupant::TypeA, Work::NotWorking);

        slot.raise_event(RemoveCardTypeA);
        assert_eq!(outcomes(&mut rx, 1).await, vec![EventKind::SlotCleared]);
        assert_state(&slot, Occupant::None, Work::NotWorking);
        assert_eq!(a.calls(), vec![Call::Attach]);
        slot.stop().await;
    }

    #[tokio::test]
    async fn failed_attach_is_retried_on_next_insert() {
        let a = Arc::new(MockChild::new("cardbus").with_units(0));
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        slot.raise_event(InsertCardTypeA);

        assert_eq!(
            outcomes(&mut rx, 2).await,
            vec![EventKind::AttachFailed, EventKind::AttachFailed]
        );
        assert_eq!(a.count(Call::Attach), 2);
        slot.stop().await;
    }

    #[tokio::test]
    async fn sixteen_bit_card_is_disabled_before_forced_detach() {
        let b = MockChild::arc("pcmcia");
        let slot = slot_with(&[(Personality::TypeB, &b)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeB);
        slot.raise_event(RemoveCardTypeB);

        assert_eq!(
            outcomes(&mut rx, 2).await,
            vec![EventKind::CardAttached, EventKind::CardDetached]
        );
        assert_eq!(
            b.calls(),
            vec![
                Call::Attach,
                Call::Deactivate,
                Call::Disable,
                Call::Detach { force: true }
            ]
        );
        slot.stop().await;
    }

    #[tokio::test]
    async fn detach_failure_still_clears_the_slot() {
        let a = Arc::new(MockChild::new("cardbus").with_failing_detach());
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        slot.raise_event(RemoveCardTypeA);

        let seen = collect_until(&mut rx, 2, Event::is_outcome).await;
        let failed = seen.last().unwrap();
        assert_eq!(failed.kind, EventKind::DetachFailed);
        assert_eq!(failed.reason.as_deref(), Some("detach failed: device busy"));
        assert_state(&slot, Occupant::None, Work::NotWorking);
        slot.stop().await;
    }

    #[tokio::test]
    async fn remove_of_other_personality_is_ignored() {
        let a = MockChild::arc("cardbus");
        let b = MockChild::arc("pcmcia");
        let slot = slot_with(&[(Personality::TypeA, &a), (Personality::TypeB, &b)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        slot.raise_event(RemoveCardTypeB);

        assert_eq!(
            outcomes(&mut rx, 2).await,
            vec![EventKind::CardAttached, EventKind::RemoveIgnored]
        );
        assert_state(&slot, Occupant::TypeA, Work::Working);
        assert!(b.calls().is_empty());
        slot.stop().await;
    }

    #[tokio::test]
    async fn events_are_handled_in_raise_order() {
        let a = MockChild::arc("cardbus");
        let b = MockChild::arc("pcmcia");
        let slot = slot_with(&[(Personality::TypeA, &a), (Personality::TypeB, &b)]);
        let mut rx = slot.subscribe();

        for ev in [InsertCardTypeA, RemoveCardTypeA, InsertCardTypeB, RemoveCardTypeB] {
            slot.raise_event(ev);
        }
        slot.start().unwrap();

        let seen = collect_until(&mut rx, 4, Event::is_outcome).await;
        let handled: Vec<(EventKind, Option<SlotEvent>)> = seen
            .iter()
            .filter(|e| e.is_outcome())
            .map(|e| (e.kind, e.slot_event))
            .collect();
        assert_eq!(
            handled,
            vec![
                (EventKind::CardAttached, Some(InsertCardTypeA)),
                (EventKind::CardDetached, Some(RemoveCardTypeA)),
                (EventKind::CardAttached, Some(InsertCardTypeB)),
                (EventKind::CardDetached, Some(RemoveCardTypeB)),
            ]
        );
        slot.stop().await;
    }

    #[tokio::test]
    async fn seated_card_is_probed_at_start_and_settles() {
        let a = Arc::new(MockChild::new("cardbus").with_card_present());
        let pending = Arc::new(PendingCounter::new());
        let slot = SlotController::builder(SlotConfig::named("probe"))
            .with_child(Personality::TypeA, &child_ref(&a))
            .with_pending(pending.clone())
            .build();
        let mut rx = slot.subscribe();

        slot.start().unwrap();

        assert_eq!(outcomes(&mut rx, 1).await, vec![EventKind::CardAttached]);
        tokio::time::timeout(Duration::from_secs(1), pending.wait_settled())
            .await
            .expect("worker released its configuration hold");
        assert_state(&slot, Occupant::TypeA, Work::Working);
        slot.stop().await;
    }

    #[tokio::test]
    async fn probe_can_be_disabled() {
        let a = Arc::new(MockChild::new("cardbus").with_card_present());
        let cfg = SlotConfig {
            probe_on_start: false,
            ..SlotConfig::named("no-probe")
        };
        let slot = SlotController::builder(cfg)
            .with_child(Personality::TypeA, &child_ref(&a))
            .build();
        let mut rx = slot.subscribe();

        slot.start().unwrap();
        collect_until(&mut rx, 1, |e| e.kind == EventKind::Settled).await;
        assert!(a.calls().is_empty());
        slot.stop().await;
    }

    #[tokio::test]
    async fn start_requires_a_child_and_runs_once() {
        let empty = SlotController::builder(SlotConfig::default()).build();
        assert_eq!(empty.start(), Err(ControllerError::NoChildren));
        assert_eq!(empty.lifecycle(), Lifecycle::Created);
        empty.stop().await;
        assert_eq!(empty.lifecycle(), Lifecycle::Stopped);

        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        slot.start().unwrap();
        assert_eq!(slot.lifecycle(), Lifecycle::Running);
        assert_eq!(slot.start(), Err(ControllerError::AlreadyStarted));

        slot.stop().await;
        assert_eq!(slot.lifecycle(), Lifecycle::Stopped);
        assert_eq!(slot.start(), Err(ControllerError::Stopped));
    }

    #[tokio::test]
    async fn stop_waits_for_in_flight_attach() {
        let a = Arc::new(MockChild::new("cardbus").gated());
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        a.attach_entered().await;

        let stopper = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!stopper.is_finished());
        assert_eq!(slot.lifecycle(), Lifecycle::Draining);

        a.release_attach();
        tokio::time::timeout(Duration::from_secs(2), stopper)
            .await
            .expect("stop returned")
            .unwrap();
        assert_eq!(slot.lifecycle(), Lifecycle::Stopped);

        slot.raise_event(RemoveCardTypeA);
        slot.raise_event(InsertCardTypeA);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(a.calls(), vec![Call::Attach]);
    }

    #[tokio::test]
    async fn stop_drops_and_reports_orphaned_events() {
        let a = Arc::new(MockChild::new("cardbus").gated());
        let b = MockChild::arc("pcmcia");
        let slot = slot_with(&[(Personality::TypeA, &a), (Personality::TypeB, &b)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        a.attach_entered().await;
        slot.raise_event(RemoveCardTypeB);
        slot.raise_event(InsertCardTypeB);

        let stopper = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        a.release_attach();
        stopper.await.unwrap();

        let seen = collect_until(&mut rx, 1, |e| e.kind == EventKind::EventsOrphaned).await;
        assert_eq!(seen.last().unwrap().count, Some(2));
        assert_eq!(slot.pending_events(), 0);
        assert!(b.calls().is_empty());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.stop().await;
        slot.stop().await;
        tokio::join!(slot.stop(), slot.stop());

        let seen = collect_until(&mut rx, 1, |e| e.kind == EventKind::WorkerStopped).await;
        assert_eq!(
            seen.iter()
                .filter(|e| e.kind == EventKind::WorkerStopped)
                .count(),
            1
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn never_started_slot_reports_queued_events_on_stop() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();

        slot.raise_event(InsertCardTypeA);
        slot.raise_event(RemoveCardTypeA);
        slot.stop().await;

        let seen = collect_until(&mut rx, 1, |e| e.kind == EventKind::EventsOrphaned).await;
        assert_eq!(seen.last().unwrap().count, Some(2));
        assert!(a.calls().is_empty());
    }

    #[tokio::test]
    async fn released_child_is_no_longer_attached() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.child_detached(Personality::TypeA);
        slot.raise_event(InsertCardTypeA);

        let seen = collect_until(&mut rx, 1, Event::is_outcome).await;
        assert!(seen.iter().any(|e| e.kind == EventKind::ChildReleased
            && e.personality == Some(Personality::TypeA)));
        assert_eq!(seen.last().unwrap().kind, EventKind::ChildMissing);
        assert!(a.calls().is_empty());
        slot.stop().await;
    }

    #[tokio::test]
    async fn remove_after_child_released_clears_without_calling_it() {
        let a = MockChild::arc("cardbus");
        let slot = slot_with(&[(Personality::TypeA, &a)]);
        let mut rx = slot.subscribe();
        slot.start().unwrap();

        slot.raise_event(InsertCardTypeA);
        assert_eq!(outcomes(&mut rx, 1).await, vec![EventKind::CardAttached]);

        slot.child_detached(Personality::TypeA);
        slot.raise_event(RemoveCardTypeA);

        assert_eq!(outcomes(&mut rx, 1).await, vec![EventKind::SlotCleared]);
        assert_state(&slot, Occupant::None, Work::NotWorking);
        assert_eq!(a.calls(), vec![Call::Attach]);
        slot.stop().await;
    }

    #[tokio::test]
    async fn panicking_attach_still_releases_pending_hold() {
        let a = Arc::new(MockChild::new("cardbus").with_panicking_attach());
        let pending = Arc::new(PendingCounter::new());
        let cfg = SlotConfig {
            probe_on_start: false,
            ..SlotConfig::named("panicky")
        };
        let slot = SlotController::builder(cfg)
            .with_child(Personality::TypeA, &child_ref(&a))
            .with_pending(pending.clone())
            .build();
        let mut rx = slot.subscribe();

        // Queued before start, so the worker never sees an empty queue before attach.
        slot.raise_event(InsertCardTypeA);
        slot.start().unwrap();
        tokio::time::timeout(Duration::from_secs(1), async {
            while a.count(Call::Attach) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("worker reached attach");
        slot.stop().await;

        let seen = collect_until(&mut rx, 1, |e| e.kind == EventKind::WorkerDead).await;
        assert!(seen.iter().all(|e| e.kind != EventKind::Settled));
        assert_eq!(pending.pending(), 0);
        tokio::time::timeout(Duration::from_secs(1), pending.wait_settled())
            .await
            .expect("hold released after worker panic");
        assert_eq!(slot.lifecycle(), Lifecycle::Stopped);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_raisers_keep_state_consistent_and_stop_is_final() {
        let a = MockChild::arc("cardbus");
        let b = MockChild::arc("pcmcia");
        let slot = slot_with(&[(Personality::TypeA, &a), (Personality::TypeB, &b)]);
        slot.start().unwrap();

        let pattern = [
            InsertCardTypeA,
            RemoveCardTypeA,
            InsertCardTypeB,
            InsertCardTypeA,
            RemoveCardTypeB,
            RemoveCardTypeA,
        ];
        let mut raisers = Vec::new();
        for i in 0..8 {
            let slot = Arc::clone(&slot);
            raisers.push(tokio::spawn(async move {
                for n in 0..100 {
                    slot.raise_event(pattern[(i + n) % pattern.len()]);
                    if n % 10 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }

        let watcher = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move {
                for _ in 0..200 {
                    let state = slot.state();
                    assert!(!(state.occupant() == Occupant::None && state.work() == Work::Working));
                    tokio::task::yield_now().await;
                }
            })
        };

        for r in raisers {
            r.await.unwrap();
        }
        watcher.await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), slot.stop())
            .await
            .expect("stop returned");

        let (a_calls, b_calls) = (a.calls().len(), b.calls().len());
        for ev in pattern {
            slot.raise_event(ev);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(a.calls().len(), a_calls);
        assert_eq!(b.calls().len(), b_calls);

        let state = slot.state();
        assert!(!(state.occupant() == Occupant::None && state.work() == Work::Working));
    }
}
