//! # Fan-out of runtime events to slot observers.
//!
//! Each [`Subscribe`] implementation gets its own lane: a bounded queue drained by a
//! dedicated task. Delivering to a lane never waits, so a slow or broken observer
//! cannot hold up the slot worker or the other observers.
//!
//! ```text
//! emit(ev) ──► lane "LogWriter" [cap 1024] ──► task ──► on_event(ev)
//!          ├─► lane "audit"     [cap 512]  ──► task ──► on_event(ev)   (panic → SubscriberPanicked)
//!          └─► lane full / closed          ──► SubscriberOverflow on the bus
//! ```
//!
//! Order is preserved within a lane only. Overflow and panic reports are never
//! reported again when they themselves overflow or panic. A panicking `on_event` is caught with
//! `AssertUnwindSafe`, so an observer that panics while holding its own lock may
//! leave that state half-updated for its next event.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Observers of one slot controller, each behind its own bounded lane.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    tasks: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one lane task per observer. Must run inside a tokio runtime.
    ///
    /// Panics and overflows are reported on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (lanes, tasks): (Vec<Lane>, Vec<JoinHandle<()>>) = subs
            .into_iter()
            .map(|sub| spawn_lane(sub, bus.clone()))
            .unzip();
        Self { lanes, tasks, bus }
    }

    /// Hands `event` to every lane without waiting.
    ///
    /// A lane that cannot take it drops it; the drop is reported unless the event is
    /// itself an overflow report.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        let report = event.kind != EventKind::SubscriberOverflow;

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&shared)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if report {
                tracing::warn!(subscriber = lane.name, reason, "subscriber dropped event");
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Closes every lane and waits until each observer has handled what it queued.
    pub async fn shutdown(self) {
        let Self { lanes, tasks, .. } = self;
        drop(lanes);
        for task in tasks {
            let _ = task.await;
        }
    }
}

fn spawn_lane(sub: Arc<dyn Subscribe>, bus: Bus) -> (Lane, JoinHandle<()>) {
    let name = sub.name();
    let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

    let task = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let delivered = std::panic::AssertUnwindSafe(sub.on_event(&ev))
                .catch_unwind()
                .await;
            if let Err(payload) = delivered {
                let info = panic_message(payload.as_ref());
                tracing::warn!(subscriber = name, %info, "subscriber panicked");
                // A panic on a panic report is not reported again; the report
                // would come back to this lane.
                if !ev.is_subscriber_panic() {
                    bus.publish(Event::subscriber_panicked(name, info));
                }
            }
        }
    });
    (Lane { name, tx }, task)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    match payload.downcast_ref::<&'static str>() {
        Some(msg) => (*msg).to_string(),
        None => payload
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}
