use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::children::ChildTable;
use crate::events::{Bus, Event, EventKind};
use crate::slot::{EventQueue, SlotState};

/// Controller lifecycle.
///
/// `Created → Running → Draining → Stopped`; a controller stopped before it was
/// started goes straight from `Created` to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Built; worker not started.
    Created,
    /// Worker running.
    Running,
    /// `stop()` requested; waiting for the worker to exit.
    Draining,
    /// Worker exited (or never started). Terminal.
    Stopped,
}

/// Everything guarded by the controller lock.
pub(crate) struct Inner {
    pub queue: EventQueue,
    pub state: SlotState,
    pub children: ChildTable,
    pub lifecycle: Lifecycle,
}

/// State shared between the controller, its worker and raisers.
pub(crate) struct Shared {
    pub name: Arc<str>,
    pub inner: Mutex<Inner>,
    /// Wakes the worker: new event or stop request.
    pub wake: Notify,
    pub bus: Bus,
}

impl Shared {
    pub fn new(name: &str, bus: Bus) -> Self {
        Self {
            name: Arc::from(name),
            inner: Mutex::new(Inner {
                queue: EventQueue::new(),
                state: SlotState::new(),
                children: ChildTable::new(),
                lifecycle: Lifecycle::Created,
            }),
            wake: Notify::new(),
            bus,
        }
    }

    /// Event of `kind` stamped with this slot's name.
    pub fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_slot(Arc::clone(&self.name))
    }

    pub fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }
}
