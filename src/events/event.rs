//! # Runtime events emitted by the slot controller and its worker.
//!
//! The [`EventKind`] enum classifies notices across four categories:
//! - **Intake events**: slot events entering the queue and chattering cancellation
//! - **Outcome events**: exactly one per slot event the worker acts on
//! - **Lifecycle events**: worker start, settle, stop and death
//! - **Subscriber events**: overflow and panic of observers
//!
//! The [`Event`] struct carries metadata such as timestamps, the slot name, the slot
//! event being handled, the personality involved and functional-unit counts.
//!
//! ## Ordering
//! `seq` comes from one process-wide counter. Receivers on different lanes can
//! sort by it to interleave what they saw.
//!
//! ## Example
//! ```rust
//! use cardslot::{Event, EventKind, Personality, SlotEvent};
//!
//! let ev = Event::new(EventKind::CardAttached)
//!     .with_slot("cardslot0")
//!     .with_slot_event(SlotEvent::InsertCardTypeA)
//!     .with_units(2);
//!
//! assert_eq!(ev.kind, EventKind::CardAttached);
//! assert_eq!(ev.personality, Some(Personality::TypeA));
//! assert_eq!(ev.units, Some(2));
//! assert!(ev.is_outcome());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::slot::{Personality, SlotEvent};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Intake events ===
    /// A slot event was appended to the queue.
    ///
    /// Sets:
    /// - `slot`, `slot_event`, `personality`
    EventRaised,

    /// An antonym/repeat pair was cancelled at the head of the queue.
    ///
    /// Sets:
    /// - `slot`, `slot_event` (the popped event that survived), `personality`
    /// - `count`: number of pairs dropped in this pass
    ChatterSuppressed,

    // === Worker lifecycle ===
    /// Worker task spawned.
    WorkerStarted,

    /// Worker found the queue empty for the first time and released the
    /// pending-configuration hold.
    Settled,

    /// Worker left its loop after the enabled flag was cleared.
    WorkerStopped,

    /// Worker terminated by panic (observed while joining it).
    ///
    /// Sets:
    /// - `reason`: join error text
    WorkerDead,

    /// Slot events were still queued when the worker exited; they were dropped.
    ///
    /// Sets:
    /// - `count`: number of dropped events
    EventsOrphaned,

    /// A child reference was released through [`SlotController::child_detached`](crate::SlotController::child_detached).
    ///
    /// Sets:
    /// - `personality`
    ChildReleased,

    // === Outcomes (one per processed slot event) ===
    /// Insertion ignored: a card is already seated and working.
    InsertIgnored,

    /// Card attached with at least one functional unit.
    ///
    /// Sets:
    /// - `units`: functional units reported by the child
    CardAttached,

    /// Child reported zero functional units; the slot stays occupied but not working.
    AttachFailed,

    /// No child is installed for the inserted personality.
    ChildMissing,

    /// A working card was deactivated and detached.
    CardDetached,

    /// A working card was deactivated but the child refused to detach.
    ///
    /// Sets:
    /// - `reason`: child error text
    DetachFailed,

    /// Removal ignored: the slot is not occupied by this personality.
    RemoveIgnored,

    /// Removal of a card that was occupying the slot without working.
    SlotCleared,

    // === Subscriber events ===
    /// An observer's `on_event` panicked.
    ///
    /// Sets:
    /// - `slot`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// An observer's lane refused an event.
    ///
    /// Sets:
    /// - `slot`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,
}

impl EventKind {
    /// Returns `true` for the kinds the worker publishes once per processed slot event.
    #[inline]
    pub fn is_outcome(self) -> bool {
        matches!(
            self,
            EventKind::InsertIgnored
                | EventKind::CardAttached
                | EventKind::AttachFailed
                | EventKind::ChildMissing
                | EventKind::CardDetached
                | EventKind::DetachFailed
                | EventKind::RemoveIgnored
                | EventKind::SlotCleared
        )
    }

    /// Short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::EventRaised => "event_raised",
            EventKind::ChatterSuppressed => "chatter_suppressed",
            EventKind::WorkerStarted => "worker_started",
            EventKind::Settled => "settled",
            EventKind::WorkerStopped => "worker_stopped",
            EventKind::WorkerDead => "worker_dead",
            EventKind::EventsOrphaned => "events_orphaned",
            EventKind::ChildReleased => "child_released",
            EventKind::InsertIgnored => "insert_ignored",
            EventKind::CardAttached => "card_attached",
            EventKind::AttachFailed => "attach_failed",
            EventKind::ChildMissing => "child_missing",
            EventKind::CardDetached => "card_detached",
            EventKind::DetachFailed => "detach_failed",
            EventKind::RemoveIgnored => "remove_ignored",
            EventKind::SlotCleared => "slot_cleared",
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
        }
    }
}

/// A runtime notice. Which optional fields are filled depends on [`EventKind`].
#[derive(Clone, Debug)]
pub struct Event {
    pub seq: u64,
    pub at: SystemTime,

    pub kind: EventKind,
    /// Slot (or subscriber) name.
    pub slot: Option<Arc<str>>,
    /// Slot event that triggered this notice.
    pub slot_event: Option<SlotEvent>,
    /// Personality involved.
    pub personality: Option<Personality>,
    /// Functional units reported by `attach`.
    pub units: Option<u32>,
    /// Generic counter (suppressed pairs, orphaned events).
    pub count: Option<u32>,
    /// Error text, panic message or overflow cause.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Stamps `kind` with the next sequence number and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            slot_event: None,
            personality: None,
            units: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a slot name.
    #[inline]
    pub fn with_slot(mut self, slot: impl Into<Arc<str>>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Attaches the slot event and its personality.
    #[inline]
    pub fn with_slot_event(mut self, ev: SlotEvent) -> Self {
        self.slot_event = Some(ev);
        self.personality = Some(ev.personality());
        self
    }

    /// Attaches a personality.
    #[inline]
    pub fn with_personality(mut self, p: Personality) -> Self {
        self.personality = Some(p);
        self
    }

    /// Attaches a functional-unit count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = Some(u32::try_from(units).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a generic count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(u32::try_from(count).unwrap_or(u32::MAX));
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// `subscriber` could not take an event (`reason`: "full" or "closed").
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_slot(subscriber)
            .with_reason(reason)
    }

    /// `subscriber` panicked while handling an event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_slot(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_outcome(&self) -> bool {
        self.kind.is_outcome()
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
