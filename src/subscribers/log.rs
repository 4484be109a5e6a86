//! # LogWriter — event renderer
//!
//! A subscriber that renders incoming [`Event`]s through `tracing`.
//! Install a `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see the output.
//!
//! ## Example output
//! ```text
//! INFO cardslot: raised slot=cardslot0 event=insert_type_a
//! INFO cardslot: attached slot=cardslot0 personality=type_a units=2
//! WARN cardslot: no child bus slot=cardslot0 personality=type_b
//! INFO cardslot: chatter suppressed slot=cardslot0 event=remove_type_a pairs=1
//! WARN cardslot: events outstanding slot=cardslot0 count=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let slot = e.slot.as_deref().unwrap_or("?");
        let event = e.slot_event.map(|ev| ev.as_label()).unwrap_or("-");
        let personality = e.personality.map(|p| p.as_label()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::EventRaised => {
                tracing::info!(target: "cardslot", slot, event, "raised");
            }
            EventKind::ChatterSuppressed => {
                tracing::info!(target: "cardslot", slot, event, pairs = e.count, "chatter suppressed");
            }
            EventKind::WorkerStarted => {
                tracing::info!(target: "cardslot", slot, "worker started");
            }
            EventKind::Settled => {
                tracing::info!(target: "cardslot", slot, "settled");
            }
            EventKind::WorkerStopped => {
                tracing::info!(target: "cardslot", slot, "worker stopped");
            }
            EventKind::WorkerDead => {
                tracing::error!(target: "cardslot", slot, reason, "worker died");
            }
            EventKind::EventsOrphaned => {
                tracing::warn!(target: "cardslot", slot, count = e.count, "events outstanding");
            }
            EventKind::ChildReleased => {
                tracing::info!(target: "cardslot", slot, personality, "child released");
            }
            EventKind::InsertIgnored => {
                tracing::info!(target: "cardslot", slot, event, "card already working");
            }
            EventKind::CardAttached => {
                tracing::info!(target: "cardslot", slot, personality, units = e.units, "attached");
            }
            EventKind::AttachFailed => {
                tracing::warn!(target: "cardslot", slot, personality, "no functional units");
            }
            EventKind::ChildMissing => {
                tracing::warn!(target: "cardslot", slot, personality, "no child bus");
            }
            EventKind::CardDetached => {
                tracing::info!(target: "cardslot", slot, personality, "detached");
            }
            EventKind::DetachFailed => {
                tracing::warn!(target: "cardslot", slot, personality, reason, "detach failed");
            }
            EventKind::RemoveIgnored => {
                tracing::info!(target: "cardslot", slot, event, "nothing to remove");
            }
            EventKind::SlotCleared => {
                tracing::info!(target: "cardslot", slot, personality, "cleared");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "cardslot", subscriber = slot, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(target: "cardslot", subscriber = slot, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
