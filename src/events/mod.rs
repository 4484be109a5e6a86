//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to publish
//! and subscribe to notices emitted by the slot controller and its worker.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `SlotController::raise_event`, `SlotController::stop`,
//!   `EventWorker`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by the builder (fans out to
//!   `SubscriberSet`) and any receiver obtained through `SlotController::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
