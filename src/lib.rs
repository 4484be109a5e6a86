//! # cardslot
//!
//! **cardslot** drives a hot-pluggable card slot that can host one of two mutually
//! exclusive bus personalities: a 32-bit bus (type A) and a 16-bit bus (type B).
//!
//! Insertion and removal notifications arrive from interrupt handlers or polling
//! probes at any time. The controller queues them, cancels contact bounce, and a
//! single worker attaches or tears down the child bus driver for the card in the
//! socket. Shutdown waits for the worker to exit before returning.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   probe / interrupt          probe / interrupt
//!          │                          │
//!          ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SlotController                                                   │
//! │  - raise_event(SlotEvent) ─► EventQueue (lock) ─► wake            │
//! │  - ChildTable (weak refs: type A bus, type B bus)                 │
//! │  - start() / stop()                                               │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                     ┌────────────────────┐
//!                     │    EventWorker     │  pop ─► suppress chatter ─► act
//!                     └──┬──────────────┬──┘
//!                        ▼              ▼
//!                  SlotState       ChildBus::attach / deactivate / disable / detach
//!                        │
//!                        ▼ (runtime events)
//!                  Bus (broadcast) ─► SubscriberSet ─► LogWriter / custom
//! ```
//!
//! ### Chattering
//! ```text
//! raised:     Remove-A, Insert-A, Remove-A     (before the worker drains)
//! processed:  Remove-A                          (Insert-A never attaches)
//! ```
//!
//! ## Features
//! | Area              | Description                                          | Key types / traits                        |
//! |-------------------|------------------------------------------------------|-------------------------------------------|
//! | **Controller**    | Raise events, start and stop the worker.             | [`SlotController`], [`SlotConfig`]        |
//! | **Slot model**    | Events, occupancy register, bounce-cancelling queue. | [`SlotEvent`], [`SlotState`], [`EventQueue`] |
//! | **Children**      | Bus drivers and the settle hook.                     | [`ChildBus`], [`PendingConfig`]           |
//! | **Subscriber API**| Observe runtime events.                              | [`Subscribe`], [`Event`]                  |
//! | **Errors**        | Typed lifecycle and driver errors.                   | [`ControllerError`], [`ChildError`]       |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use cardslot::{
//!     ChildBus, ChildError, ChildRef, Occupant, Personality, SlotConfig, SlotController,
//!     SlotEvent, Work,
//! };
//!
//! struct CardBus;
//!
//! #[async_trait]
//! impl ChildBus for CardBus {
//!     fn name(&self) -> &str { "cardbus0" }
//!     fn is_card_present(&self) -> bool { false }
//!     async fn attach(&self) -> usize { 2 }
//!     async fn deactivate(&self) {}
//!     async fn detach(&self, _force: bool) -> Result<(), ChildError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cardbus: ChildRef = Arc::new(CardBus);
//!     let slot = SlotController::builder(SlotConfig::named("cardslot0"))
//!         .with_child(Personality::TypeA, &cardbus)
//!         .build();
//!
//!     // Events raised before start are kept and handled once the worker runs.
//!     slot.raise_event(SlotEvent::InsertCardTypeA);
//!     slot.start()?;
//!
//!     while slot.pending_events() > 0 || slot.state().work() != Work::Working {
//!         tokio::task::yield_now().await;
//!     }
//!     assert_eq!(slot.state().occupant(), Occupant::TypeA);
//!
//!     slot.stop().await;
//!     Ok(())
//! }
//! ```

mod children;
mod core;
mod error;
mod events;
mod slot;
mod subscribers;

#[cfg(test)]
mod testkit;

// ---- Public re-exports ----

pub use children::{ChildBus, ChildRef, PendingConfig, PendingCounter};
pub use core::{Lifecycle, SlotConfig, SlotController, SlotControllerBuilder};
pub use error::{ChildError, ControllerError};
pub use events::{Bus, Event, EventKind};
pub use slot::{EventQueue, Occupant, Personality, SlotAction, SlotEvent, SlotState, Work};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
