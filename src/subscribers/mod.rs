//! # Event subscribers for the slot controller.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out
//! used to observe runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   EventWorker ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                        │
//!                                                         ┌──────────────┼──────────┐
//!                                                         ▼              ▼          ▼
//!                                                     LogWriter       Metrics     Custom
//! ```
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], which renders events through `tracing`.

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
