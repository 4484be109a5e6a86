//! Slot runtime: controller, worker and their wiring.
//!
//! The only public API from this module is [`SlotController`] (with its builder,
//! config and lifecycle). Internal modules:
//! - [`controller`]: raise/start/stop and child installation;
//! - [`worker`]: the single queue consumer performing attach/detach;
//! - [`builder`]: bus, subscriber and child wiring;
//! - [`shared`]: the lock-protected state shared by controller and worker;
//! - [`config`]: per-slot settings.

mod builder;
mod config;
mod controller;
mod shared;
mod worker;

pub use builder::SlotControllerBuilder;
pub use config::SlotConfig;
pub use controller::SlotController;
pub use shared::Lifecycle;
