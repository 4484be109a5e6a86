//! # Collaborators consumed by the slot controller.
//!
//! - [`ChildBus`] - bus driver for one personality (attach/teardown + card detect)
//! - [`ChildRef`] - shared handle to a child (`Arc<dyn ChildBus>`)
//! - [`PendingConfig`] / [`PendingCounter`] - "initial attach settled" hook
//! - `ChildTable` - the controller's weak references to installed children

mod child;
mod pending;
mod table;

pub use child::{ChildBus, ChildRef};
pub use pending::{PendingConfig, PendingCounter};
pub(crate) use table::ChildTable;
