//! # Child bus abstraction.
//!
//! A slot drives one child bus per personality. The controller never decodes the
//! bus protocol; it only asks the child to attach or tear down whatever card is in
//! the socket. The common handle type is [`ChildRef`], an `Arc<dyn ChildBus>` owned
//! by whoever created the bus; the controller keeps only a weak reference.
//!
//! Only the slot worker calls the async methods, one at a time, with no controller
//! lock held.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChildError;

/// Shared handle to a child bus.
pub type ChildRef = Arc<dyn ChildBus>;

/// # Bus driver hosted by a slot.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use cardslot::{ChildBus, ChildError};
///
/// struct Null;
///
/// #[async_trait]
/// impl ChildBus for Null {
///     fn name(&self) -> &str { "null" }
///     fn is_card_present(&self) -> bool { false }
///     async fn attach(&self) -> usize { 0 }
///     async fn deactivate(&self) {}
///     async fn detach(&self, _force: bool) -> Result<(), ChildError> { Ok(()) }
/// }
/// ```
#[async_trait]
pub trait ChildBus: Send + Sync + 'static {
    /// Stable, human-readable name (e.g. "cardbus0").
    fn name(&self) -> &str;

    /// Card-detect probe. Called synchronously by `SlotController::start`.
    fn is_card_present(&self) -> bool;

    /// Attaches the seated card; returns the number of functional units that work.
    ///
    /// `0` means the card is unusable.
    async fn attach(&self) -> usize;

    /// Quiesces the card's functions before teardown.
    async fn deactivate(&self);

    /// Electrically disables the socket. Called between `deactivate` and `detach`
    /// for 16-bit cards only.
    async fn disable(&self) {}

    /// Tears down the card's driver structures.
    async fn detach(&self, force: bool) -> Result<(), ChildError>;
}
