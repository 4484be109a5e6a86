//! # Slot controller configuration.
//!
//! Provides [`SlotConfig`], the settings for one slot controller.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`SlotConfig::bus_capacity_clamped`]

/// Configuration for one slot controller.
///
/// ## Field semantics
/// - `name`: slot name carried by every runtime event (e.g. "cardslot0")
/// - `bus_capacity`: runtime event ring buffer size (min 1)
/// - `probe_on_start`: ask each child for a seated card when the worker starts
#[derive(Clone, Debug)]
pub struct SlotConfig {
    /// Slot name used in events and logs.
    pub name: String,

    /// Capacity of the runtime event broadcast channel.
    ///
    /// Receivers lagging more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Synthesize an insertion event at start for every child reporting a card.
    ///
    /// Children are probed in personality order (type A, then type B).
    pub probe_on_start: bool,
}

impl SlotConfig {
    /// Config with the given name and default settings.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SlotConfig {
    /// Default configuration:
    ///
    /// - `name = "cardslot0"`
    /// - `bus_capacity = 1024`
    /// - `probe_on_start = true`
    fn default() -> Self {
        Self {
            name: "cardslot0".to_string(),
            bus_capacity: 1024,
            probe_on_start: true,
        }
    }
}
