//! # Slot data model.
//!
//! - [`SlotEvent`] / [`Personality`]: what the socket reports
//! - [`SlotState`]: occupancy register (`occupant × work`)
//! - [`EventQueue`]: FIFO with chattering suppression
//!
//! ## State machine
//! ```text
//!                 Insert A (attach > 0)
//!   None/NotWorking ───────────────────► A/Working
//!        ▲    │  Insert A (attach = 0)        │
//!        │    └────────────────────► A/NotWorking
//!        │                                    │
//!        └──────── Remove A ──────────────────┘
//!   (same shape for B; Insert on any */Working is a no-op)
//! ```

mod event;
mod queue;
mod state;

pub use event::{Personality, SlotAction, SlotEvent};
pub use queue::EventQueue;
pub use state::{Occupant, SlotState, Work};
