//! Error types used by the slot controller and child buses.
//!
//! This module defines two enums:
//!
//! - [`ControllerError`] — misuse of the controller lifecycle.
//! - [`ChildError`] — failures reported by a child bus driver.
//!
//! Both provide `as_label` for logging. Nothing in this crate retries on error:
//! a failed attach or detach is only revisited on the next slot event.

use thiserror::Error;

/// # Errors produced by the slot controller lifecycle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// Neither personality has a child installed; the worker is not started.
    #[error("no child bus installed; slot has nothing to drive")]
    NoChildren,

    /// `start()` was already called and the worker is running.
    #[error("worker already started")]
    AlreadyStarted,

    /// The controller was stopped; it cannot be restarted.
    #[error("controller stopped")]
    Stopped,
}

impl ControllerError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use cardslot::ControllerError;
    ///
    /// assert_eq!(ControllerError::NoChildren.as_label(), "controller_no_children");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerError::NoChildren => "controller_no_children",
            ControllerError::AlreadyStarted => "controller_already_started",
            ControllerError::Stopped => "controller_stopped",
        }
    }
}

/// # Errors reported by a child bus driver.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChildError {
    /// The driver refused or failed to tear down the card.
    #[error("detach failed: {reason}")]
    DetachFailed {
        /// Driver-provided message.
        reason: String,
    },

    /// The driver is busy and did not detach (only returned when `force` is false).
    #[error("child busy")]
    Busy,
}

impl ChildError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChildError::DetachFailed { .. } => "child_detach_failed",
            ChildError::Busy => "child_busy",
        }
    }
}
