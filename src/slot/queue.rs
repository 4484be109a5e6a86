//! # EventQueue: FIFO of slot events with chattering cancellation.
//!
//! ## Rules
//! - Mutated only while the controller lock is held.
//! - Unbounded; an allocation failure on push aborts the process.
//! - Chattering suppression only looks at the head of the queue.
//!
//! ## Chattering
//! A flaky contact produces `remove, insert, remove` where a single `remove` was meant.
//! After the worker pops an event `e`, the queue head is inspected:
//! ```text
//! popped: e       queue: [antonym(e), e, ...rest]  ──►  queue: [...rest]
//! ```
//! The check repeats until the head no longer matches.

use std::collections::VecDeque;

use super::event::SlotEvent;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<SlotEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the tail.
    #[inline]
    pub fn push(&mut self, ev: SlotEvent) {
        self.events.push_back(ev);
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<SlotEvent> {
        self.events.pop_front()
    }

    /// Drops `antonym(popped), popped` pairs from the head; returns how many pairs went.
    pub fn suppress_chatter(&mut self, popped: SlotEvent) -> usize {
        let antonym = popped.antonym();
        let mut pairs = 0;
        while self.events.len() >= 2 && self.events[0] == antonym && self.events[1] == popped {
            self.events.drain(..2);
            pairs += 1;
        }
        pairs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes every queued event.
    pub fn clear(&mut self) -> usize {
        let n = self.events.len();
        self.events.clear();
        n
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotEvent> {
        self.events.iter()
    }
}
