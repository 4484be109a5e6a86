use std::sync::{Arc, Weak};

use crate::slot::Personality;

use super::child::{ChildBus, ChildRef};

/// Non-owning references to the child bus of each personality.
///
/// An entry is cleared explicitly by the owner's detach notification; a reference
/// whose owner went away without notifying reads as absent as well.
#[derive(Default)]
pub struct ChildTable {
    type_a: Option<Weak<dyn ChildBus>>,
    type_b: Option<Weak<dyn ChildBus>>,
}

impl ChildTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, p: Personality) -> &mut Option<Weak<dyn ChildBus>> {
        match p {
            Personality::TypeA => &mut self.type_a,
            Personality::TypeB => &mut self.type_b,
        }
    }

    /// Installs (or replaces) the child for `p`.
    pub fn install(&mut self, p: Personality, child: &ChildRef) {
        *self.entry(p) = Some(Arc::downgrade(child));
    }

    /// Clears the entry for `p`; returns whether one was present.
    pub fn release(&mut self, p: Personality) -> bool {
        self.entry(p).take().is_some()
    }

    /// Live child for `p`, if any.
    pub fn get(&self, p: Personality) -> Option<ChildRef> {
        let entry = match p {
            Personality::TypeA => &self.type_a,
            Personality::TypeB => &self.type_b,
        };
        entry.as_ref().and_then(Weak::upgrade)
    }

    /// True if at least one personality has a live child.
    pub fn any(&self) -> bool {
        Personality::ALL.iter().any(|p| self.get(*p).is_some())
    }
}
