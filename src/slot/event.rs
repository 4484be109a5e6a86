//! # Slot events and bus personalities.
//!
//! A slot hosts one of two mutually exclusive bus personalities. Every change the
//! socket reports is one of four [`SlotEvent`]s: insertion or removal of a card of
//! either personality.

use std::fmt;

/// Bus protocol a card speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Personality {
    /// 32-bit bus (CardBus).
    TypeA,
    /// 16-bit bus (PC Card).
    TypeB,
}

impl Personality {
    /// Both personalities, in probe order.
    pub const ALL: [Personality; 2] = [Personality::TypeA, Personality::TypeB];

    pub fn as_label(self) -> &'static str {
        match self {
            Personality::TypeA => "type_a",
            Personality::TypeB => "type_b",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Insertion or removal reported by the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotEvent {
    InsertCardTypeA,
    RemoveCardTypeA,
    InsertCardTypeB,
    RemoveCardTypeB,
}

/// Direction of a [`SlotEvent`], split from its personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Insert(Personality),
    Remove(Personality),
}

impl SlotEvent {
    /// Insertion event for `p`.
    #[inline]
    pub fn insert(p: Personality) -> Self {
        match p {
            Personality::TypeA => SlotEvent::InsertCardTypeA,
            Personality::TypeB => SlotEvent::InsertCardTypeB,
        }
    }

    /// Removal event for `p`.
    #[inline]
    pub fn remove(p: Personality) -> Self {
        match p {
            Personality::TypeA => SlotEvent::RemoveCardTypeA,
            Personality::TypeB => SlotEvent::RemoveCardTypeB,
        }
    }

    #[inline]
    pub fn personality(self) -> Personality {
        match self {
            SlotEvent::InsertCardTypeA | SlotEvent::RemoveCardTypeA => Personality::TypeA,
            SlotEvent::InsertCardTypeB | SlotEvent::RemoveCardTypeB => Personality::TypeB,
        }
    }

    #[inline]
    pub fn action(self) -> SlotAction {
        match self {
            SlotEvent::InsertCardTypeA | SlotEvent::InsertCardTypeB => {
                SlotAction::Insert(self.personality())
            }
            SlotEvent::RemoveCardTypeA | SlotEvent::RemoveCardTypeB => {
                SlotAction::Remove(self.personality())
            }
        }
    }

    #[inline]
    pub fn is_insert(self) -> bool {
        matches!(self.action(), SlotAction::Insert(_))
    }

    /// Same personality, opposite direction.
    #[inline]
    pub fn antonym(self) -> Self {
        match self {
            SlotEvent::InsertCardTypeA => SlotEvent::RemoveCardTypeA,
            SlotEvent::RemoveCardTypeA => SlotEvent::InsertCardTypeA,
            SlotEvent::InsertCardTypeB => SlotEvent::RemoveCardTypeB,
            SlotEvent::RemoveCardTypeB => SlotEvent::InsertCardTypeB,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            SlotEvent::InsertCardTypeA => "insert_type_a",
            SlotEvent::RemoveCardTypeA => "remove_type_a",
            SlotEvent::InsertCardTypeB => "insert_type_b",
            SlotEvent::RemoveCardTypeB => "remove_type_b",
        }
    }
}

impl fmt::Display for SlotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
