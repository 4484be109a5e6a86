use super::event::Personality;

/// Personality currently believed to be seated in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occupant {
    #[default]
    None,
    TypeA,
    TypeB,
}

impl Occupant {
    #[inline]
    pub fn is(self, p: Personality) -> bool {
        self == Occupant::from(p)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        matches!(self, Occupant::None)
    }
}

impl From<Personality> for Occupant {
    fn from(p: Personality) -> Self {
        match p {
            Personality::TypeA => Occupant::TypeA,
            Personality::TypeB => Occupant::TypeB,
        }
    }
}

/// Whether the occupant attached with at least one functional unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Work {
    #[default]
    NotWorking,
    Working,
}

/// Occupancy register of a slot.
///
/// Plain assignments only. The worker keeps `work == Working` implying
/// `occupant != None`; nothing here checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotState {
    occupant: Occupant,
    work: Work,
}

impl SlotState {
    /// `None/NotWorking`.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn occupant(&self) -> Occupant {
        self.occupant
    }

    #[inline]
    pub fn work(&self) -> Work {
        self.work
    }

    #[inline]
    pub fn set_occupant(&mut self, occupant: Occupant) {
        self.occupant = occupant;
    }

    #[inline]
    pub fn set_work(&mut self, work: Work) {
        self.work = work;
    }

    /// A card of either personality is seated and working.
    #[inline]
    pub fn is_working(&self) -> bool {
        !self.occupant.is_none() && self.work == Work::Working
    }
}
