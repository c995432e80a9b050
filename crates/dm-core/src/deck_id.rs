//! Deck slot identity.

use core::fmt;

/// One of the console's two deck slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeckId {
    A,
    B,
}

impl DeckId {
    /// Both slots, in crossfader order.
    pub const ALL: [DeckId; 2] = [DeckId::A, DeckId::B];

    /// Slot index (A = 0, B = 1).
    pub const fn index(self) -> usize {
        match self {
            DeckId::A => 0,
            DeckId::B => 1,
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            DeckId::A => "A",
            DeckId::B => "B",
        }
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
