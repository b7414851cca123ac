//! Item effects and the reversible world mutations recorded on events.

use fw_core::{LocationId, World};

/// A change an event made to the world's mutable fields.
///
/// Player-side changes are not listed here: undo restores the player from
/// the snapshot on the preceding event instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEffect {
    /// An item left a location (picked up or bought).
    ItemRemoved {
        /// Canonical item name.
        item: String,
        /// Where it lay.
        location: LocationId,
    },
    /// An item was put down at a location.
    ItemPlaced {
        /// Canonical item name.
        item: String,
        /// Where it now lies.
        location: LocationId,
    },
}

impl WorldEffect {
    /// Perform the change. Returns false if the world was not in the
    /// expected state and nothing changed.
    pub fn apply(&self, world: &mut World) -> bool {
        match self {
            Self::ItemRemoved { item, location } => world
                .location_mut(*location)
                .is_some_and(|loc| loc.items_present.remove(item)),
            Self::ItemPlaced { item, location } => world
                .location_mut(*location)
                .is_some_and(|loc| loc.items_present.insert(item.clone())),
        }
    }

    /// Undo the change.
    pub fn revert(&self, world: &mut World) -> bool {
        self.inverse().apply(world)
    }

    /// The effect that cancels this one.
    pub fn inverse(&self) -> Self {
        match self {
            Self::ItemRemoved { item, location } => Self::ItemPlaced {
                item: item.clone(),
                location: *location,
            },
            Self::ItemPlaced { item, location } => Self::ItemRemoved {
                item: item.clone(),
                location: *location,
            },
        }
    }
}

/// What using an item does, parsed from its effect tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEffect {
    /// `step-modifier:<n>`: add `n` moves to the current location's budget.
    StepModifier(i64),
    /// `halve-moves`: lose half of the moves left at the current location.
    HalveMoves,
}

impl ItemEffect {
    /// Parse an effect tag. Unknown tags give `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        if tag == "halve-moves" {
            return Some(Self::HalveMoves);
        }
        tag.strip_prefix("step-modifier:")
            .and_then(|n| n.trim().parse().ok())
            .map(Self::StepModifier)
    }

    /// The budget change this effect makes when `left` moves remain.
    pub fn budget_delta(&self, left: u32) -> i64 {
        match self {
            Self::StepModifier(n) => *n,
            Self::HalveMoves => -i64::from(left / 2),
        }
    }
}
