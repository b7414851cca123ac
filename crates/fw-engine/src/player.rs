//! Player state management.

use std::collections::{BTreeMap, BTreeSet};

use fw_core::LocationId;

/// The player's mutable state.
///
/// Every appended event keeps a copy of this record as it stood after the
/// event, which is what undo restores from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Current location id. Always a key of the world's location table.
    pub location: LocationId,
    /// Canonical names of held items, in pickup order, without duplicates.
    pub inventory: Vec<String>,
    /// Accumulated score.
    pub score: u32,
    /// Coins in the purse.
    pub coins: u32,
    /// Move events so far.
    pub moves_made: u32,
    /// Move events that departed from each location.
    pub moves_from: BTreeMap<LocationId, u32>,
    /// Per-location budget changes granted by item effects.
    pub budget_adjustments: BTreeMap<LocationId, i64>,
    /// Items already paid for on delivery.
    pub delivered: BTreeSet<String>,
}

impl Player {
    /// Create a new player at the given location.
    pub fn new(location: LocationId, coins: u32) -> Self {
        Self {
            location,
            inventory: Vec::new(),
            score: 0,
            coins,
            moves_made: 0,
            moves_from: BTreeMap::new(),
            budget_adjustments: BTreeMap::new(),
            delivered: BTreeSet::new(),
        }
    }

    /// Check if the player holds an item (case-insensitive).
    pub fn has_item(&self, name: &str) -> bool {
        self.inventory.iter().any(|i| i.eq_ignore_ascii_case(name))
    }

    /// Check if the player holds every item in `names`.
    pub fn has_all<'a>(&self, mut names: impl Iterator<Item = &'a String>) -> bool {
        names.all(|name| self.has_item(name))
    }

    /// Add an item to inventory. Returns false if it was already held.
    pub fn add_item(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has_item(&name) {
            return false;
        }
        self.inventory.push(name);
        true
    }

    /// Remove an item from inventory. Returns false if it was not held.
    pub fn remove_item(&mut self, name: &str) -> bool {
        if let Some(pos) = self
            .inventory
            .iter()
            .position(|i| i.eq_ignore_ascii_case(name))
        {
            self.inventory.remove(pos);
            true
        } else {
            false
        }
    }

    /// Count a move departing from `from`.
    pub fn record_move(&mut self, from: LocationId) {
        self.moves_made += 1;
        *self.moves_from.entry(from).or_default() += 1;
    }

    /// Moves that departed from a location.
    pub fn moves_spent_at(&self, location: LocationId) -> u32 {
        self.moves_from.get(&location).copied().unwrap_or(0)
    }

    /// Shift a location's budget by `delta` moves.
    pub fn adjust_budget(&mut self, location: LocationId, delta: i64) {
        *self.budget_adjustments.entry(location).or_default() += delta;
    }

    /// The effective budget for a location given its base ceiling.
    pub fn effective_budget(&self, location: LocationId, base: u32) -> u32 {
        let adjustment = self.budget_adjustments.get(&location).copied().unwrap_or(0);
        (i64::from(base) + adjustment).clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Moves left at a location before its budget is exceeded.
    pub fn moves_left_at(&self, location: LocationId, base: u32) -> u32 {
        self.effective_budget(location, base)
            .saturating_sub(self.moves_spent_at(location))
    }

    /// Record a delivery. Returns false if the item was delivered before.
    pub fn mark_delivered(&mut self, name: impl Into<String>) -> bool {
        self.delivered.insert(name.into())
    }
}
