use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a location. The id space is exactly the key space
/// of the world's location table.
pub type LocationId = u32;

/// What a location-specific command leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandTarget {
    /// Moving to another location.
    Destination(LocationId),
    /// An alias for another command (e.g. `"read sign": "look"`).
    Action(String),
}

impl fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destination(id) => write!(f, "-> {id}"),
            Self::Action(tag) => write!(f, "({tag})"),
        }
    }
}

/// A node in the game map.
#[derive(Debug, Clone)]
pub struct Location {
    /// Unique location id.
    pub id: LocationId,
    /// Display name, unique across locations.
    pub name: String,
    /// Text shown on every visit after the first.
    pub brief_text: String,
    /// Text shown on the first visit and on `look`.
    pub long_text: String,
    /// Lower-cased command string to target.
    pub available_commands: BTreeMap<String, CommandTarget>,
    /// Names of the items currently lying here.
    pub items_present: BTreeSet<String>,
    /// Whether the player has been here. Only ever goes from false to true.
    pub visited: bool,
    /// Item the player must hold to enter.
    pub unlock_condition: Option<String>,
    /// Ceiling on moves the player may spend here.
    pub move_budget: Option<u32>,
    /// Name of the NPC standing here.
    pub npc_present: Option<String>,
    /// Puzzle description, if this location has one.
    pub puzzle_text: Option<String>,
    /// Item consumed when the puzzle is solved.
    pub puzzle_requires: Option<String>,
}

impl Location {
    /// Create a bare location with no commands, items, or constraints.
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            brief_text: String::new(),
            long_text: String::new(),
            available_commands: BTreeMap::new(),
            items_present: BTreeSet::new(),
            visited: false,
            unlock_condition: None,
            move_budget: None,
            npc_present: None,
            puzzle_text: None,
            puzzle_requires: None,
        }
    }

    /// Look up a local command (case-insensitive).
    pub fn command(&self, input: &str) -> Option<&CommandTarget> {
        self.available_commands.get(&input.trim().to_lowercase())
    }

    /// The text to show on arrival: long on the first visit, brief after.
    ///
    /// Falls back to the other text when one of them is empty.
    pub fn arrival_text(&self, first_visit: bool) -> &str {
        let (preferred, fallback) = if first_visit {
            (&self.long_text, &self.brief_text)
        } else {
            (&self.brief_text, &self.long_text)
        };
        if preferred.is_empty() {
            fallback
        } else {
            preferred
        }
    }

    /// Whether the named item is lying here. Expects the canonical name.
    pub fn has_item(&self, name: &str) -> bool {
        self.items_present.contains(name)
    }

    /// Whether this location carries a puzzle.
    pub fn has_puzzle(&self) -> bool {
        self.puzzle_text.is_some()
    }
}

/// An item in the world. There is exactly one record per name.
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique, non-empty name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Where the item lies when the game starts.
    pub start_position: Option<LocationId>,
    /// Where the item must be delivered.
    pub target_position: Option<LocationId>,
    /// Score paid on delivery.
    pub target_points: u32,
    /// Coins paid on delivery.
    pub coins: u32,
    /// Special behavior tag (e.g. `step-modifier:10`, `halve-moves`).
    pub effect: Option<String>,
    /// Item the player must hold before this one can be picked up.
    pub unlock_condition: Option<String>,
}

impl Item {
    /// Create an item with no positions, rewards, or effect.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            start_position: None,
            target_position: None,
            target_points: 0,
            coins: 0,
            effect: None,
            unlock_condition: None,
        }
    }
}

/// A non-player character.
#[derive(Debug, Clone)]
pub struct Npc {
    /// Unique name.
    pub name: String,
    /// Where the NPC stands.
    pub location: LocationId,
    /// What the NPC says when nothing else applies.
    pub dialogue: String,
    /// Items the NPC's mission asks for. Empty means no mission.
    pub mission_items: BTreeSet<String>,
    /// Score paid once the mission is completed.
    pub reward_points: u32,
    /// Item name to price in coins.
    pub selling_items: BTreeMap<String, u32>,
}

impl Npc {
    /// Create an NPC with no mission and nothing for sale.
    pub fn new(name: impl Into<String>, location: LocationId) -> Self {
        Self {
            name: name.into(),
            location,
            dialogue: String::new(),
            mission_items: BTreeSet::new(),
            reward_points: 0,
            selling_items: BTreeMap::new(),
        }
    }

    /// Whether this NPC offers a mission.
    pub fn has_mission(&self) -> bool {
        !self.mission_items.is_empty()
    }

    /// Whether this NPC runs a shop.
    pub fn is_merchant(&self) -> bool {
        !self.selling_items.is_empty()
    }

    /// Find a listing by item name (case-insensitive). Returns the canonical
    /// item name and its price.
    pub fn listing(&self, item: &str) -> Option<(&str, u32)> {
        let wanted = item.trim();
        self.selling_items
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(name, price)| (name.as_str(), *price))
    }
}
