//! The on-disk shape of a world.
//!
//! A world document is a JSON object with a `locations` array and optional
//! `items`, `npcs`, and `settings` sections. These records are plain data;
//! [`crate::World::from_document`] validates them and builds the lookup
//! tables the engine plays on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{CommandTarget, LocationId};

/// A complete world document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDocument {
    /// Session-wide settings.
    #[serde(default)]
    pub settings: GameSettings,
    /// All locations.
    pub locations: Vec<LocationRecord>,
    /// All items, in display order.
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    /// All NPCs, in display order.
    #[serde(default)]
    pub npcs: Vec<NpcRecord>,
}

/// Settings that shape a session played on this world.
///
/// At most one of `win_location` and `required_missions` may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Where the player starts. Defaults to the lowest location id.
    pub start_location: Option<LocationId>,
    /// Reaching this location wins the game.
    pub win_location: Option<LocationId>,
    /// Completing this many NPC missions wins the game.
    pub required_missions: Option<usize>,
    /// Global ceiling on move events.
    pub max_moves: Option<u32>,
    /// Coins in the player's purse at the start.
    pub starting_coins: u32,
    /// Score granted for each solved puzzle.
    pub puzzle_reward: Option<u32>,
}

/// A location as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Unique id.
    pub id: LocationId,
    /// Unique display name.
    pub name: String,
    /// Text for repeat visits.
    #[serde(alias = "brief_description")]
    pub brief_text: String,
    /// Text for the first visit.
    #[serde(default, alias = "long_description")]
    pub long_text: String,
    /// Command string to destination id or action tag.
    #[serde(default)]
    pub available_commands: BTreeMap<String, CommandTarget>,
    /// Item required to enter.
    #[serde(default)]
    pub unlock_condition: Option<String>,
    /// Per-location move ceiling.
    #[serde(default, alias = "steps_allowed")]
    pub move_budget: Option<u32>,
    /// Puzzle description.
    #[serde(default)]
    pub puzzle_text: Option<String>,
    /// Item consumed by solving the puzzle.
    #[serde(default)]
    pub puzzle_requires: Option<String>,
}

/// An item as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Unique name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Starting location.
    #[serde(default)]
    pub start_position: Option<LocationId>,
    /// Delivery location.
    #[serde(default)]
    pub target_position: Option<LocationId>,
    /// Score paid on delivery.
    #[serde(default)]
    pub target_points: u32,
    /// Coins paid on delivery.
    #[serde(default)]
    pub coins: u32,
    /// Effect tag.
    #[serde(default, alias = "function")]
    pub effect: Option<String>,
    /// Item required before pickup.
    #[serde(default)]
    pub unlock_condition: Option<String>,
}

/// An NPC as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcRecord {
    /// Unique name.
    pub name: String,
    /// Where the NPC stands.
    pub location: LocationId,
    /// Fallback dialogue.
    #[serde(default)]
    pub dialogue: String,
    /// Items the mission asks for.
    #[serde(default)]
    pub mission_items: Vec<String>,
    /// Score paid on mission completion.
    #[serde(default)]
    pub reward_points: u32,
    /// Item name to price.
    #[serde(default)]
    pub selling_items: BTreeMap<String, u32>,
}
