use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, info, warn};

use crate::document::{GameSettings, ItemRecord, LocationRecord, NpcRecord, WorldDocument};
use crate::entity::{CommandTarget, Item, Location, LocationId, Npc};
use crate::error::{CoreError, CoreResult};

/// The validated world model. Owns every location, item, and NPC.
///
/// Structure is fixed after construction; only `Location::visited` and
/// `Location::items_present` change during play.
#[derive(Debug, Clone)]
pub struct World {
    settings: GameSettings,
    locations: BTreeMap<LocationId, Location>,
    items: Vec<Item>,
    npcs: Vec<Npc>,

    // Indexes
    item_by_name_lower: HashMap<String, usize>,
    npc_by_name_lower: HashMap<String, usize>,
    npc_by_location: HashMap<LocationId, usize>,
}

impl World {
    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Read and validate a world document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("read world document {}", path.display());
        Self::from_json(&text)
    }

    /// Parse and validate a world document from a JSON string.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let doc: WorldDocument = serde_json::from_str(text)?;
        Self::from_document(doc)
    }

    /// Validate a parsed document and build the lookup tables.
    pub fn from_document(doc: WorldDocument) -> CoreResult<Self> {
        let WorldDocument {
            settings,
            locations,
            items,
            npcs,
        } = doc;

        let mut world = Self {
            settings,
            locations: BTreeMap::new(),
            items: Vec::with_capacity(items.len()),
            npcs: Vec::with_capacity(npcs.len()),
            item_by_name_lower: HashMap::new(),
            npc_by_name_lower: HashMap::new(),
            npc_by_location: HashMap::new(),
        };

        world.add_locations(locations)?;
        world.add_items(items)?;
        world.add_npcs(npcs)?;
        world.resolve_location_references()?;
        world.check_settings()?;

        info!(
            "loaded world: {} locations, {} items, {} npcs",
            world.locations.len(),
            world.items.len(),
            world.npcs.len()
        );
        Ok(world)
    }

    fn add_locations(&mut self, records: Vec<LocationRecord>) -> CoreResult<()> {
        if records.is_empty() {
            return Err(CoreError::Validation("world has no locations".into()));
        }
        let mut names = HashMap::new();
        for record in records {
            if self.locations.contains_key(&record.id) {
                return Err(CoreError::DuplicateLocation(record.id));
            }
            if names.insert(record.name.to_lowercase(), record.id).is_some() {
                return Err(CoreError::DuplicateName {
                    kind: "location",
                    name: record.name,
                });
            }

            if record.move_budget == Some(0) {
                return Err(CoreError::Validation(format!(
                    "location {} has a move budget of zero",
                    record.id
                )));
            }

            let mut location = Location::new(record.id, record.name);
            location.brief_text = record.brief_text;
            location.long_text = record.long_text;
            for (command, target) in record.available_commands {
                let key = command.trim().to_lowercase();
                if location.available_commands.insert(key, target).is_some() {
                    return Err(CoreError::Validation(format!(
                        "command \"{command}\" at {} is declared twice",
                        location.name
                    )));
                }
            }
            location.unlock_condition = record.unlock_condition;
            location.move_budget = record.move_budget;
            location.puzzle_text = record.puzzle_text;
            location.puzzle_requires = record.puzzle_requires;
            self.locations.insert(location.id, location);
        }
        Ok(())
    }

    fn add_items(&mut self, records: Vec<ItemRecord>) -> CoreResult<()> {
        for record in records {
            if record.name.trim().is_empty() {
                return Err(CoreError::Validation("item with an empty name".into()));
            }
            let key = record.name.to_lowercase();
            if self.item_by_name_lower.contains_key(&key) {
                return Err(CoreError::DuplicateName {
                    kind: "item",
                    name: record.name,
                });
            }

            let context = format!("item \"{}\"", record.name);
            for id in [record.start_position, record.target_position]
                .into_iter()
                .flatten()
            {
                self.require_location(&context, id)?;
            }
            if let Some(location) = record
                .start_position
                .and_then(|start| self.locations.get_mut(&start))
            {
                location.items_present.insert(record.name.clone());
            }

            let mut item = Item::new(record.name);
            item.description = record.description;
            item.start_position = record.start_position;
            item.target_position = record.target_position;
            item.target_points = record.target_points;
            item.coins = record.coins;
            item.effect = record.effect;
            item.unlock_condition = record.unlock_condition;

            self.item_by_name_lower.insert(key, self.items.len());
            self.items.push(item);
        }

        // Unlock conditions may name items declared later in the list.
        let pending: Vec<(usize, String)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.unlock_condition.clone().map(|name| (i, name)))
            .collect();
        for (i, required) in pending {
            let context = format!("unlock condition of item \"{}\"", self.items[i].name);
            let canonical = self.canonical_item(&context, &required)?;
            self.items[i].unlock_condition = Some(canonical);
        }
        Ok(())
    }

    fn add_npcs(&mut self, records: Vec<NpcRecord>) -> CoreResult<()> {
        for record in records {
            let key = record.name.to_lowercase();
            if self.npc_by_name_lower.contains_key(&key) {
                return Err(CoreError::DuplicateName {
                    kind: "npc",
                    name: record.name,
                });
            }
            let context = format!("npc \"{}\"", record.name);
            self.require_location(&context, record.location)?;
            if let Some(&other) = self.npc_by_location.get(&record.location) {
                return Err(CoreError::Validation(format!(
                    "location {} already hosts npc \"{}\"",
                    record.location, self.npcs[other].name
                )));
            }

            if record.mission_items.is_empty() && record.reward_points > 0 {
                warn!("{context} has a reward but no mission items; it never pays out");
            }

            let mut npc = Npc::new(record.name, record.location);
            npc.dialogue = record.dialogue;
            npc.reward_points = record.reward_points;
            for name in &record.mission_items {
                let canonical = self.canonical_item(&format!("mission of {context}"), name)?;
                npc.mission_items.insert(canonical);
            }
            for (name, price) in record.selling_items {
                let canonical = self.canonical_item(&format!("shop of {context}"), &name)?;
                npc.selling_items.insert(canonical, price);
            }

            if let Some(location) = self.locations.get_mut(&npc.location) {
                location.npc_present = Some(npc.name.clone());
            }
            let index = self.npcs.len();
            self.npc_by_name_lower.insert(key, index);
            self.npc_by_location.insert(npc.location, index);
            self.npcs.push(npc);
        }
        Ok(())
    }

    /// Check every command destination and canonicalize item references
    /// held by locations.
    fn resolve_location_references(&mut self) -> CoreResult<()> {
        let ids: Vec<LocationId> = self.locations.keys().copied().collect();
        for id in ids {
            let (name, destinations, unlock, puzzle_item) = {
                let location = &self.locations[&id];
                let destinations: Vec<(String, LocationId)> = location
                    .available_commands
                    .iter()
                    .filter_map(|(command, target)| match target {
                        CommandTarget::Destination(dest) => Some((command.clone(), *dest)),
                        CommandTarget::Action(_) => None,
                    })
                    .collect();
                (
                    location.name.clone(),
                    destinations,
                    location.unlock_condition.clone(),
                    location.puzzle_requires.clone(),
                )
            };

            for (command, dest) in destinations {
                self.require_location(&format!("command \"{command}\" at {name}"), dest)?;
            }
            let unlock = unlock
                .map(|item| self.canonical_item(&format!("unlock condition of {name}"), &item))
                .transpose()?;
            let puzzle_item = puzzle_item
                .map(|item| self.canonical_item(&format!("puzzle at {name}"), &item))
                .transpose()?;

            if let Some(location) = self.locations.get_mut(&id) {
                location.unlock_condition = unlock;
                location.puzzle_requires = puzzle_item;
            }
        }
        Ok(())
    }

    fn check_settings(&self) -> CoreResult<()> {
        let settings = &self.settings;
        if let Some(start) = settings.start_location {
            self.require_location("settings.start_location", start)?;
        }
        if let Some(win) = settings.win_location {
            self.require_location("settings.win_location", win)?;
        }
        if settings.max_moves == Some(0) {
            return Err(CoreError::Validation(
                "settings.max_moves must be at least 1".into(),
            ));
        }
        if settings.win_location.is_some() && settings.required_missions.is_some() {
            return Err(CoreError::Validation(
                "settings may name either win_location or required_missions, not both".into(),
            ));
        }
        if let Some(required) = settings.required_missions {
            let available = self.npcs.iter().filter(|n| n.has_mission()).count();
            if required > available {
                warn!("{required} missions required but only {available} npcs offer one");
            }
        }
        Ok(())
    }

    fn require_location(&self, context: &str, id: LocationId) -> CoreResult<()> {
        if self.locations.contains_key(&id) {
            Ok(())
        } else {
            Err(CoreError::DanglingLocation {
                context: context.to_string(),
                id,
            })
        }
    }

    fn canonical_item(&self, context: &str, name: &str) -> CoreResult<String> {
        self.item(name)
            .map(|item| item.name.clone())
            .ok_or_else(|| CoreError::UnknownItem {
                context: context.to_string(),
                name: name.to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Session settings from the document.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// The configured start location, or the lowest id when none is set.
    pub fn start_location(&self) -> LocationId {
        self.settings
            .start_location
            .or_else(|| self.locations.keys().next().copied())
            .unwrap_or_default()
    }

    /// Get a location by id.
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Get a mutable location by id.
    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(&id)
    }

    /// All locations in id order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Find an item by name (case-insensitive).
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.item_by_name_lower
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.items[i])
    }

    /// All items in document order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Find an NPC by name (case-insensitive).
    pub fn npc(&self, name: &str) -> Option<&Npc> {
        self.npc_by_name_lower
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.npcs[i])
    }

    /// The NPC standing at a location, if any.
    pub fn npc_at(&self, location: LocationId) -> Option<&Npc> {
        self.npc_by_location.get(&location).map(|&i| &self.npcs[i])
    }

    /// All NPCs in document order.
    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    /// Where an item currently lies, if it lies anywhere.
    pub fn item_location(&self, name: &str) -> Option<LocationId> {
        self.locations
            .values()
            .find(|location| location.has_item(name))
            .map(|location| location.id)
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Number of locations.
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of NPCs.
    pub fn npc_count(&self) -> usize {
        self.npcs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL_WORLD: &str = r#"{
        "settings": { "start_location": 1, "win_location": 2 },
        "locations": [
            {
                "id": 1,
                "name": "Quad",
                "brief_text": "The quad.",
                "long_text": "A wide grassy quad.",
                "available_commands": { "Go East": 2 }
            },
            {
                "id": 2,
                "name": "Library",
                "brief_text": "The library.",
                "available_commands": { "go west": 1, "read sign": "look" },
                "unlock_condition": "tcard"
            }
        ],
        "items": [
            { "name": "TCard", "start_position": 1 },
            { "name": "Notebook", "start_position": 2, "target_position": 1, "target_points": 5 }
        ],
        "npcs": [
            { "name": "Librarian", "location": 2, "mission_items": ["notebook"], "reward_points": 10 }
        ]
    }"#;

    #[test]
    fn load_small_world() {
        let world = World::from_json(SMALL_WORLD).unwrap();
        assert_eq!(world.location_count(), 2);
        assert_eq!(world.item_count(), 2);
        assert_eq!(world.npc_count(), 1);
        assert_eq!(world.start_location(), 1);
    }

    #[test]
    fn commands_are_lower_cased() {
        let world = World::from_json(SMALL_WORLD).unwrap();
        let quad = world.location(1).unwrap();
        assert!(quad.available_commands.contains_key("go east"));
    }

    #[test]
    fn items_present_derived_from_start_position() {
        let world = World::from_json(SMALL_WORLD).unwrap();
        assert!(world.location(1).unwrap().has_item("TCard"));
        assert!(world.location(2).unwrap().has_item("Notebook"));
        assert_eq!(world.item_location("Notebook"), Some(2));
    }

    #[test]
    fn npc_present_derived_from_npc_location() {
        let world = World::from_json(SMALL_WORLD).unwrap();
        let library = world.location(2).unwrap();
        assert_eq!(library.npc_present.as_deref(), Some("Librarian"));
        assert_eq!(world.npc_at(2).unwrap().name, "Librarian");
        assert!(world.npc_at(1).is_none());
    }

    #[test]
    fn item_references_are_canonicalized() {
        let world = World::from_json(SMALL_WORLD).unwrap();
        assert_eq!(
            world.location(2).unwrap().unlock_condition.as_deref(),
            Some("TCard")
        );
        let librarian = world.npc("librarian").unwrap();
        assert!(librarian.mission_items.contains("Notebook"));
    }

    #[test]
    fn item_lookup_case_insensitive() {
        let world = World::from_json(SMALL_WORLD).unwrap();
        assert_eq!(world.item("tcard").unwrap().name, "TCard");
        assert_eq!(world.item(" NOTEBOOK ").unwrap().name, "Notebook");
        assert!(world.item("sword").is_none());
    }

    #[test]
    fn dangling_destination_rejected() {
        let text = r#"{ "locations": [
            { "id": 1, "name": "A", "brief_text": "a", "available_commands": { "go north": 9 } }
        ] }"#;
        let err = World::from_json(text).unwrap_err();
        assert!(matches!(err, CoreError::DanglingLocation { id: 9, .. }));
    }

    #[test]
    fn duplicate_location_id_rejected() {
        let text = r#"{ "locations": [
            { "id": 1, "name": "A", "brief_text": "a" },
            { "id": 1, "name": "B", "brief_text": "b" }
        ] }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::DuplicateLocation(1)
        ));
    }

    #[test]
    fn duplicate_item_name_rejected() {
        let text = r#"{
            "locations": [{ "id": 1, "name": "A", "brief_text": "a" }],
            "items": [{ "name": "Key" }, { "name": "key" }]
        }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::DuplicateName { kind: "item", .. }
        ));
    }

    #[test]
    fn unknown_mission_item_rejected() {
        let text = r#"{
            "locations": [{ "id": 1, "name": "A", "brief_text": "a" }],
            "npcs": [{ "name": "Bob", "location": 1, "mission_items": ["ghost"] }]
        }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::UnknownItem { .. }
        ));
    }

    #[test]
    fn two_npcs_in_one_location_rejected() {
        let text = r#"{
            "locations": [{ "id": 1, "name": "A", "brief_text": "a" }],
            "npcs": [{ "name": "Bob", "location": 1 }, { "name": "Sue", "location": 1 }]
        }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[test]
    fn both_win_rules_rejected() {
        let text = r#"{
            "settings": { "win_location": 1, "required_missions": 1 },
            "locations": [{ "id": 1, "name": "A", "brief_text": "a" }]
        }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[test]
    fn missing_required_field_is_parse_error() {
        let text = r#"{ "locations": [{ "id": 1, "name": "A" }] }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::Parse(_)
        ));
    }

    #[test]
    fn zero_move_budget_rejected() {
        let text = r#"{ "locations": [
            { "id": 1, "name": "A", "brief_text": "a", "move_budget": 0 }
        ] }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[test]
    fn zero_max_moves_rejected() {
        let text = r#"{
            "settings": { "max_moves": 0 },
            "locations": [{ "id": 1, "name": "A", "brief_text": "a" }]
        }"#;
        assert!(matches!(
            World::from_json(text).unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[test]
    fn commands_differing_only_in_case_rejected() {
        let text = r#"{ "locations": [
            { "id": 1, "name": "A", "brief_text": "a", "available_commands": { "Go East": 2, "go east": 1 } },
            { "id": 2, "name": "B", "brief_text": "b" }
        ] }"#;
        let err = World::from_json(text).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn empty_world_rejected() {
        assert!(World::from_json(r#"{ "locations": [] }"#).is_err());
    }

    #[test]
    fn legacy_field_names_accepted() {
        let text = r#"{ "locations": [
            { "id": 3, "name": "A", "brief_description": "a", "long_description": "aaa", "steps_allowed": 4 }
        ] }"#;
        let world = World::from_json(text).unwrap();
        let loc = world.location(3).unwrap();
        assert_eq!(loc.long_text, "aaa");
        assert_eq!(loc.move_budget, Some(4));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL_WORLD.as_bytes()).unwrap();
        let world = World::load(file.path()).unwrap();
        assert_eq!(world.location_count(), 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = World::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
