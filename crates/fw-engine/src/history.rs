//! The undoable event history.
//!
//! Events live in an arena indexed by [`EventId`]; `prev` and `next` are
//! indices into it. Only the last event can be removed, so the arena is a
//! stack and an event's id is its position from the start of the session.

use std::fmt;

use fw_core::LocationId;
use log::debug;
use serde::Serialize;

use crate::effect::WorldEffect;
use crate::error::{EngineError, EngineResult};
use crate::player::Player;

/// Index of an event in its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub usize);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of turn an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The session began.
    Start,
    /// The player changed location.
    Move,
    /// An item went into inventory from the location.
    Pickup,
    /// An item went from inventory to the location.
    Drop,
    /// An NPC conversation without a completed mission.
    Talk,
    /// An NPC mission was completed.
    Mission,
    /// A location puzzle was solved.
    Puzzle,
    /// Anything else that changed state (purchases, item effects).
    Other,
}

impl EventKind {
    /// Lower-case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::Pickup => "pickup",
            Self::Drop => "drop",
            Self::Talk => "talk",
            Self::Mission => "mission",
            Self::Puzzle => "puzzle",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed turn.
///
/// Built with [`Event::new`] and the `with_*` methods, then handed to
/// [`EventHistory::append`], which fills in the links.
#[derive(Debug, Clone)]
pub struct Event {
    /// Where the player stood after the turn.
    pub location_id: LocationId,
    /// The text shown for that location.
    pub location_text: String,
    /// The input that produced the turn. `None` only for the start event.
    pub command: Option<String>,
    /// The kind of turn.
    pub kind: EventKind,
    /// Item picked up, dropped, bought, or used.
    pub affected_item: Option<String>,
    /// Name of the location whose puzzle was solved.
    pub puzzle_completed: Option<String>,
    /// Name of the NPC whose mission was completed.
    pub mission_completed: Option<String>,

    snapshot: Option<Player>,
    effects: Vec<WorldEffect>,
    arrived_from: Option<LocationId>,
    prev: Option<EventId>,
    next: Option<EventId>,
}

impl Event {
    /// Create an unlinked event.
    pub fn new(location_id: LocationId, location_text: impl Into<String>, kind: EventKind) -> Self {
        Self {
            location_id,
            location_text: location_text.into(),
            command: None,
            kind,
            affected_item: None,
            puzzle_completed: None,
            mission_completed: None,
            snapshot: None,
            effects: Vec::new(),
            arrived_from: None,
            prev: None,
            next: None,
        }
    }

    /// Record the command that produced this event.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Record the item the event touched.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.affected_item = Some(item.into());
        self
    }

    /// Mark a location's puzzle as solved by this event.
    pub fn with_puzzle(mut self, location_name: impl Into<String>) -> Self {
        self.puzzle_completed = Some(location_name.into());
        self
    }

    /// Mark an NPC's mission as completed by this event.
    pub fn with_mission(mut self, npc_name: impl Into<String>) -> Self {
        self.mission_completed = Some(npc_name.into());
        self
    }

    /// Attach the player state as it stands after this event.
    pub fn with_snapshot(mut self, player: Player) -> Self {
        self.snapshot = Some(player);
        self
    }

    /// Attach the world changes this event made.
    pub fn with_effects(mut self, effects: Vec<WorldEffect>) -> Self {
        self.effects = effects;
        self
    }

    /// Player state after this event, if one was attached.
    pub fn snapshot(&self) -> Option<&Player> {
        self.snapshot.as_ref()
    }

    /// World changes made by this event, in the order they were made.
    pub fn effects(&self) -> &[WorldEffect] {
        &self.effects
    }

    /// Where the player stood before this event. Set on append; the first
    /// event arrives from its own location.
    pub fn arrived_from(&self) -> Option<LocationId> {
        self.arrived_from
    }

    /// The event before this one.
    pub fn prev(&self) -> Option<EventId> {
        self.prev
    }

    /// The event after this one.
    pub fn next(&self) -> Option<EventId> {
        self.next
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location: {}, Command: {}, Type: {}",
            self.location_id,
            self.command.as_deref().unwrap_or("-"),
            self.kind
        )?;
        if let Some(item) = &self.affected_item {
            write!(f, ", Item: {item}")?;
        }
        if let Some(puzzle) = &self.puzzle_completed {
            write!(f, ", Puzzle Completed: {puzzle}")?;
        }
        if let Some(mission) = &self.mission_completed {
            write!(f, ", Mission Completed: {mission}")?;
        }
        Ok(())
    }
}

/// The result of removing the last event.
#[derive(Debug, Clone)]
pub struct Undone {
    /// The removed event, unlinked.
    pub removed: Event,
    /// Location the player should return to. `None` when the history is
    /// now empty.
    pub restore_to: Option<LocationId>,
}

/// Chronological, linked record of every completed turn.
#[derive(Debug, Clone, Default)]
pub struct EventHistory {
    events: Vec<Event>,
    first: Option<EventId>,
    last: Option<EventId>,
    steps_taken: usize,
    completed_puzzles: Vec<String>,
    completed_missions: Vec<String>,
}

impl EventHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `event` at the end of the history and apply its counters.
    pub fn append(&mut self, mut event: Event) -> EventId {
        let id = EventId(self.events.len());
        event.next = None;
        match self.last {
            None => {
                event.prev = None;
                event.arrived_from = Some(event.location_id);
                self.first = Some(id);
            }
            Some(last) => {
                let previous = &mut self.events[last.0];
                previous.next = Some(id);
                event.prev = Some(last);
                event.arrived_from = Some(previous.location_id);
            }
        }
        self.last = Some(id);

        if event.kind == EventKind::Move {
            self.steps_taken += 1;
        }
        if let Some(puzzle) = &event.puzzle_completed {
            self.completed_puzzles.push(puzzle.clone());
        }
        if let Some(mission) = &event.mission_completed {
            self.completed_missions.push(mission.clone());
        }

        debug!("append {id}: {event}");
        self.events.push(event);
        id
    }

    /// Remove the last event, reversing its counters and audit entries.
    pub fn undo_last(&mut self) -> EngineResult<Undone> {
        let Some(mut removed) = self.events.pop() else {
            return Err(EngineError::AlreadyAtBoundary(
                "There is nothing to undo.".into(),
            ));
        };

        if removed.kind == EventKind::Move {
            self.steps_taken = self.steps_taken.saturating_sub(1);
        }
        if let Some(puzzle) = &removed.puzzle_completed {
            remove_last_match(&mut self.completed_puzzles, puzzle);
        }
        if let Some(mission) = &removed.mission_completed {
            remove_last_match(&mut self.completed_missions, mission);
        }

        self.last = removed.prev;
        match self.last {
            Some(last) => self.events[last.0].next = None,
            None => self.first = None,
        }
        removed.prev = None;
        removed.next = None;

        debug!("undo #{}: {removed}", self.events.len());
        Ok(Undone {
            removed,
            restore_to: self.last().map(|event| event.location_id),
        })
    }

    /// Iterate from the first event to the last.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            history: self,
            cursor: self.first,
        }
    }

    /// Look up an event by id.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(id.0)
    }

    /// The first event.
    pub fn first(&self) -> Option<&Event> {
        self.first.and_then(|id| self.get(id))
    }

    /// The most recent event.
    pub fn last(&self) -> Option<&Event> {
        self.last.and_then(|id| self.get(id))
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the history has no events.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Location id of every event, in order.
    pub fn id_log(&self) -> Vec<LocationId> {
        self.iter().map(|event| event.location_id).collect()
    }

    /// The location of the event before the last one.
    pub fn previous_location(&self) -> Option<LocationId> {
        self.last()
            .and_then(|event| event.prev)
            .and_then(|id| self.get(id))
            .map(|event| event.location_id)
    }

    /// Number of move events.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Names of locations whose puzzles were solved, in order.
    pub fn completed_puzzles(&self) -> &[String] {
        &self.completed_puzzles
    }

    /// Names of NPCs whose missions were completed, in order.
    pub fn completed_missions(&self) -> &[String] {
        &self.completed_missions
    }

    /// Whether the puzzle at the named location has been solved.
    pub fn has_completed_puzzle(&self, location_name: &str) -> bool {
        self.completed_puzzles.iter().any(|p| p == location_name)
    }

    /// Whether the named NPC's mission has been completed.
    pub fn has_completed_mission(&self, npc_name: &str) -> bool {
        self.completed_missions.iter().any(|m| m == npc_name)
    }

    /// Every event on its own line, oldest first.
    pub fn render(&self) -> String {
        self.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn remove_last_match(list: &mut Vec<String>, name: &str) {
    if let Some(pos) = list.iter().rposition(|entry| entry == name) {
        list.remove(pos);
    }
}

/// Forward iterator over an [`EventHistory`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    history: &'a EventHistory,
    cursor: Option<EventId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.history.get(self.cursor?)?;
        self.cursor = event.next;
        Some(event)
    }
}

impl<'a> IntoIterator for &'a EventHistory {
    type Item = &'a Event;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
