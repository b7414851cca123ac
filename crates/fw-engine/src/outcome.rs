//! Values returned to callers of the session.

use fw_core::LocationId;
use serde::Serialize;

use crate::error::{EngineError, ErrorKind};
use crate::history::{Event, EventKind};

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Commands are accepted.
    Ongoing,
    /// The win rule was met.
    Won,
    /// A move budget ran out.
    Lost,
    /// The player quit.
    Quit,
}

impl GameStatus {
    /// Whether the game has ended, for now or for good.
    pub fn is_over(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// What talking to an NPC produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalkOutcome {
    /// The NPC describes a mission the player cannot complete yet.
    MissionOffer {
        /// NPC name.
        npc: String,
        /// What they say.
        dialogue: String,
        /// Items the mission asks for.
        wanted: Vec<String>,
    },
    /// The mission items were handed over.
    MissionComplete {
        /// NPC name.
        npc: String,
        /// Score granted.
        reward: u32,
    },
    /// The NPC lists its wares.
    ShopListing {
        /// NPC name.
        npc: String,
        /// Item name and price.
        wares: Vec<(String, u32)>,
    },
    /// The NPC just talks.
    PlainDialogue {
        /// NPC name.
        npc: String,
        /// What they say.
        dialogue: String,
    },
}

impl TalkOutcome {
    /// The text shown to the player.
    pub fn message(&self) -> String {
        match self {
            Self::MissionOffer {
                npc,
                dialogue,
                wanted,
            } => {
                let request = format!("{npc} is looking for: {}.", wanted.join(", "));
                if dialogue.is_empty() {
                    request
                } else {
                    format!("{npc}: \"{dialogue}\"\n{request}")
                }
            }
            Self::MissionComplete { npc, reward } => {
                format!("{npc}: \"Thank you!\" You gain {reward} points.")
            }
            Self::ShopListing { npc, wares } => {
                let lines: Vec<String> = wares
                    .iter()
                    .map(|(item, price)| format!("  {item}: {price} coins"))
                    .collect();
                format!("{npc} has for sale:\n{}", lines.join("\n"))
            }
            Self::PlainDialogue { npc, dialogue } => {
                if dialogue.is_empty() {
                    format!("{npc} has nothing to say.")
                } else {
                    format!("{npc}: \"{dialogue}\"")
                }
            }
        }
    }
}

/// The result of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the command was accepted.
    pub success: bool,
    /// Text for the player.
    pub message: String,
    /// Whether the game is over after this command.
    pub game_over: bool,
    /// Whether the game was won.
    pub won: bool,
    /// Why the command was rejected.
    pub error: Option<ErrorKind>,
    /// Kind of event appended, if any.
    pub event: Option<EventKind>,
    /// Set when the command was `talk`.
    pub talk: Option<TalkOutcome>,
}

impl Outcome {
    /// An accepted command.
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            game_over: false,
            won: false,
            error: None,
            event: None,
            talk: None,
        }
    }

    /// A rejected command.
    pub fn rejected(error: &EngineError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            game_over: false,
            won: false,
            error: Some(error.kind()),
            event: None,
            talk: None,
        }
    }

    /// Record the appended event kind.
    pub fn with_event(mut self, kind: EventKind) -> Self {
        self.event = Some(kind);
        self
    }

    /// Attach a talk outcome.
    pub fn with_talk(mut self, talk: TalkOutcome) -> Self {
        self.talk = Some(talk);
        self
    }

    /// Copy the session status into the flags.
    pub fn with_status(mut self, status: GameStatus) -> Self {
        self.game_over = status.is_over();
        self.won = status == GameStatus::Won;
        self
    }
}

/// What the player sees at their location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationView {
    /// Location id.
    pub id: LocationId,
    /// Location name.
    pub name: String,
    /// Description; long on the first visit, brief afterwards.
    pub text: String,
    /// Local commands, sorted.
    pub available_commands: Vec<String>,
    /// Items lying here.
    pub items: Vec<String>,
    /// The NPC standing here.
    pub npc: Option<String>,
    /// Unsolved puzzle text.
    pub puzzle: Option<String>,
}

/// A read-only copy of an event, for display and scripted checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    /// Location after the turn.
    pub location_id: LocationId,
    /// Location text at the time.
    pub location_text: String,
    /// Input that produced the turn.
    pub command: Option<String>,
    /// Kind of turn.
    pub kind: EventKind,
    /// Item touched.
    pub affected_item: Option<String>,
    /// Puzzle solved.
    pub puzzle_completed: Option<String>,
    /// Mission completed.
    pub mission_completed: Option<String>,
    /// Location before the turn.
    pub arrived_from: Option<LocationId>,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            location_id: event.location_id,
            location_text: event.location_text.clone(),
            command: event.command.clone(),
            kind: event.kind,
            affected_item: event.affected_item.clone(),
            puzzle_completed: event.puzzle_completed.clone(),
            mission_completed: event.mission_completed.clone(),
            arrived_from: event.arrived_from(),
        }
    }
}
