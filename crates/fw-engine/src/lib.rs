//! Session engine for Fernweh text adventures.
//!
//! A [`Session`] plays a validated [`fw_core::World`]: it parses each input
//! line, checks it against the world and the player, mutates state, and
//! records the turn in an undoable [`EventHistory`]. [`Simulation`] replays
//! a [`Script`] through a session for deterministic testing.

/// Command parsing for player input.
pub mod command;
/// Engine configuration.
pub mod config;
/// Item effects and reversible world changes.
pub mod effect;
/// Error types for the engine.
pub mod error;
/// The linked, undoable event history.
pub mod history;
/// Values returned to callers.
pub mod outcome;
/// Player state management.
pub mod player;
/// Adventure session management.
pub mod session;
/// Scripted replay.
pub mod simulation;
/// Fuzzy command suggestions.
pub mod suggest;

pub use command::{Command, parse_command};
pub use config::{EngineConfig, WinRule};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use history::{Event, EventHistory, EventId, EventKind};
pub use outcome::{EventView, GameStatus, LocationView, Outcome, TalkOutcome};
pub use player::Player;
pub use session::Session;
pub use simulation::{Script, Simulation, Step};
