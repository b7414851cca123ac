//! Error types for the adventure engine.

use std::fmt;

use fw_core::{CoreError, LocationId};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while running a session.
///
/// The first four variants are the dispatch rejections; the session turns
/// them into [`crate::Outcome`] values and never lets them escape a turn.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The command is not recognized here.
    #[error("{0}")]
    InvalidCommand(String),

    /// The command is known but its requirements are not met.
    #[error("{0}")]
    PreconditionUnmet(String),

    /// A referenced record is missing from the world tables.
    #[error("not found: {0}")]
    NotFound(String),

    /// There is nothing left to undo.
    #[error("{0}")]
    AlreadyAtBoundary(String),

    /// A script line could not be understood.
    #[error("script line {line}: {reason}")]
    InvalidScript {
        /// One-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A replayed session did not visit the expected locations.
    #[error("expected location log {expected:?}, got {actual:?}")]
    TraceMismatch {
        /// The expected id log.
        expected: Vec<LocationId>,
        /// The id log the replay produced.
        actual: Vec<LocationId>,
    },

    /// The world could not be loaded.
    #[error("{0}")]
    World(#[from] CoreError),
}

impl EngineError {
    /// The coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCommand(_) => ErrorKind::InvalidCommand,
            Self::PreconditionUnmet(_) => ErrorKind::PreconditionUnmet,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyAtBoundary(_) => ErrorKind::AlreadyAtBoundary,
            Self::InvalidScript { .. } | Self::TraceMismatch { .. } => ErrorKind::Script,
            Self::World(_) => ErrorKind::World,
        }
    }
}

/// Copyable error category carried by rejected outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognized command.
    InvalidCommand,
    /// Missing item, unlock, coins, or budget.
    PreconditionUnmet,
    /// Data-integrity failure.
    NotFound,
    /// Undo with nothing to undo.
    AlreadyAtBoundary,
    /// Script parsing or verification.
    Script,
    /// World loading.
    World,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidCommand => "invalid command",
            Self::PreconditionUnmet => "precondition unmet",
            Self::NotFound => "not found",
            Self::AlreadyAtBoundary => "already at boundary",
            Self::Script => "script",
            Self::World => "world",
        };
        f.write_str(name)
    }
}
