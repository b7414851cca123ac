use std::path::PathBuf;

use crate::entity::LocationId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading or validating a world.
///
/// All of these are load-time failures; a [`crate::World`] that was built
/// successfully never produces them mid-session.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The world file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid JSON or is missing required fields.
    #[error("malformed world document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two locations share the same id.
    #[error("duplicate location id: {0}")]
    DuplicateLocation(LocationId),

    /// Two records of the same kind share a name (case-insensitive).
    #[error("duplicate {kind} name: \"{name}\"")]
    DuplicateName {
        /// Which table the clash occurred in.
        kind: &'static str,
        /// The clashing name.
        name: String,
    },

    /// A location id referenced somewhere does not exist.
    #[error("{context} refers to unknown location {id}")]
    DanglingLocation {
        /// Where the reference was found.
        context: String,
        /// The unresolved id.
        id: LocationId,
    },

    /// An item name referenced somewhere does not exist.
    #[error("{context} refers to unknown item \"{name}\"")]
    UnknownItem {
        /// Where the reference was found.
        context: String,
        /// The unresolved item name.
        name: String,
    },

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
