//! Core types for Fernweh: locations, items, NPCs, and the world model.
//!
//! This crate defines the data the adventure engine plays on. A [`World`] is
//! built once from a JSON document (see [`document`]) and validated so that
//! every location, item, and NPC reference resolves. After loading, only the
//! per-instance fields (`visited`, `items_present`) ever change.

/// Raw, serde-facing records of a world document.
pub mod document;
/// Location, item, and NPC records.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// The validated world model that owns all records.
pub mod world;

/// Re-export document types.
pub use document::{GameSettings, WorldDocument};
/// Re-export entity types.
pub use entity::{CommandTarget, Item, Location, LocationId, Npc};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the world model.
pub use world::World;
