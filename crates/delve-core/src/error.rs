//! Error type shared by the grid, registry and command layer.

use crate::registry::ActorId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DungeonError {
    /// Coordinate outside the map extent. Always a caller bug.
    OutOfBounds { x: i32, y: i32 },
    /// Placement onto a cell that is not walkable
    OccupiedCell { x: i32, y: i32 },
    /// Actor is not registered on this map
    NotFound(ActorId),
    /// Actor id already live on this map
    DuplicateActor(ActorId),
    /// A map builder produced something the core cannot accept
    InvalidLayout(String),
}

impl std::fmt::Display for DungeonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DungeonError::OutOfBounds { x, y } => write!(f, "Cell ({}, {}) is out of bounds", x, y),
            DungeonError::OccupiedCell { x, y } => write!(f, "Cell ({}, {}) is not walkable", x, y),
            DungeonError::NotFound(id) => write!(f, "Actor {:?} not found", id),
            DungeonError::DuplicateActor(id) => write!(f, "Actor {:?} already registered", id),
            DungeonError::InvalidLayout(reason) => write!(f, "Invalid layout: {}", reason),
        }
    }
}

impl std::error::Error for DungeonError {}
