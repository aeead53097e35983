//! Generation - procedural and scripted creation of levels.
//!
//! A builder hands the engine a `DungeonMap` in two steps: `build` carves
//! terrain, doors and stairs, then `populate` spawns monsters once the
//! player has been placed on the up stairs.

mod layout;
mod monsters;
mod rooms;

pub use layout::*;
pub use monsters::*;
pub use rooms::*;

use crate::dungeon::DungeonMap;
use crate::error::DungeonError;

pub trait MapBuilder {
    /// Terrain, rooms, doors and stairs for `level` (1-based)
    fn build(&mut self, level: u32) -> Result<DungeonMap, DungeonError>;

    /// Spawn the level's monsters
    fn populate(&mut self, map: &mut DungeonMap, level: u32) -> Result<(), DungeonError>;
}
