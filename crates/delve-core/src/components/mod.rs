//! Component definitions.
//!
//! Components are plain data. Actor components are stored in the registry's
//! `hecs` world; map features are owned by the [`crate::dungeon::DungeonMap`].

mod actor;
mod common;
mod map;

pub use actor::*;
pub use common::*;
pub use map::*;
