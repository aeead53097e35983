//! Delve Core - Turn Scheduling and Dungeon State Engine
//!
//! The authoritative state of a turn-based dungeon crawl: a grid of cells
//! with walkability, transparency and exploration flags, the actors living
//! on it, and the scheduler that decides whose turn comes next.
//!
//! # Architecture
//!
//! - **Grid**: per-cell terrain flags and the player's field of view
//! - **Registry**: live actors stored in a `hecs` world, indexed by position
//! - **Scheduler**: deterministic activation-time ordering of actor turns
//! - **Commands**: intended actions turned into validated state mutations
//!
//! Rendering, input polling and map generation sit outside the core and talk
//! to it through [`view::MapView`], [`engine::PlayerCommand`] and
//! [`generation::MapBuilder`].
//!
//! # Example
//!
//! ```rust,no_run
//! use delve_core::prelude::*;
//! use delve_core::generation::RoomsAndCorridors;
//!
//! let config = GameConfig::default();
//! let builder = RoomsAndCorridors::new(config.clone(), 42);
//! let mut game = Game::new(config, Box::new(builder)).unwrap();
//!
//! loop {
//!     let input = Some(PlayerCommand::Move(Direction::Right));
//!     game.tick(input).unwrap();
//!     if game.is_over() {
//!         break;
//!     }
//! }
//! ```

pub mod components;
pub mod config;
pub mod dungeon;
pub mod engine;
pub mod error;
pub mod generation;
pub mod grid;
pub mod registry;
pub mod systems;
pub mod view;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::GameConfig;
    pub use crate::dungeon::DungeonMap;
    pub use crate::engine::{Game, PlayerCommand};
    pub use crate::error::DungeonError;
    pub use crate::registry::ActorId;
    pub use crate::systems::ActionOutcome;
}
