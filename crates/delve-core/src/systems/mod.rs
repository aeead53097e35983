//! Systems - logic that operates on the grid, registry and scheduler

pub mod fov;
mod behavior;
mod combat;
mod commands;
mod messages;
mod scheduling;

pub use behavior::*;
pub use combat::*;
pub use commands::*;
pub use messages::*;
pub use scheduling::*;
