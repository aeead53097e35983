//! Game configuration.
//!
//! Every field has a default so partial JSON configs load cleanly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    /// Upper bound on room placement attempts per level
    pub max_rooms: u32,
    pub room_max_size: i32,
    pub room_min_size: i32,
    /// Lines kept by the message log before the oldest is evicted
    pub message_log_capacity: usize,
    /// Seed for generation and combat rolls. `None` lets the caller pick one.
    pub seed: Option<u64>,
    /// Turns a monster keeps chasing after it last saw the player
    pub monster_alert_turns: u32,
    /// Probability (0.0-1.0) that a room other than the first gets monsters
    pub monster_room_chance: f64,
    pub max_monsters_per_room: u32,
    pub player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 80,
            map_height: 48,
            max_rooms: 20,
            room_max_size: 13,
            room_min_size: 7,
            message_log_capacity: 9,
            seed: None,
            monster_alert_turns: 15,
            monster_room_chance: 0.6,
            max_monsters_per_room: 4,
            player_name: "Rogue".to_string(),
        }
    }
}
