//! Actor components: identity, stats and monster decision state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::systems::Behavior;

/// Tagged actor category. Movement mechanics never branch on anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Monster,
}

/// Melee statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combat {
    /// Number of attack dice rolled per swing
    pub attack: u32,
    /// Percent chance (0-100) that a single attack die hits
    pub attack_chance: u32,
    /// Number of defense dice rolled per incoming swing
    pub defense: u32,
    /// Percent chance (0-100) that a single defense die blocks
    pub defense_chance: u32,
    pub health: i32,
    pub max_health: i32,
}

impl Combat {
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Core actor data. Position lives in its own component so the registry
/// can keep its occupancy index authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub kind: ActorKind,
    /// Display character for the rendering collaborator
    pub glyph: char,
    /// Sight radius in cells
    pub awareness: u32,
    /// Turn cost: scheduler time between two activations (lower is faster)
    pub speed: u32,
    pub combat: Combat,
}

impl Actor {
    /// The default adventurer
    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActorKind::Player,
            glyph: '@',
            awareness: 15,
            speed: 10,
            combat: Combat {
                attack: 2,
                attack_chance: 50,
                defense: 2,
                defense_chance: 40,
                health: 100,
                max_health: 100,
            },
        }
    }

    pub fn monster(name: impl Into<String>, glyph: char, awareness: u32, speed: u32, combat: Combat) -> Self {
        Self {
            name: name.into(),
            kind: ActorKind::Monster,
            glyph,
            awareness,
            speed,
            combat,
        }
    }

    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }
}

/// Grid position component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub super::Point);

/// Monster alert state driven by [`crate::systems::StandardMoveAndAttack`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alertness {
    /// Turns since the monster last saw the player, `None` when idle
    pub turns_alerted: Option<u32>,
}

/// Decision capability attached only to monsters
#[derive(Clone)]
pub struct Brain(pub Arc<dyn Behavior>);

impl std::fmt::Debug for Brain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Brain").field(&self.0.name()).finish()
    }
}
