//! Monster decision capability.
//!
//! A behavior gets one monster and the game context, attempts exactly one
//! action through the command layer and reports whether the turn was used.
//! The scheduler advances the monster either way.

use crate::components::{Direction, Point};
use crate::engine::Game;
use crate::error::DungeonError;
use crate::registry::ActorId;
use crate::systems::{act_in_direction, fov};

pub trait Behavior: Send + Sync {
    fn name(&self) -> &'static str;

    fn act(&self, monster: ActorId, game: &mut Game) -> Result<bool, DungeonError>;
}

/// Idle until the player comes into sight, then close in and attack.
/// The monster keeps chasing for `monster_alert_turns` turns without
/// seeing the player and loses interest on the turn after.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMoveAndAttack;

impl Behavior for StandardMoveAndAttack {
    fn name(&self) -> &'static str {
        "StandardMoveAndAttack"
    }

    fn act(&self, monster: ActorId, game: &mut Game) -> Result<bool, DungeonError> {
        let Some(target) = game.map.player_position() else {
            return Ok(false);
        };
        let at = game.map.position(monster).ok_or(DungeonError::NotFound(monster))?;
        let (name, awareness) = game
            .map
            .actor(monster)
            .map(|a| (a.name.clone(), a.awareness))
            .ok_or(DungeonError::NotFound(monster))?;

        let sees_player = fov::visible_cells(game.map.grid(), at, awareness).contains(&target);
        let was_alerted = game
            .map
            .alertness_mut(monster)
            .and_then(|a| a.turns_alerted)
            .is_some();

        if sees_player && !was_alerted {
            let player_name = game.player().map(|p| p.name).unwrap_or_default();
            game.emit(format!("{} is eager to fight {}", name, player_name));
        }

        let limit = game.config.monster_alert_turns;
        let alerted = match game.map.alertness_mut(monster) {
            Some(mut alertness) => {
                alertness.turns_alerted = match (sees_player, alertness.turns_alerted) {
                    (true, _) => Some(0),
                    (false, Some(unseen)) if unseen < limit => Some(unseen + 1),
                    (false, _) => None,
                };
                alertness.turns_alerted.is_some()
            }
            None => sees_player,
        };
        if !alerted {
            if was_alerted {
                log::debug!("{} lost interest in the player", name);
            }
            return Ok(false);
        }

        for direction in steps_toward(at, target) {
            if act_in_direction(game, monster, direction)?.consumes_turn() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Greedy single steps from `from` toward `to`: the longer axis first, the
/// other axis as a fallback
fn steps_toward(from: Point, to: Point) -> Vec<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let horizontal = match dx.signum() {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    };
    let vertical = match dy.signum() {
        1 => Some(Direction::Down),
        -1 => Some(Direction::Up),
        _ => None,
    };
    let ordered = if dx.abs() >= dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    ordered.into_iter().flatten().collect()
}
