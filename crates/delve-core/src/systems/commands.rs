//! Command layer - turns intended actions into validated state changes and
//! moves turn ownership along.
//!
//! A blocked move is never an error here. The blocker decides the
//! alternate action: an enemy is attacked, a closed door is opened, and
//! anything else leaves the actor where it was.

use crate::components::{ActorKind, Direction, Point};
use crate::engine::Game;
use crate::error::DungeonError;
use crate::registry::ActorId;
use crate::systems::combat;

/// What one directional action resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Moved,
    OpenedDoor,
    Attacked,
    /// Nothing happened; the turn is not used
    Blocked,
}

impl ActionOutcome {
    /// Whether the actor changed cells
    pub fn relocated(self) -> bool {
        self == ActionOutcome::Moved
    }

    pub fn consumes_turn(self) -> bool {
        self != ActionOutcome::Blocked
    }
}

pub fn is_player_turn(game: &Game) -> bool {
    game.map.next_actor() == Some(game.player_id())
}

pub fn move_player(game: &mut Game, direction: Direction) -> Result<ActionOutcome, DungeonError> {
    let player = game.player_id();
    let outcome = act_in_direction(game, player, direction)?;
    log::debug!("Player move {:?}: {:?}", direction, outcome);
    Ok(outcome)
}

/// Move `actor` one step, falling back to an attack or a door opening
/// when the destination is taken
pub fn act_in_direction(game: &mut Game, actor: ActorId, direction: Direction) -> Result<ActionOutcome, DungeonError> {
    let from = game.map.position(actor).ok_or(DungeonError::NotFound(actor))?;
    let to = from.step(direction);
    if game.map.move_actor(actor, to)? {
        return Ok(ActionOutcome::Moved);
    }

    if let Some(occupant) = game.map.actor_at(to) {
        if is_hostile(game, actor, occupant) {
            combat::attack(game, actor, occupant)?;
            return Ok(ActionOutcome::Attacked);
        }
        return Ok(ActionOutcome::Blocked);
    }

    if open_door(game, actor, to)? {
        return Ok(ActionOutcome::OpenedDoor);
    }
    Ok(ActionOutcome::Blocked)
}

/// Open the door at `at` on behalf of `actor`. Emits one event the first
/// time; returns `false` when there is no closed door there.
pub fn open_door(game: &mut Game, actor: ActorId, at: Point) -> Result<bool, DungeonError> {
    if !game.map.open_door(at)? {
        return Ok(false);
    }
    let name = game.map.actor(actor).map(|a| a.name.clone()).unwrap_or_default();
    log::info!("{} opened the door at {}", name, at);
    game.emit(format!("{} opened a door", name));
    Ok(true)
}

pub fn end_player_turn(game: &mut Game) {
    let player = game.player_id();
    game.map.advance_turn(player);
}

/// Run monster turns until the player is next. A monster whose action
/// fails forfeits it; its turn still advances.
pub fn activate_monsters(game: &mut Game) {
    let player = game.player_id();
    while let Some(next) = game.map.next_actor() {
        if next == player || game.is_over() || !game.map.is_scheduled(player) {
            break;
        }

        match game.map.behavior(next) {
            Some(behavior) => match behavior.act(next, game) {
                Ok(true) => {}
                Ok(false) => log::debug!("{:?} ({}) idles", next, behavior.name()),
                Err(err) => log::warn!("{:?} forfeits its action: {}", next, err),
            },
            None => log::warn!("{:?} has no behavior, skipping its turn", next),
        }
        // Removed actors (killed during their own turn) are skipped here
        game.map.advance_turn(next);
    }
}

fn is_hostile(game: &Game, a: ActorId, b: ActorId) -> bool {
    let kind = |id| game.map.actor(id).map(|actor| actor.kind);
    match (kind(a), kind(b)) {
        (Some(ActorKind::Player), Some(ActorKind::Monster)) => true,
        (Some(ActorKind::Monster), Some(ActorKind::Player)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::generation::FixedLayouts;

    const ROOM: &str = "\
########
#@.kk..#
#......#
#.....>#
########";

    fn game() -> Game {
        let config = GameConfig {
            seed: Some(8),
            ..Default::default()
        };
        Game::new(config, Box::new(FixedLayouts::new(vec![ROOM.to_string()]))).unwrap()
    }

    #[test]
    fn test_outcome_flags() {
        assert!(ActionOutcome::Moved.relocated());
        assert!(!ActionOutcome::OpenedDoor.relocated());
        assert!(ActionOutcome::Attacked.consumes_turn());
        assert!(!ActionOutcome::Blocked.consumes_turn());
    }

    #[test]
    fn test_player_moves_first() {
        let mut game = game();
        assert!(is_player_turn(&game));
        let outcome = move_player(&mut game, Direction::Right).unwrap();
        assert_eq!(outcome, ActionOutcome::Moved);
        assert_eq!(game.player_position(), Some(Point::new(2, 1)));
    }

    #[test]
    fn test_monster_into_monster_is_blocked() {
        let mut game = game();
        let left = game.map.actor_at(Point::new(3, 1)).unwrap();
        let outcome = act_in_direction(&mut game, left, Direction::Right).unwrap();
        assert_eq!(outcome, ActionOutcome::Blocked);
        assert_eq!(game.map.position(left), Some(Point::new(3, 1)));
    }

    #[test]
    fn test_end_player_turn_hands_over() {
        let mut game = game();
        move_player(&mut game, Direction::Down).unwrap();
        end_player_turn(&mut game);
        // Kobolds (speed 14) act at t=14, before the player's t=20
        assert!(!is_player_turn(&game));
        activate_monsters(&mut game);
        assert!(is_player_turn(&game));
        assert!(game.map.check_invariants().is_empty());
    }
}
