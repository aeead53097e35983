//! Melee resolution - dice pools for attack and defense.
//!
//! The attacker rolls `attack` dice, each hitting with `attack_chance`
//! percent. The defender rolls `defense` dice against the hits, each
//! blocking with `defense_chance` percent. Unblocked hits are damage.

use rand::Rng;

use crate::components::Combat;
use crate::engine::Game;
use crate::error::DungeonError;
use crate::registry::ActorId;

/// Outcome of one swing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResult {
    pub hits: u32,
    pub blocks: u32,
    pub damage: u32,
    pub killed: bool,
}

/// Count successes among `dice` rolls of `chance` percent
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R, dice: u32, chance: u32) -> u32 {
    (0..dice).filter(|_| rng.gen_range(0..100) < chance).count() as u32
}

/// Roll one exchange without touching any actor
pub fn resolve_swing<R: Rng + ?Sized>(rng: &mut R, attacker: &Combat, defender: &Combat) -> (u32, u32) {
    let hits = roll_dice(rng, attacker.attack, attacker.attack_chance);
    let blocks = if hits > 0 {
        roll_dice(rng, defender.defense, defender.defense_chance)
    } else {
        0
    };
    (hits, blocks)
}

/// `attacker` swings at `defender`. Damage is applied immediately; a
/// monster reduced to zero health is removed from the map, a dead player
/// ends the game.
pub fn attack(game: &mut Game, attacker: ActorId, defender: ActorId) -> Result<AttackResult, DungeonError> {
    let (attacker_name, attacker_stats) = game
        .map
        .actor(attacker)
        .map(|a| (a.name.clone(), a.combat))
        .ok_or(DungeonError::NotFound(attacker))?;
    let (defender_name, defender_stats) = game
        .map
        .actor(defender)
        .map(|a| (a.name.clone(), a.combat))
        .ok_or(DungeonError::NotFound(defender))?;

    let (hits, blocks) = resolve_swing(&mut game.rng, &attacker_stats, &defender_stats);
    let damage = hits.saturating_sub(blocks);

    let mut line = format!("{} attacks {} and rolls {} hits", attacker_name, defender_name, hits);
    if hits > 0 {
        line.push_str(&format!(". {} defends and rolls {} blocks", defender_name, blocks));
    }
    game.emit(line);

    let mut killed = false;
    if damage > 0 {
        let dead = {
            let mut target = game.map.actor_mut(defender).ok_or(DungeonError::NotFound(defender))?;
            target.combat.health -= damage as i32;
            target.combat.is_dead()
        };
        game.emit(format!("{} was hit for {} damage", defender_name, damage));
        if dead {
            resolve_death(game, defender)?;
            killed = true;
        }
    } else if hits > 0 {
        game.emit(format!("{} blocked all damage", defender_name));
    }

    Ok(AttackResult {
        hits,
        blocks,
        damage,
        killed,
    })
}

fn resolve_death(game: &mut Game, id: ActorId) -> Result<(), DungeonError> {
    if game.map.player() == Some(id) {
        let name = game.map.actor(id).map(|a| a.name.clone()).unwrap_or_default();
        log::info!("{} died, game over", name);
        game.emit(format!("{} was killed, GAME OVER MAN!", name));
        game.set_over();
    } else {
        let corpse = game.map.remove_actor(id)?;
        log::info!("{} died", corpse.name);
        game.emit(format!("{} died", corpse.name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stats(attack: u32, attack_chance: u32, defense: u32, defense_chance: u32) -> Combat {
        Combat {
            attack,
            attack_chance,
            defense,
            defense_chance,
            health: 10,
            max_health: 10,
        }
    }

    #[test]
    fn test_certain_and_impossible_rolls() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(roll_dice(&mut rng, 5, 100), 5);
        assert_eq!(roll_dice(&mut rng, 5, 0), 0);
        assert_eq!(roll_dice(&mut rng, 0, 100), 0);
    }

    #[test]
    fn test_no_hits_means_no_defense_roll() {
        let mut rng = StdRng::seed_from_u64(3);
        let (hits, blocks) = resolve_swing(&mut rng, &stats(3, 0, 0, 0), &stats(0, 0, 3, 100));
        assert_eq!((hits, blocks), (0, 0));
    }

    #[test]
    fn test_blocks_can_exceed_hits() {
        let mut rng = StdRng::seed_from_u64(3);
        let (hits, blocks) = resolve_swing(&mut rng, &stats(1, 100, 0, 0), &stats(0, 0, 3, 100));
        assert_eq!((hits, blocks), (1, 3));
        assert_eq!(hits.saturating_sub(blocks), 0);
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let a: Vec<u32> = {
            let mut rng = StdRng::seed_from_u64(11);
            (0..10).map(|_| roll_dice(&mut rng, 4, 50)).collect()
        };
        let b: Vec<u32> = {
            let mut rng = StdRng::seed_from_u64(11);
            (0..10).map(|_| roll_dice(&mut rng, 4, 50)).collect()
        };
        assert_eq!(a, b);
    }
}
