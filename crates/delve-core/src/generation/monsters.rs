//! Monster templates

use rand::Rng;

use crate::components::{Actor, Combat};

/// A kobold, scaled gently with dungeon depth
pub fn kobold<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Actor {
    let bonus = level / 3;
    let health = rng.gen_range(1..=5) + rng.gen_range(1..=5);
    Actor::monster(
        "Kobold",
        'k',
        10,
        14,
        Combat {
            attack: rng.gen_range(1..=3) + bonus,
            attack_chance: 25,
            defense: rng.gen_range(1..=3) + bonus,
            defense_chance: 10,
            health,
            max_health: health,
        },
    )
}
