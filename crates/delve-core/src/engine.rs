//! Game context - the state one top-level loop owns and passes around.
//!
//! Holds the live level, the message log and the combat RNG. Command-layer
//! functions and monster behaviors all take `&mut Game`; nothing in the
//! crate reaches for global state.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Actor, Direction, Point};
use crate::config::GameConfig;
use crate::dungeon::DungeonMap;
use crate::error::DungeonError;
use crate::generation::MapBuilder;
use crate::registry::ActorId;
use crate::systems::{self, MessageLog};

/// One discrete input per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Move(Direction),
    /// Take the down stairs the player is standing on
    Descend,
}

pub struct Game {
    pub config: GameConfig,
    pub map: DungeonMap,
    pub messages: MessageLog,
    /// Combat rolls
    pub rng: StdRng,
    builder: Box<dyn MapBuilder>,
    player: ActorId,
    level: u32,
    seed: u64,
    over: bool,
}

impl Game {
    /// Build level 1 and place the player on its up stairs
    pub fn new(config: GameConfig, mut builder: Box<dyn MapBuilder>) -> Result<Self, DungeonError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut map = builder.build(1)?;
        let start = map.player_start();
        let player = map.add_player(Actor::player(config.player_name.clone()), start, None)?;
        builder.populate(&mut map, 1)?;

        let mut messages = MessageLog::new(config.message_log_capacity);
        messages.add("The player arrives on level 1");
        messages.add(format!("Level created with seed '{}'", seed));
        log::info!(
            "New game: seed {}, {}x{} map, {} actors",
            seed,
            map.width(),
            map.height(),
            map.actors().len()
        );

        Ok(Self {
            config,
            map,
            messages,
            rng: StdRng::seed_from_u64(seed),
            builder,
            player,
            level: 1,
            seed,
            over: false,
        })
    }

    /// Advance the simulation by one step.
    ///
    /// On the player's turn, `input` is resolved and the turn ends if the
    /// action used it; with no input nothing happens. Otherwise monsters
    /// act until the player is next. Returns whether anything changed.
    pub fn tick(&mut self, input: Option<PlayerCommand>) -> Result<bool, DungeonError> {
        if self.over {
            return Ok(false);
        }

        if systems::is_player_turn(self) {
            let Some(command) = input else {
                return Ok(false);
            };
            let acted = match command {
                PlayerCommand::Move(direction) => systems::move_player(self, direction)?.consumes_turn(),
                PlayerCommand::Descend => self.descend()?,
            };
            if acted {
                systems::end_player_turn(self);
            }
            Ok(acted)
        } else {
            systems::activate_monsters(self);
            Ok(true)
        }
    }

    /// Take the down stairs. Level N+1 is built and populated around a
    /// copy of the player before anything on the current level changes, so
    /// a failing builder leaves the game where it was. The player is placed
    /// before monsters are spawned, so its id is already taken in the new
    /// level's registry. Returns `false` when the player is not on the
    /// stairs.
    pub fn descend(&mut self) -> Result<bool, DungeonError> {
        if !self.map.can_move_down_to_next_level() {
            return Ok(false);
        }
        let next_level = self.level + 1;
        let player = self.map.actor(self.player).map(|a| Actor::clone(&a)).ok_or(DungeonError::NotFound(self.player))?;

        let mut next_map = self.builder.build(next_level)?;
        let start = next_map.player_start();
        next_map.add_player(player, start, Some(self.player))?;
        self.builder.populate(&mut next_map, next_level)?;

        self.map.remove_actor(self.player)?;
        self.map.teardown();
        self.map = next_map;
        self.level = next_level;
        self.messages.clear();
        self.emit(format!("The player descends to level {}", next_level));
        log::info!("Descended to level {} ({} actors)", next_level, self.map.actors().len());
        Ok(true)
    }

    /// Record a human-readable game event
    pub fn emit(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("event: {}", message);
        self.messages.add(message);
    }

    pub(crate) fn set_over(&mut self) {
        self.over = true;
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn player_id(&self) -> ActorId {
        self.player
    }

    /// Snapshot of the player's data
    pub fn player(&self) -> Option<Actor> {
        self.map.actor(self.player).map(|a| (*a).clone())
    }

    pub fn player_position(&self) -> Option<Point> {
        self.map.position(self.player)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
