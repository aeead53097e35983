//! DungeonMap - one live level: terrain, actors, turn order, doors, stairs.
//!
//! The map owns both the actor registry and the turn scheduler, and is the
//! only code that adds or removes actors. Every add registers the actor in
//! both structures and every removal drops it from both, so an actor can
//! never be scheduled without being registered (or the reverse).

use std::sync::Arc;

use rand::Rng;

use crate::components::{Actor, ActorKind, Alertness, Door, Point, Rect, Stairs};
use crate::error::DungeonError;
use crate::grid::Grid;
use crate::registry::{ActorId, ActorRegistry};
use crate::systems::{Behavior, TurnScheduler};

/// Attempts made by [`DungeonMap::random_walkable_location_in_room`]
const ROOM_LOCATION_TRIES: usize = 100;

pub struct DungeonMap {
    grid: Grid,
    actors: ActorRegistry,
    scheduler: TurnScheduler,
    player: Option<ActorId>,
    doors: Vec<Door>,
    /// Rooms carved by the generator, in creation order
    pub rooms: Vec<Rect>,
    pub stairs_up: Stairs,
    pub stairs_down: Stairs,
}

impl DungeonMap {
    /// Wrap a carved grid. Both stairs must sit on walkable cells.
    pub fn new(grid: Grid, rooms: Vec<Rect>, stairs_up: Point, stairs_down: Point) -> Result<Self, DungeonError> {
        for (label, at) in [("up", stairs_up), ("down", stairs_down)] {
            if !grid.is_walkable(at.x, at.y)? {
                return Err(DungeonError::InvalidLayout(format!(
                    "stairs {} at {} are not on a floor cell",
                    label, at
                )));
            }
        }
        Ok(Self {
            grid,
            actors: ActorRegistry::new(),
            scheduler: TurnScheduler::new(),
            player: None,
            doors: Vec::new(),
            rooms,
            stairs_up: Stairs::up(stairs_up),
            stairs_down: Stairs::down(stairs_down),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Terrain edits for builders. Actor cells are managed by the registry.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    // ── Actors ──────────────────────────────────────────────────────────

    /// Place the player and compute its first field of view. Pass the id
    /// from the previous level to keep the player's identity.
    pub fn add_player(&mut self, actor: Actor, at: Point, id: Option<ActorId>) -> Result<ActorId, DungeonError> {
        if let Some(existing) = self.player {
            return Err(DungeonError::DuplicateActor(existing));
        }
        let speed = actor.speed;
        let awareness = actor.awareness;
        let id = match id {
            Some(id) => self.actors.add_actor_with_id(&mut self.grid, id, actor, at)?,
            None => self.actors.add_actor(&mut self.grid, actor, at, None)?,
        };
        self.scheduler.add(id, speed);
        self.player = Some(id);
        self.grid.compute_field_of_view(at.x, at.y, awareness)?;
        log::debug!("Player {:?} placed at {}", id, at);
        Ok(id)
    }

    pub fn add_monster(
        &mut self,
        actor: Actor,
        at: Point,
        behavior: Arc<dyn Behavior>,
    ) -> Result<ActorId, DungeonError> {
        let speed = actor.speed;
        let id = self.actors.add_actor(&mut self.grid, actor, at, Some(behavior))?;
        self.scheduler.add(id, speed);
        Ok(id)
    }

    /// Remove an actor from the registry and the turn order together.
    /// Its cell becomes walkable immediately.
    pub fn remove_actor(&mut self, id: ActorId) -> Result<Actor, DungeonError> {
        let actor = self.actors.remove_actor(&mut self.grid, id)?;
        self.scheduler.remove(id);
        if self.player == Some(id) {
            self.player = None;
        }
        Ok(actor)
    }

    /// Move an actor one step. Closed doors refuse entry the same way an
    /// occupied cell does: `Ok(false)` and nothing changes.
    pub fn move_actor(&mut self, id: ActorId, to: Point) -> Result<bool, DungeonError> {
        self.grid.cell(to.x, to.y)?;
        if self.door_at(to).is_some_and(|d| !d.is_open) {
            return Ok(false);
        }
        self.actors.move_actor(&mut self.grid, id, to)
    }

    pub fn player(&self) -> Option<ActorId> {
        self.player
    }

    pub fn player_position(&self) -> Option<Point> {
        self.player.and_then(|id| self.actors.position(id))
    }

    pub fn actor_at(&self, at: Point) -> Option<ActorId> {
        self.actors.actor_at(at)
    }

    pub fn monster_at(&self, at: Point) -> Option<ActorId> {
        self.actor_at(at)
            .filter(|&id| self.actor(id).is_some_and(|a| a.kind == ActorKind::Monster))
    }

    pub fn position(&self, id: ActorId) -> Option<Point> {
        self.actors.position(id)
    }

    pub fn actor(&self, id: ActorId) -> Option<hecs::Ref<'_, Actor>> {
        self.actors.actor(id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<hecs::RefMut<'_, Actor>> {
        self.actors.actor_mut(id)
    }

    pub fn alertness_mut(&mut self, id: ActorId) -> Option<hecs::RefMut<'_, Alertness>> {
        self.actors.component_mut::<Alertness>(id)
    }

    pub fn behavior(&self, id: ActorId) -> Option<Arc<dyn Behavior>> {
        self.actors.behavior(id)
    }

    pub fn actors(&self) -> &ActorRegistry {
        &self.actors
    }

    // ── Turn order ──────────────────────────────────────────────────────

    pub fn next_actor(&self) -> Option<ActorId> {
        self.scheduler.next_actor()
    }

    /// Finish `id`'s turn. No-op for actors removed during their turn.
    pub fn advance_turn(&mut self, id: ActorId) -> bool {
        self.scheduler.advance(id)
    }

    pub fn is_scheduled(&self, id: ActorId) -> bool {
        self.scheduler.contains(id)
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// Drop every actor's turn ahead of discarding the level
    pub fn teardown(&mut self) {
        log::debug!("Tearing down level with {} scheduled actors", self.scheduler.len());
        self.scheduler.clear();
    }

    // ── Field of view ───────────────────────────────────────────────────

    /// Recompute the player's field of view around its current position
    pub fn update_player_fov(&mut self) -> Result<(), DungeonError> {
        let Some(id) = self.player else {
            return Ok(());
        };
        let at = self.actors.position(id).ok_or(DungeonError::NotFound(id))?;
        let radius = self.actors.actor(id).map(|a| a.awareness).ok_or(DungeonError::NotFound(id))?;
        self.grid.compute_field_of_view(at.x, at.y, radius)?;
        Ok(())
    }

    // ── Doors and stairs ────────────────────────────────────────────────

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn door_at(&self, at: Point) -> Option<&Door> {
        self.doors.iter().find(|d| d.position == at)
    }

    /// Place a closed door. The cell stays walkable and becomes opaque.
    pub fn add_door(&mut self, at: Point) -> Result<(), DungeonError> {
        if self.door_at(at).is_some() {
            return Err(DungeonError::InvalidLayout(format!("two doors at {}", at)));
        }
        self.grid.set_transparent(at.x, at.y, false)?;
        self.doors.push(Door::closed(at));
        Ok(())
    }

    /// Open the door at `at`. Returns `true` only when a closed door was
    /// opened; missing or already-open doors are left alone.
    pub fn open_door(&mut self, at: Point) -> Result<bool, DungeonError> {
        let Some(door) = self.doors.iter_mut().find(|d| d.position == at) else {
            return Ok(false);
        };
        if door.is_open {
            return Ok(false);
        }
        door.is_open = true;
        self.grid.set_transparent(at.x, at.y, true)?;
        self.update_player_fov()?;
        Ok(true)
    }

    /// Whether the player stands on the down stairs
    pub fn can_move_down_to_next_level(&self) -> bool {
        self.player_position() == Some(self.stairs_down.position)
    }

    /// Where an arriving player is placed
    pub fn player_start(&self) -> Point {
        self.stairs_up.position
    }

    // ── Rooms ───────────────────────────────────────────────────────────

    pub fn room_has_walkable_space(&self, room: &Rect) -> bool {
        room.interior()
            .any(|p| self.grid.is_walkable(p.x, p.y).unwrap_or(false))
    }

    /// A random free interior cell of `room`, or `None` after repeated misses
    pub fn random_walkable_location_in_room<R: Rng + ?Sized>(&self, room: &Rect, rng: &mut R) -> Option<Point> {
        if room.width < 3 || room.height < 3 || !self.room_has_walkable_space(room) {
            return None;
        }
        for _ in 0..ROOM_LOCATION_TRIES {
            let x = room.x + rng.gen_range(1..=room.width - 2);
            let y = room.y + rng.gen_range(1..=room.height - 2);
            if self.grid.is_walkable(x, y).unwrap_or(false) && self.door_at(Point::new(x, y)).is_none() {
                return Some(Point::new(x, y));
            }
        }
        None
    }

    // ── Invariants ──────────────────────────────────────────────────────

    /// Every violated occupancy or pairing invariant, described. Empty when
    /// the map is consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (id, at, actor) in self.actors.iter() {
            if self.grid.is_walkable(at.x, at.y).unwrap_or(true) {
                problems.push(format!("{} ({:?}) stands on walkable cell {}", actor.name, id, at));
            }
            if !seen.insert(at) {
                problems.push(format!("two actors share cell {}", at));
            }
            if !self.scheduler.contains(id) {
                problems.push(format!("{} ({:?}) is registered but not scheduled", actor.name, id));
            }
        }
        if self.scheduler.len() != self.actors.len() {
            problems.push(format!(
                "scheduler holds {} actors, registry {}",
                self.scheduler.len(),
                self.actors.len()
            ));
        }
        problems
    }
}

impl std::fmt::Debug for DungeonMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DungeonMap")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("actors", &self.actors.len())
            .field("doors", &self.doors.len())
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
