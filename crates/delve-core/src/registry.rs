//! Actor registry - the authoritative occupancy map of actors to cells.
//!
//! Actors live in a `hecs` world (`Actor` + `Position`, plus `Brain` and
//! `Alertness` for monsters). A position index gives O(1) `actor_at`
//! lookups. Every registered actor's cell is unwalkable in the grid, and no
//! two actors share a cell.

use std::collections::HashMap;
use std::sync::Arc;

use hecs::{Component, World};

use crate::components::{Actor, Alertness, Brain, Point, Position};
use crate::error::DungeonError;
use crate::grid::Grid;
use crate::systems::Behavior;

/// Stable actor identity. The player keeps the same id across levels.
pub type ActorId = hecs::Entity;

#[derive(Default)]
pub struct ActorRegistry {
    world: World,
    by_position: HashMap<Point, ActorId>,
    /// Registration order, for deterministic iteration
    order: Vec<ActorId>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor at `at`, marking the cell unwalkable.
    ///
    /// Monsters get a `Brain` and an idle `Alertness` when a behavior is
    /// supplied.
    pub fn add_actor(
        &mut self,
        grid: &mut Grid,
        actor: Actor,
        at: Point,
        behavior: Option<Arc<dyn Behavior>>,
    ) -> Result<ActorId, DungeonError> {
        Self::check_free(grid, at)?;
        let id = match behavior {
            Some(behavior) => self.world.spawn((actor, Position(at), Brain(behavior), Alertness::default())),
            None => self.world.spawn((actor, Position(at))),
        };
        self.occupy(grid, id, at)?;
        Ok(id)
    }

    /// Register an actor under an id it already owns (the player arriving
    /// on a new level).
    pub fn add_actor_with_id(
        &mut self,
        grid: &mut Grid,
        id: ActorId,
        actor: Actor,
        at: Point,
    ) -> Result<ActorId, DungeonError> {
        if self.world.contains(id) {
            return Err(DungeonError::DuplicateActor(id));
        }
        Self::check_free(grid, at)?;
        self.world.spawn_at(id, (actor, Position(at)));
        self.occupy(grid, id, at)?;
        Ok(id)
    }

    fn check_free(grid: &Grid, at: Point) -> Result<(), DungeonError> {
        if !grid.is_walkable(at.x, at.y)? {
            return Err(DungeonError::OccupiedCell { x: at.x, y: at.y });
        }
        Ok(())
    }

    fn occupy(&mut self, grid: &mut Grid, id: ActorId, at: Point) -> Result<(), DungeonError> {
        grid.set_walkable(at.x, at.y, false)?;
        self.by_position.insert(at, id);
        self.order.push(id);
        Ok(())
    }

    /// Unregister an actor and free its cell. Returns the actor's data.
    pub fn remove_actor(&mut self, grid: &mut Grid, id: ActorId) -> Result<Actor, DungeonError> {
        let Some(at) = self.position(id) else {
            log::warn!("Registry: remove of unknown actor {:?}", id);
            return Err(DungeonError::NotFound(id));
        };
        let actor = self
            .world
            .get::<&Actor>(id)
            .map(|a| (*a).clone())
            .map_err(|_| DungeonError::NotFound(id))?;

        grid.set_walkable(at.x, at.y, true)?;
        self.by_position.remove(&at);
        self.order.retain(|&other| other != id);
        // Both components were just read, so the entity exists
        let _ = self.world.despawn(id);
        Ok(actor)
    }

    /// Move an actor to `to` if that cell is walkable.
    ///
    /// Returns `Ok(false)` without touching any state when the destination
    /// is not walkable. When the mover is the player, its field of view is
    /// recomputed around the new position before returning.
    pub fn move_actor(&mut self, grid: &mut Grid, id: ActorId, to: Point) -> Result<bool, DungeonError> {
        if !grid.is_walkable(to.x, to.y)? {
            return Ok(false);
        }
        let from = self.position(id).ok_or(DungeonError::NotFound(id))?;

        grid.set_walkable(from.x, from.y, true)?;
        grid.set_walkable(to.x, to.y, false)?;
        self.by_position.remove(&from);
        self.by_position.insert(to, id);
        if let Ok(mut pos) = self.world.get::<&mut Position>(id) {
            pos.0 = to;
        }

        let sight = self
            .world
            .get::<&Actor>(id)
            .ok()
            .filter(|a| a.is_player())
            .map(|a| a.awareness);
        if let Some(radius) = sight {
            grid.compute_field_of_view(to.x, to.y, radius)?;
        }
        Ok(true)
    }

    pub fn actor_at(&self, at: Point) -> Option<ActorId> {
        self.by_position.get(&at).copied()
    }

    pub fn position(&self, id: ActorId) -> Option<Point> {
        self.world.get::<&Position>(id).ok().map(|p| p.0)
    }

    pub fn actor(&self, id: ActorId) -> Option<hecs::Ref<'_, Actor>> {
        self.world.get::<&Actor>(id).ok()
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<hecs::RefMut<'_, Actor>> {
        self.world.get::<&mut Actor>(id).ok()
    }

    /// Mutable access to any other per-actor component (e.g. `Alertness`)
    pub fn component_mut<T: Component>(&mut self, id: ActorId) -> Option<hecs::RefMut<'_, T>> {
        self.world.get::<&mut T>(id).ok()
    }

    pub fn behavior(&self, id: ActorId) -> Option<Arc<dyn Behavior>> {
        self.world.get::<&Brain>(id).ok().map(|b| Arc::clone(&b.0))
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.world.contains(id)
    }

    /// Live actor ids in registration order
    pub fn ids(&self) -> &[ActorId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every actor with its position, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, Point, Actor)> + '_ {
        self.order.iter().filter_map(move |&id| {
            let pos = self.position(id)?;
            let actor = self.actor(id).map(|a| (*a).clone())?;
            Some((id, pos, actor))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Combat;

    fn floor(width: i32, height: i32) -> Grid {
        let mut grid = Grid::new(width, height);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                grid.set_cell_properties(x, y, true, true).unwrap();
            }
        }
        grid
    }

    fn rat() -> Actor {
        Actor::monster(
            "Rat",
            'r',
            5,
            10,
            Combat {
                attack: 1,
                attack_chance: 20,
                defense: 0,
                defense_chance: 0,
                health: 3,
                max_health: 3,
            },
        )
    }

    #[test]
    fn test_add_marks_cell_unwalkable() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        let id = registry.add_actor(&mut grid, rat(), Point::new(3, 3), None).unwrap();

        assert!(!grid.is_walkable(3, 3).unwrap());
        assert_eq!(registry.actor_at(Point::new(3, 3)), Some(id));
        assert_eq!(registry.position(id), Some(Point::new(3, 3)));
    }

    #[test]
    fn test_add_onto_occupied_or_wall_fails() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        registry.add_actor(&mut grid, rat(), Point::new(3, 3), None).unwrap();

        let clash = registry.add_actor(&mut grid, rat(), Point::new(3, 3), None);
        assert_eq!(clash.unwrap_err(), DungeonError::OccupiedCell { x: 3, y: 3 });
        let wall = registry.add_actor(&mut grid, rat(), Point::new(0, 0), None);
        assert_eq!(wall.unwrap_err(), DungeonError::OccupiedCell { x: 0, y: 0 });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_frees_cell_and_reports_missing() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        let id = registry.add_actor(&mut grid, rat(), Point::new(2, 5), None).unwrap();

        let removed = registry.remove_actor(&mut grid, id).unwrap();
        assert_eq!(removed.name, "Rat");
        assert!(grid.is_walkable(2, 5).unwrap());
        assert_eq!(registry.actor_at(Point::new(2, 5)), None);
        assert_eq!(registry.remove_actor(&mut grid, id), Err(DungeonError::NotFound(id)));
    }

    #[test]
    fn test_move_updates_occupancy() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        let id = registry.add_actor(&mut grid, rat(), Point::new(2, 2), None).unwrap();

        assert!(registry.move_actor(&mut grid, id, Point::new(3, 2)).unwrap());
        assert!(grid.is_walkable(2, 2).unwrap());
        assert!(!grid.is_walkable(3, 2).unwrap());
        assert_eq!(registry.actor_at(Point::new(3, 2)), Some(id));
        assert_eq!(registry.actor_at(Point::new(2, 2)), None);
    }

    #[test]
    fn test_failed_move_changes_nothing() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        let a = registry.add_actor(&mut grid, rat(), Point::new(2, 2), None).unwrap();
        let b = registry.add_actor(&mut grid, rat(), Point::new(3, 2), None).unwrap();

        assert!(!registry.move_actor(&mut grid, a, Point::new(3, 2)).unwrap());
        assert!(!registry.move_actor(&mut grid, a, Point::new(2, 0)).unwrap());
        assert!(!grid.is_walkable(2, 2).unwrap());
        assert!(!grid.is_walkable(3, 2).unwrap());
        assert!(!grid.is_walkable(2, 0).unwrap());
        assert_eq!(registry.position(a), Some(Point::new(2, 2)));
        assert_eq!(registry.position(b), Some(Point::new(3, 2)));
    }

    #[test]
    fn test_move_out_of_bounds_is_error() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        let id = registry.add_actor(&mut grid, rat(), Point::new(1, 1), None).unwrap();
        assert_eq!(
            registry.move_actor(&mut grid, id, Point::new(-1, 1)),
            Err(DungeonError::OutOfBounds { x: -1, y: 1 })
        );
    }

    #[test]
    fn test_player_move_recomputes_fov() {
        let mut grid = floor(30, 5);
        let mut registry = ActorRegistry::new();
        let mut player = Actor::player("Tester");
        player.awareness = 3;
        let id = registry.add_actor(&mut grid, player, Point::new(2, 2), None).unwrap();

        assert!(registry.move_actor(&mut grid, id, Point::new(3, 2)).unwrap());
        assert!(grid.is_in_fov(6, 2).unwrap());
        assert!(!grid.is_in_fov(7, 2).unwrap());

        // Monsters moving never touch the player's view
        let monster = registry.add_actor(&mut grid, rat(), Point::new(20, 2), None).unwrap();
        registry.move_actor(&mut grid, monster, Point::new(21, 2)).unwrap();
        assert!(grid.is_in_fov(6, 2).unwrap());
        assert!(!grid.is_explored(21, 2).unwrap());
    }

    #[test]
    fn test_add_with_id_keeps_identity() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        let id = registry.add_actor(&mut grid, Actor::player("P"), Point::new(1, 1), None).unwrap();
        let player = registry.remove_actor(&mut grid, id).unwrap();

        let mut next_grid = floor(8, 8);
        let mut next = ActorRegistry::new();
        let same = next.add_actor_with_id(&mut next_grid, id, player, Point::new(4, 4)).unwrap();
        assert_eq!(same, id);
        assert!(next.add_actor(&mut next_grid, rat(), Point::new(5, 5), None).unwrap() != id);
        assert_eq!(
            next.add_actor_with_id(&mut next_grid, id, Actor::player("Q"), Point::new(2, 2)),
            Err(DungeonError::DuplicateActor(id))
        );
    }

    #[test]
    fn test_ids_follow_registration_order() {
        let mut grid = floor(8, 8);
        let mut registry = ActorRegistry::new();
        let ids: Vec<ActorId> = (1..5)
            .map(|x| registry.add_actor(&mut grid, rat(), Point::new(x, 1), None).unwrap())
            .collect();
        assert_eq!(registry.ids(), ids.as_slice());
        registry.remove_actor(&mut grid, ids[1]).unwrap();
        assert_eq!(registry.iter().map(|(id, _, _)| id).collect::<Vec<_>>(), vec![ids[0], ids[2], ids[3]]);
    }
}
