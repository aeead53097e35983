//! Rooms-and-corridors dungeon generator.
//!
//! Rectangular rooms are placed at random without overlap, consecutive
//! rooms are joined by L-shaped tunnels between their centers, and doors
//! go wherever a tunnel pierces a room wall. The up stairs sit in the
//! first room, the down stairs in the last.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{Point, Rect};
use crate::config::GameConfig;
use crate::dungeon::DungeonMap;
use crate::error::DungeonError;
use crate::grid::Grid;
use crate::systems::StandardMoveAndAttack;

use super::{kobold, MapBuilder};

pub struct RoomsAndCorridors {
    config: GameConfig,
    rng: StdRng,
}

impl RoomsAndCorridors {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn check_config(&self) -> Result<(), DungeonError> {
        let c = &self.config;
        if c.room_min_size < 3 || c.room_min_size > c.room_max_size {
            return Err(DungeonError::InvalidLayout(format!(
                "room size range {}..={} is unusable",
                c.room_min_size, c.room_max_size
            )));
        }
        if c.map_width < c.room_max_size + 2 || c.map_height < c.room_max_size + 2 {
            return Err(DungeonError::InvalidLayout(format!(
                "{}x{} map cannot hold a {}-cell room",
                c.map_width, c.map_height, c.room_max_size
            )));
        }
        Ok(())
    }

    fn place_rooms(&mut self) -> Vec<Rect> {
        let c = &self.config;
        let mut rooms: Vec<Rect> = Vec::new();
        for _ in 0..c.max_rooms {
            let width = self.rng.gen_range(c.room_min_size..=c.room_max_size);
            let height = self.rng.gen_range(c.room_min_size..=c.room_max_size);
            let x = self.rng.gen_range(0..c.map_width - width);
            let y = self.rng.gen_range(0..c.map_height - height);
            let room = Rect::new(x, y, width, height);
            if !rooms.iter().any(|other| room.intersects(other)) {
                rooms.push(room);
            }
        }
        rooms
    }

    fn carve_tunnels(&mut self, grid: &mut Grid, rooms: &[Rect]) -> Result<(), DungeonError> {
        for pair in rooms.windows(2) {
            let from = pair[0].center();
            let to = pair[1].center();
            if self.rng.gen_bool(0.5) {
                carve_horizontal(grid, from.x, to.x, from.y)?;
                carve_vertical(grid, from.y, to.y, to.x)?;
            } else {
                carve_vertical(grid, from.y, to.y, from.x)?;
                carve_horizontal(grid, from.x, to.x, to.y)?;
            }
        }
        Ok(())
    }
}

impl MapBuilder for RoomsAndCorridors {
    fn build(&mut self, level: u32) -> Result<DungeonMap, DungeonError> {
        self.check_config()?;
        let mut grid = Grid::new(self.config.map_width, self.config.map_height);

        let rooms = self.place_rooms();
        let (Some(first), Some(last)) = (rooms.first().copied(), rooms.last().copied()) else {
            return Err(DungeonError::InvalidLayout("no room could be placed".to_string()));
        };
        for room in &rooms {
            for p in room.interior() {
                grid.set_cell_properties(p.x, p.y, true, true)?;
            }
        }
        self.carve_tunnels(&mut grid, &rooms)?;

        let mut doors = Vec::new();
        for room in &rooms {
            for p in room.boundary() {
                if is_potential_door(&grid, &doors, p) {
                    doors.push(p);
                }
            }
        }

        let mut map = DungeonMap::new(grid, rooms, first.center(), last.center())?;
        for &p in &doors {
            map.add_door(p)?;
        }
        log::info!(
            "Generated level {}: {} rooms, {} doors",
            level,
            map.rooms.len(),
            map.doors().len()
        );
        Ok(map)
    }

    fn populate(&mut self, map: &mut DungeonMap, level: u32) -> Result<(), DungeonError> {
        let behavior = Arc::new(StandardMoveAndAttack);
        let rooms = map.rooms.clone();
        let mut spawned = 0;
        // The first room holds the arriving player
        for room in rooms.iter().skip(1) {
            if !self.rng.gen_bool(self.config.monster_room_chance.clamp(0.0, 1.0)) {
                continue;
            }
            let count = self.rng.gen_range(1..=self.config.max_monsters_per_room.max(1));
            for _ in 0..count {
                let Some(at) = map.random_walkable_location_in_room(room, &mut self.rng) else {
                    break;
                };
                map.add_monster(kobold(level, &mut self.rng), at, behavior.clone())?;
                spawned += 1;
            }
        }
        log::debug!("Spawned {} monsters on level {}", spawned, level);
        Ok(())
    }
}

fn carve_horizontal(grid: &mut Grid, x1: i32, x2: i32, y: i32) -> Result<(), DungeonError> {
    for x in x1.min(x2)..=x1.max(x2) {
        grid.set_cell_properties(x, y, true, true)?;
    }
    Ok(())
}

fn carve_vertical(grid: &mut Grid, y1: i32, y2: i32, x: i32) -> Result<(), DungeonError> {
    for y in y1.min(y2)..=y1.max(y2) {
        grid.set_cell_properties(x, y, true, true)?;
    }
    Ok(())
}

/// A carved wall cell with floor on one axis, wall on the other and no
/// door next to it
fn is_potential_door(grid: &Grid, doors: &[Point], p: Point) -> bool {
    let walkable = |x: i32, y: i32| grid.is_walkable(x, y).unwrap_or(false);
    if !walkable(p.x, p.y) {
        return false;
    }
    let neighbors = [
        Point::new(p.x, p.y),
        Point::new(p.x + 1, p.y),
        Point::new(p.x - 1, p.y),
        Point::new(p.x, p.y - 1),
        Point::new(p.x, p.y + 1),
    ];
    if neighbors.iter().any(|n| doors.contains(n)) {
        return false;
    }
    let (left, right) = (walkable(p.x - 1, p.y), walkable(p.x + 1, p.y));
    let (top, bottom) = (walkable(p.x, p.y - 1), walkable(p.x, p.y + 1));
    (left && right && !top && !bottom) || (!left && !right && top && bottom)
}
