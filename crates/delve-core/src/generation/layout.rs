//! Hand-drawn levels from ASCII art, for scripted scenarios and tests.
//!
//! | char | meaning                                   |
//! |------|-------------------------------------------|
//! | `#`  | wall (spaces and short rows are walls too) |
//! | `.`  | floor                                     |
//! | `+`  | closed door                               |
//! | `<`  | up stairs, where the player arrives       |
//! | `@`  | same as `<`                               |
//! | `>`  | down stairs                               |
//! | `k`  | kobold on floor                           |

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Point, Rect};
use crate::dungeon::DungeonMap;
use crate::error::DungeonError;
use crate::grid::Grid;
use crate::systems::StandardMoveAndAttack;

use super::{kobold, MapBuilder};

/// A parsed ASCII level
#[derive(Debug, Clone)]
pub struct Layout {
    pub grid: Grid,
    pub doors: Vec<Point>,
    pub stairs_up: Point,
    pub stairs_down: Point,
    pub monsters: Vec<Point>,
}

impl Layout {
    pub fn parse(text: &str) -> Result<Self, DungeonError> {
        let rows: Vec<&str> = text.lines().collect();
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Grid::new(width, height);
        let mut doors = Vec::new();
        let mut monsters = Vec::new();
        let mut up = None;
        let mut down = None;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let p = Point::new(x as i32, y as i32);
                match ch {
                    '#' | ' ' => continue,
                    '.' => {}
                    '+' => doors.push(p),
                    '<' | '@' => {
                        if up.replace(p).is_some() {
                            return Err(DungeonError::InvalidLayout("more than one up stairs".to_string()));
                        }
                    }
                    '>' => {
                        if down.replace(p).is_some() {
                            return Err(DungeonError::InvalidLayout("more than one down stairs".to_string()));
                        }
                    }
                    'k' => monsters.push(p),
                    other => {
                        return Err(DungeonError::InvalidLayout(format!("unknown tile '{}' at {}", other, p)));
                    }
                }
                grid.set_cell_properties(p.x, p.y, true, true)?;
            }
        }

        let stairs_up = up.ok_or_else(|| DungeonError::InvalidLayout("no up stairs".to_string()))?;
        let stairs_down = down.ok_or_else(|| DungeonError::InvalidLayout("no down stairs".to_string()))?;
        Ok(Self {
            grid,
            doors,
            stairs_up,
            stairs_down,
            monsters,
        })
    }
}

/// Serves a fixed list of layouts, one per level. Levels past the end
/// wrap around.
pub struct FixedLayouts {
    layouts: Vec<String>,
    rng: StdRng,
}

impl FixedLayouts {
    pub fn new(layouts: Vec<String>) -> Self {
        Self {
            layouts,
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn layout(&self, level: u32) -> Result<Layout, DungeonError> {
        if self.layouts.is_empty() {
            return Err(DungeonError::InvalidLayout("no layouts supplied".to_string()));
        }
        let index = (level.max(1) as usize - 1) % self.layouts.len();
        Layout::parse(&self.layouts[index])
    }
}

impl MapBuilder for FixedLayouts {
    fn build(&mut self, level: u32) -> Result<DungeonMap, DungeonError> {
        let layout = self.layout(level)?;
        let bounds = Rect::new(0, 0, layout.grid.width(), layout.grid.height());
        let mut map = DungeonMap::new(layout.grid, vec![bounds], layout.stairs_up, layout.stairs_down)?;
        for door in layout.doors {
            map.add_door(door)?;
        }
        Ok(map)
    }

    fn populate(&mut self, map: &mut DungeonMap, level: u32) -> Result<(), DungeonError> {
        let layout = self.layout(level)?;
        let behavior = Arc::new(StandardMoveAndAttack);
        for at in layout.monsters {
            map.add_monster(kobold(level, &mut self.rng), at, behavior.clone())?;
        }
        Ok(())
    }
}
