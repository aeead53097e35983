//! Grid state - per-cell terrain flags and the player's field of view.
//!
//! Exploration is monotonic: once a cell is explored it stays explored for
//! the lifetime of the grid. The in-FOV flag is transient and fully
//! recomputed by every [`Grid::compute_field_of_view`] call.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::Point;
use crate::error::DungeonError;
use crate::systems::fov;

/// One grid position. Coordinates are fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    x: i32,
    y: i32,
    walkable: bool,
    transparent: bool,
    explored: bool,
    in_fov: bool,
}

impl Cell {
    pub fn x(&self) -> i32 {
        self.x
    }
    pub fn y(&self) -> i32 {
        self.y
    }
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
    pub fn is_walkable(&self) -> bool {
        self.walkable
    }
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
    pub fn is_explored(&self) -> bool {
        self.explored
    }
    pub fn is_in_fov(&self) -> bool {
        self.in_fov
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid of solid rock: nothing walkable, nothing transparent
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| Cell {
                    x,
                    y,
                    walkable: false,
                    transparent: false,
                    explored: false,
                    in_fov: false,
                })
            })
            .collect();
        Self { width, height, cells }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, DungeonError> {
        if self.in_bounds(x, y) {
            Ok((y * self.width + x) as usize)
        } else {
            Err(DungeonError::OutOfBounds { x, y })
        }
    }

    pub fn cell(&self, x: i32, y: i32) -> Result<&Cell, DungeonError> {
        let idx = self.index(x, y)?;
        Ok(&self.cells[idx])
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Result<&mut Cell, DungeonError> {
        let idx = self.index(x, y)?;
        Ok(&mut self.cells[idx])
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> Result<bool, DungeonError> {
        Ok(self.cell(x, y)?.walkable)
    }

    pub fn is_transparent(&self, x: i32, y: i32) -> Result<bool, DungeonError> {
        Ok(self.cell(x, y)?.transparent)
    }

    pub fn is_explored(&self, x: i32, y: i32) -> Result<bool, DungeonError> {
        Ok(self.cell(x, y)?.explored)
    }

    pub fn is_in_fov(&self, x: i32, y: i32) -> Result<bool, DungeonError> {
        Ok(self.cell(x, y)?.in_fov)
    }

    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) -> Result<(), DungeonError> {
        self.cell_mut(x, y)?.walkable = walkable;
        Ok(())
    }

    pub fn set_transparent(&mut self, x: i32, y: i32, transparent: bool) -> Result<(), DungeonError> {
        self.cell_mut(x, y)?.transparent = transparent;
        Ok(())
    }

    /// Carve or fill terrain in one call (map builders)
    pub fn set_cell_properties(
        &mut self,
        x: i32,
        y: i32,
        transparent: bool,
        walkable: bool,
    ) -> Result<(), DungeonError> {
        let cell = self.cell_mut(x, y)?;
        cell.transparent = transparent;
        cell.walkable = walkable;
        Ok(())
    }

    /// Recompute the field of view from `(origin_x, origin_y)`.
    ///
    /// Clears every in-FOV flag, then marks the visible set as in-FOV and
    /// explored. Returns the visible set.
    pub fn compute_field_of_view(
        &mut self,
        origin_x: i32,
        origin_y: i32,
        radius: u32,
    ) -> Result<BTreeSet<Point>, DungeonError> {
        self.index(origin_x, origin_y)?;

        let visible = fov::visible_cells(self, Point::new(origin_x, origin_y), radius);

        for cell in &mut self.cells {
            cell.in_fov = false;
        }
        for p in &visible {
            let idx = (p.y * self.width + p.x) as usize;
            let cell = &mut self.cells[idx];
            cell.in_fov = true;
            cell.explored = true;
        }

        log::debug!(
            "FOV from ({}, {}) radius {}: {} cells visible",
            origin_x,
            origin_y,
            radius,
            visible.len()
        );
        Ok(visible)
    }

    pub fn explored_count(&self) -> usize {
        self.cells.iter().filter(|c| c.explored).count()
    }
}
