//! Recursive shadow-casting field of view.
//!
//! A pure function of (grid transparency, origin, radius). Opaque cells are
//! themselves visible but shadow everything behind them. The origin is
//! always visible. Cells are inside the radius when `dx² + dy² <= r²`.

use std::collections::BTreeSet;

use crate::components::Point;
use crate::grid::Grid;

/// Octant transforms (xx, xy, yx, yy)
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

/// Every cell visible from `origin` within `radius`. Empty when the origin
/// is outside the grid.
pub fn visible_cells(grid: &Grid, origin: Point, radius: u32) -> BTreeSet<Point> {
    let mut visible = BTreeSet::new();
    if !grid.in_bounds(origin.x, origin.y) {
        return visible;
    }
    visible.insert(origin);

    // No cell is farther than width + height from an in-bounds origin
    let reach = (grid.width() + grid.height()).max(0) as u32;
    let radius = radius.min(reach) as i32;
    for &octant in OCTANTS.iter() {
        cast_light(grid, origin, 1, 1.0, 0.0, radius, octant, &mut visible);
    }
    visible
}

fn is_opaque(grid: &Grid, x: i32, y: i32) -> bool {
    grid.cell(x, y).map(|c| !c.is_transparent()).unwrap_or(true)
}

#[allow(clippy::too_many_arguments)]
fn cast_light(
    grid: &Grid,
    origin: Point,
    row: i32,
    mut start: f64,
    end: f64,
    radius: i32,
    (xx, xy, yx, yy): (i32, i32, i32, i32),
    visible: &mut BTreeSet<Point>,
) {
    if start < end {
        return;
    }
    let radius_sq = i64::from(radius) * i64::from(radius);
    let mut new_start = 0.0;

    for j in row..=radius {
        let dy = -j;
        let mut dx = -j - 1;
        let mut blocked = false;

        while dx <= 0 {
            dx += 1;
            let x = origin.x + dx * xx + dy * xy;
            let y = origin.y + dx * yx + dy * yy;
            let l_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
            let r_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

            if start < r_slope {
                continue;
            } else if end > l_slope {
                break;
            }

            if i64::from(dx * dx + dy * dy) <= radius_sq && grid.in_bounds(x, y) {
                visible.insert(Point::new(x, y));
            }

            let opaque = is_opaque(grid, x, y);
            if blocked {
                if opaque {
                    new_start = r_slope;
                    continue;
                }
                blocked = false;
                start = new_start;
            } else if opaque && j < radius {
                // Scan the lit part of the next row, then keep looking past the wall
                blocked = true;
                cast_light(grid, origin, j + 1, start, l_slope, radius, (xx, xy, yx, yy), visible);
                new_start = r_slope;
            }
        }

        if blocked {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: i32, height: i32) -> Grid {
        let mut grid = Grid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.set_cell_properties(x, y, true, true).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_origin_always_visible() {
        let grid = open_grid(5, 5);
        let visible = visible_cells(&grid, Point::new(2, 2), 0);
        assert_eq!(visible.len(), 1);
        assert!(visible.contains(&Point::new(2, 2)));
    }

    #[test]
    fn test_radius_is_circular() {
        let grid = open_grid(21, 21);
        let visible = visible_cells(&grid, Point::new(10, 10), 5);

        assert!(visible.contains(&Point::new(15, 10)));
        assert!(!visible.contains(&Point::new(16, 10)));
        assert!(visible.contains(&Point::new(14, 13)));
        assert!(!visible.contains(&Point::new(14, 14)));
        assert!(visible.contains(&Point::new(5, 10)));
        assert!(visible.contains(&Point::new(10, 5)));
    }

    #[test]
    fn test_open_area_sees_whole_disc() {
        let grid = open_grid(21, 21);
        let visible = visible_cells(&grid, Point::new(10, 10), 4);
        let disc = (0..21)
            .flat_map(|y| (0..21).map(move |x| Point::new(x, y)))
            .filter(|p| {
                let (dx, dy) = (p.x - 10, p.y - 10);
                dx * dx + dy * dy <= 16
            })
            .count();
        assert_eq!(visible.len(), disc);
    }

    #[test]
    fn test_wall_is_visible_but_casts_shadow() {
        let mut grid = open_grid(21, 21);
        grid.set_transparent(12, 10, false).unwrap();

        let visible = visible_cells(&grid, Point::new(10, 10), 8);
        assert!(visible.contains(&Point::new(12, 10)));
        assert!(!visible.contains(&Point::new(13, 10)));
        assert!(!visible.contains(&Point::new(16, 10)));
        assert!(visible.contains(&Point::new(10, 16)));
    }

    #[test]
    fn test_closed_room_hides_outside() {
        let mut grid = Grid::new(12, 7);
        for y in 1..6 {
            for x in 1..6 {
                grid.set_cell_properties(x, y, true, true).unwrap();
            }
            for x in 7..11 {
                grid.set_cell_properties(x, y, true, true).unwrap();
            }
        }

        let visible = visible_cells(&grid, Point::new(3, 3), 20);
        assert!(visible.contains(&Point::new(6, 3)));
        assert!(!visible.contains(&Point::new(8, 3)));
        assert!(visible.iter().all(|p| p.x <= 6));
    }

    #[test]
    fn test_origin_out_of_bounds_sees_nothing() {
        let grid = open_grid(5, 5);
        assert!(visible_cells(&grid, Point::new(-1, 2), 5).is_empty());
    }

    #[test]
    fn test_huge_radius_sees_whole_open_grid() {
        let grid = open_grid(9, 7);
        let visible = visible_cells(&grid, Point::new(4, 3), u32::MAX);
        assert_eq!(visible.len(), 9 * 7);
    }

    #[test]
    fn test_same_inputs_same_set() {
        let mut grid = open_grid(30, 30);
        for i in 0..30 {
            if i % 3 == 0 {
                grid.set_transparent(i, (i * 7) % 30, false).unwrap();
            }
        }
        let a = visible_cells(&grid, Point::new(14, 14), 10);
        let b = visible_cells(&grid, Point::new(14, 14), 10);
        assert_eq!(a, b);
    }
}
