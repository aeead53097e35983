//! Read-only snapshot of a game for rendering collaborators.
//!
//! Built from `&Game`, so producing a view can never change state. The
//! snapshot serializes to JSON for dumps and external front ends.

use serde::Serialize;

use crate::components::{ActorKind, Point, Stairs};
use crate::engine::Game;

#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    /// `' '` for unexplored cells
    pub glyph: char,
    pub explored: bool,
    pub in_fov: bool,
    pub walkable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorView {
    pub name: String,
    pub kind: ActorKind,
    pub glyph: char,
    pub position: Point,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoorView {
    pub position: Point,
    pub is_open: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub width: i32,
    pub height: i32,
    pub level: u32,
    /// Row-major
    pub cells: Vec<CellView>,
    /// Player first, then monsters currently in view
    pub actors: Vec<ActorView>,
    /// Explored doors only
    pub doors: Vec<DoorView>,
    /// Explored stairs only
    pub stairs_up: Option<Stairs>,
    pub stairs_down: Option<Stairs>,
    pub messages: Vec<String>,
}

impl MapView {
    pub fn from_game(game: &Game) -> Self {
        let map = &game.map;
        let grid = map.grid();
        let explored = |p: Point| grid.is_explored(p.x, p.y).unwrap_or(false);
        let in_fov = |p: Point| grid.is_in_fov(p.x, p.y).unwrap_or(false);

        let cells = grid
            .cells()
            .map(|cell| {
                // Actors mark their cell unwalkable; the terrain glyph ignores that
                let floor = cell.is_transparent() || map.door_at(cell.position()).is_some();
                CellView {
                    glyph: match (cell.is_explored(), floor) {
                        (false, _) => ' ',
                        (true, true) => '.',
                        (true, false) => '#',
                    },
                    explored: cell.is_explored(),
                    in_fov: cell.is_in_fov(),
                    walkable: cell.is_walkable(),
                }
            })
            .collect();

        let mut actors: Vec<ActorView> = map
            .actors()
            .iter()
            .filter(|(id, at, _)| Some(*id) == map.player() || in_fov(*at))
            .map(|(_, position, actor)| ActorView {
                name: actor.name,
                kind: actor.kind,
                glyph: actor.glyph,
                position,
                health: actor.combat.health,
                max_health: actor.combat.max_health,
            })
            .collect();
        actors.sort_by_key(|a| a.kind != ActorKind::Player);

        let doors = map
            .doors()
            .iter()
            .filter(|d| explored(d.position))
            .map(|d| DoorView {
                position: d.position,
                is_open: d.is_open,
            })
            .collect();

        MapView {
            width: grid.width(),
            height: grid.height(),
            level: game.level(),
            cells,
            actors,
            doors,
            stairs_up: Some(map.stairs_up).filter(|s| explored(s.position)),
            stairs_down: Some(map.stairs_down).filter(|s| explored(s.position)),
            messages: game.messages.lines().map(str::to_string).collect(),
        }
    }

    /// Plain-text frame: terrain, then doors, stairs and actors on top
    pub fn render_ascii(&self) -> String {
        let mut rows: Vec<Vec<char>> = self
            .cells
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|c| c.glyph).collect())
            .collect();
        let mut put = |p: Point, glyph: char| {
            if let Some(cell) = rows.get_mut(p.y as usize).and_then(|r| r.get_mut(p.x as usize)) {
                *cell = glyph;
            }
        };

        for door in &self.doors {
            put(door.position, if door.is_open { '-' } else { '+' });
        }
        for stairs in self.stairs_up.iter().chain(self.stairs_down.iter()) {
            put(stairs.position, stairs.glyph());
        }
        for actor in self.actors.iter().rev() {
            put(actor.position, actor.glyph);
        }

        let mut out = String::with_capacity(rows.len() * (self.width as usize + 1));
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::generation::FixedLayouts;

    const LEVEL: &str = "\
###########
#@....#..k#
#.....+...#
#.....#..>#
###########";

    fn game() -> Game {
        let config = GameConfig {
            seed: Some(3),
            ..Default::default()
        };
        Game::new(config, Box::new(FixedLayouts::new(vec![LEVEL.to_string()]))).unwrap()
    }

    #[test]
    fn test_hidden_monster_not_listed() {
        let game = game();
        let view = MapView::from_game(&game);
        assert_eq!(view.actors.len(), 1);
        assert_eq!(view.actors[0].kind, ActorKind::Player);
        assert_eq!(view.actors[0].position, Point::new(1, 1));
    }

    #[test]
    fn test_unexplored_cells_blank() {
        let game = game();
        let view = MapView::from_game(&game);
        let idx = |x: i32, y: i32| (y * view.width + x) as usize;
        assert_eq!(view.cells[idx(8, 2)].glyph, ' ');
        assert_eq!(view.cells[idx(2, 2)].glyph, '.');
        assert_eq!(view.cells[idx(0, 0)].glyph, '#');
        assert_eq!(view.stairs_down, None);
    }

    #[test]
    fn test_ascii_frame_shape() {
        let game = game();
        let frame = MapView::from_game(&game).render_ascii();
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.chars().count() == 11));
        assert_eq!(lines[1].chars().nth(1), Some('@'));
        assert_eq!(lines[2].chars().nth(6), Some('+'));
    }

    #[test]
    fn test_explored_stairs_drawn_under_player() {
        let game = game();
        let view = MapView::from_game(&game);
        assert_eq!(view.stairs_up.map(|s| s.glyph()), Some('<'));
        assert_eq!(view.stairs_up.map(|s| s.position), Some(Point::new(1, 1)));
        let frame = view.render_ascii();
        assert_eq!(frame.lines().nth(1).and_then(|l| l.chars().nth(1)), Some('@'));
    }

    #[test]
    fn test_view_serializes() {
        let game = game();
        let json = serde_json::to_string(&MapView::from_game(&game)).unwrap();
        assert!(json.contains("\"level\":1"));
    }
}
