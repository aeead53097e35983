//! Static map features: doors and stairs.

use serde::{Deserialize, Serialize};

use super::Point;

/// A door on the map. Doors start closed and never re-close once opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub position: Point,
    pub is_open: bool,
}

impl Door {
    pub fn closed(position: Point) -> Self {
        Self {
            position,
            is_open: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StairsKind {
    Up,
    Down,
}

/// Fixed level-transition marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub position: Point,
    pub kind: StairsKind,
}

impl Stairs {
    pub fn up(position: Point) -> Self {
        Self {
            position,
            kind: StairsKind::Up,
        }
    }

    pub fn down(position: Point) -> Self {
        Self {
            position,
            kind: StairsKind::Down,
        }
    }

    pub fn glyph(&self) -> char {
        match self.kind {
            StairsKind::Up => '<',
            StairsKind::Down => '>',
        }
    }
}
