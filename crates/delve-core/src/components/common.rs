//! Geometry shared by the grid, actors and generation.

use serde::{Deserialize, Serialize};

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring point one step in `direction`
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four movement directions. Screen coordinates: y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Axis-aligned rectangle in cell units (a room footprint, walls included)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> i32 {
        self.x
    }
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }
    pub fn top(&self) -> i32 {
        self.y
    }
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Overlap test, touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Cells strictly inside the outer wall ring
    pub fn interior(&self) -> impl Iterator<Item = Point> + '_ {
        (self.top() + 1..self.bottom())
            .flat_map(move |y| (self.left() + 1..self.right()).map(move |x| Point::new(x, y)))
    }

    /// Cells on the outer wall ring
    pub fn boundary(&self) -> Vec<Point> {
        let mut cells = Vec::with_capacity((2 * (self.width + self.height)) as usize);
        for x in self.left()..=self.right() {
            cells.push(Point::new(x, self.top()));
            cells.push(Point::new(x, self.bottom()));
        }
        for y in self.top() + 1..self.bottom() {
            cells.push(Point::new(self.left(), y));
            cells.push(Point::new(self.right(), y));
        }
        cells
    }
}
