use std::fmt;

use serde::{Deserialize, Serialize};

pub mod agent;
pub mod environment;
pub mod error;
pub mod map;
pub mod search;
pub mod simulation;
pub mod tracker;

/// Identifying label printed on a task cell.
pub type TaskLabel = u32;

/// Represents a 2D grid coordinate.
///
/// Coordinates are signed so that stepping off the edge of the grid yields a
/// cell that is simply out of bounds rather than an overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub column: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Returns manhattan distance between two cells
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// The neighbouring cell one step in `direction`.
    pub fn step(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(self.column + dx, self.row + dy)
    }

    /// True if `other` is exactly one 4-connected step away.
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// The four grid directions an agent can move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Expansion order used by every search. Changing it changes tie-breaks.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// `(dcolumn, drow)` for a single step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }
}

/// The search strategy an agent plans with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Ucs,
    #[default]
    AStar,
}

impl Algorithm {
    /// The other algorithm.
    pub fn toggled(self) -> Self {
        match self {
            Algorithm::Ucs => Algorithm::AStar,
            Algorithm::AStar => Algorithm::Ucs,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Ucs => f.write_str("UCS"),
            Algorithm::AStar => f.write_str("A*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Cell::new(-2, 3);
        let b = Cell::new(4, -1);
        assert_eq!(a.manhattan_distance(b), 10);
        assert_eq!(b.manhattan_distance(a), 10);
        assert_eq!(a.manhattan_distance(a), 0);
    }

    #[test]
    fn steps_follow_direction_deltas() {
        let origin = Cell::new(0, 0);
        assert_eq!(origin.step(Direction::Right), Cell::new(1, 0));
        assert_eq!(origin.step(Direction::Down), Cell::new(0, 1));
        assert_eq!(origin.step(Direction::Left), Cell::new(-1, 0));
        assert_eq!(origin.step(Direction::Up), Cell::new(0, -1));
        for direction in Direction::ALL {
            assert!(origin.is_adjacent(origin.step(direction)));
        }
    }

    #[test]
    fn algorithm_toggles_between_both_variants() {
        assert_eq!(Algorithm::Ucs.toggled(), Algorithm::AStar);
        assert_eq!(Algorithm::AStar.toggled(), Algorithm::Ucs);
        assert_eq!(Algorithm::default(), Algorithm::AStar);
        assert_eq!(Algorithm::AStar.to_string(), "A*");
    }
}
