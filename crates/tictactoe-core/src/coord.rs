//! Board coordinates using (row, column) pairs.
//!
//! Coordinates are plain values and may hold any integers, including
//! negative ones. They are only checked against the grid bounds where
//! they are used, so that callers can hand in raw input and get a
//! typed `OutOfBounds` failure back instead of a panic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows (and columns) on the board
pub const GRID_SIZE: i32 = 3;

/// Number of cells on the board
pub const CELL_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// A (row, column) position.
///
/// - `row` increases going down
/// - `column` increases going right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Coordinate {
    /// Row index (0 is the top row)
    pub row: i32,
    /// Column index (0 is the left column)
    pub column: i32,
}

impl Coordinate {
    /// Create a new coordinate
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Whether both axes fall inside `[0, GRID_SIZE)`
    pub const fn is_in_bounds(&self) -> bool {
        self.row >= 0 && self.row < GRID_SIZE && self.column >= 0 && self.column < GRID_SIZE
    }

    /// Row-major index into a flat cell array, if in bounds
    pub(crate) fn index(&self) -> Option<usize> {
        if self.is_in_bounds() {
            Some((self.row * GRID_SIZE + self.column) as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Coordinate::index`]
    pub(crate) const fn from_index(index: usize) -> Self {
        let index = index as i32;
        Self::new(index / GRID_SIZE, index % GRID_SIZE)
    }

    /// All in-bounds coordinates in row-major order
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..CELL_COUNT).map(Coordinate::from_index)
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((row, column): (i32, i32)) -> Self {
        Self::new(row, column)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}
