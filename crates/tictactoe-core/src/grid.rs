//! The 3x3 board.
//!
//! This module contains:
//! - `Cell`: one board position and its occupant
//! - `Grid`: the immutable collection of all nine cells
//! - Placement validation and win/draw detection
//!
//! A `Grid` is a plain `Copy` value. Marking a cell returns a new grid and
//! never touches the receiver, which is what lets `Game` keep whole grids
//! in its undo history.

use crate::coord::{Coordinate, CELL_COUNT};
use crate::player::Player;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The eight lines that win the game when uniformly occupied.
///
/// Order is fixed: rows top to bottom, columns left to right, then the
/// main diagonal and the anti-diagonal.
pub const WINNING_LINES: [[Coordinate; 3]; 8] = [
    // Rows
    [Coordinate::new(0, 0), Coordinate::new(0, 1), Coordinate::new(0, 2)],
    [Coordinate::new(1, 0), Coordinate::new(1, 1), Coordinate::new(1, 2)],
    [Coordinate::new(2, 0), Coordinate::new(2, 1), Coordinate::new(2, 2)],
    // Columns
    [Coordinate::new(0, 0), Coordinate::new(1, 0), Coordinate::new(2, 0)],
    [Coordinate::new(0, 1), Coordinate::new(1, 1), Coordinate::new(2, 1)],
    [Coordinate::new(0, 2), Coordinate::new(1, 2), Coordinate::new(2, 2)],
    // Diagonals
    [Coordinate::new(0, 0), Coordinate::new(1, 1), Coordinate::new(2, 2)],
    [Coordinate::new(0, 2), Coordinate::new(1, 1), Coordinate::new(2, 0)],
];

/// Reasons a grid refuses a mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GridError {
    #[error("Cell is already occupied")]
    OccupiedCell,

    #[error("Coordinate is outside the grid")]
    OutOfBounds,

    #[error("Game is over")]
    GameOver,
}

/// A single board position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub coordinate: Coordinate,
    /// `None` while the cell is empty
    pub occupant: Option<Player>,
}

impl Cell {
    /// An unoccupied cell at `coordinate`
    pub const fn empty(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            occupant: None,
        }
    }

    /// A copy of this cell occupied by `player`
    pub const fn marked(self, player: Player) -> Self {
        Self {
            coordinate: self.coordinate,
            occupant: Some(player),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// The 3x3 board, stored row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Grid {
    occupants: [Option<Player>; CELL_COUNT],
}

impl Grid {
    /// An empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell at `coordinate`.
    ///
    /// # Panics
    ///
    /// Panics if `coordinate` is outside the grid. Use [`Grid::get_cell`]
    /// for unvalidated input.
    pub fn cell_at(&self, coordinate: Coordinate) -> Cell {
        match self.get_cell(coordinate) {
            Some(cell) => cell,
            None => panic!("Invalid cell coordinate: {}", coordinate),
        }
    }

    /// The cell at `coordinate`, or `None` if it is outside the grid
    pub fn get_cell(&self, coordinate: Coordinate) -> Option<Cell> {
        coordinate.index().map(|index| Cell {
            coordinate,
            occupant: self.occupants[index],
        })
    }

    /// Place `player` at `coordinate`, returning the resulting grid.
    ///
    /// Checks run in a fixed order: a finished grid reports `GameOver`
    /// before the coordinate is looked at, and bounds are checked before
    /// occupancy.
    pub fn mark_cell(&self, player: Player, coordinate: Coordinate) -> Result<Grid, GridError> {
        if !self.is_in_progress() {
            return Err(GridError::GameOver);
        }

        let index = coordinate.index().ok_or(GridError::OutOfBounds)?;

        if self.occupants[index].is_some() {
            return Err(GridError::OccupiedCell);
        }

        let mut occupants = self.occupants;
        occupants[index] = Some(player);
        Ok(Grid { occupants })
    }

    /// The first complete line in [`WINNING_LINES`] order
    pub fn winning_line(&self) -> Option<[Coordinate; 3]> {
        WINNING_LINES.iter().copied().find(|&line| {
            let [a, b, c] = line.map(|coord| self.occupant(coord));
            a.is_some() && a == b && b == c
        })
    }

    /// The player owning a complete line, if any
    pub fn winner(&self) -> Option<Player> {
        self.winning_line().and_then(|[first, _, _]| self.occupant(first))
    }

    /// Whether every cell holds a mark
    pub fn is_full(&self) -> bool {
        self.occupants.iter().all(Option::is_some)
    }

    /// Full board with no winner
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    /// Neither won nor drawn
    pub fn is_in_progress(&self) -> bool {
        self.winner().is_none() && !self.is_full()
    }

    /// Number of occupied cells
    pub fn marked_count(&self) -> usize {
        self.occupants.iter().filter(|o| o.is_some()).count()
    }

    /// All nine cells in row-major order
    pub fn cells(&self) -> Vec<Cell> {
        Coordinate::all().map(|coord| self.cell_at(coord)).collect()
    }

    /// Unoccupied cells, in the same relative order as [`Grid::cells`]
    pub fn empty_cells(&self) -> Vec<Cell> {
        self.cells().into_iter().filter(Cell::is_empty).collect()
    }

    /// The single cell that is occupied here but empty in `previous`.
    ///
    /// Returns `None` unless exactly one cell differs in that way.
    pub(crate) fn added_since(&self, previous: &Grid) -> Option<Cell> {
        let mut added = self
            .cells()
            .into_iter()
            .zip(previous.occupants.iter())
            .filter(|(cell, before)| cell.occupant.is_some() && before.is_none());

        match (added.next(), added.next()) {
            (Some((cell, _)), None) => Some(cell),
            _ => None,
        }
    }

    fn occupant(&self, coordinate: Coordinate) -> Option<Player> {
        coordinate.index().and_then(|index| self.occupants[index])
    }
}
