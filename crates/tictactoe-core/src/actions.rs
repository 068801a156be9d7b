//! Actions a caller can apply to a game and the events they produce.
//!
//! `Game::mark_cell` and `Game::undo` are the primary API. This module
//! adds a data-driven layer on top of them so that hosts and bindings can
//! pass moves around as values (JSON, channels) and react to events.

use crate::coord::Coordinate;
use crate::player::Player;
use serde::{Deserialize, Serialize};

/// All possible actions on a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Mark a cell for the player whose turn it is
    Mark(Coordinate),
    /// Take back the most recent move
    Undo,
}

/// A single move: who marked which cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub player: Player,
    pub coordinate: Coordinate,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A cell was marked
    CellMarked {
        player: Player,
        coordinate: Coordinate,
    },

    /// A move was taken back
    MoveUndone {
        player: Player,
        coordinate: Coordinate,
    },

    /// A player completed a line
    GameWon {
        winner: Player,
        line: [Coordinate; 3],
    },

    /// The board filled up without a winner
    GameDrawn,
}
