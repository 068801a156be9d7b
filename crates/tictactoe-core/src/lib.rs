//! Rules engine for 3x3 tic-tac-toe.
//!
//! This crate provides the core game logic, including:
//! - Coordinates and player identities
//! - An immutable grid with placement validation and win/draw detection
//! - The game state machine with turn order and undo history
//! - A random-move computer opponent
//!
//! # Architecture
//!
//! Every type here is an immutable value. Operations that would change a
//! game return a new one inside a `Result`, so a host only has to hold the
//! current `Game` and replace it after each successful call. Nothing in the
//! engine does I/O or keeps shared state, which keeps it usable from a
//! native host as well as from WebAssembly (`wasm` feature).
//!
//! # Modules
//!
//! - [`coord`]: Board coordinates and bounds
//! - [`player`]: The two player identities
//! - [`grid`]: Cells and the board
//! - [`game`]: Turns, history, undo and derived state
//! - [`actions`]: Action/event values for hosts
//! - [`bot`]: Computer opponents

pub mod actions;
pub mod bot;
pub mod coord;
pub mod game;
pub mod grid;
pub mod player;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, Move};
pub use bot::{Agent, AgentError, AgentResult, RandomAgent};
pub use coord::{Coordinate, CELL_COUNT, GRID_SIZE};
pub use game::{
    Game, GameError, GameSnapshot, GameState, InvalidGame, MarkError, MarkOutcome, MarkResult,
    UndoError, UndoResult,
};
pub use grid::{Cell, Grid, GridError, WINNING_LINES};
pub use player::Player;
