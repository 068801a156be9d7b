//! Core game state machine.
//!
//! `Game` wraps a `Grid` with turn tracking and an undo history. It is an
//! immutable value: every operation that looks like a mutation returns a new
//! `Game` and leaves the receiver as it was. The caller decides when to swap
//! in the result.

use crate::actions::{GameAction, GameEvent, Move};
use crate::coord::Coordinate;
use crate::grid::{Cell, Grid, GridError};
use crate::player::Player;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Derived outcome of a game, computed from the grid on every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    InProgress,
    Victory(Player),
    Draw,
}

impl GameState {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, GameState::InProgress)
    }

    /// Victory or draw
    pub fn is_terminal(&self) -> bool {
        !self.is_in_progress()
    }

    pub fn winner(&self) -> Option<Player> {
        match self {
            GameState::Victory(winner) => Some(*winner),
            _ => None,
        }
    }
}

/// Errors from [`Game::mark_cell`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MarkError {
    #[error("Cell is already occupied")]
    OccupiedCell,

    #[error("Coordinate is outside the grid")]
    OutOfBounds,

    #[error("Game is over")]
    GameOver,
}

impl From<GridError> for MarkError {
    fn from(error: GridError) -> Self {
        match error {
            GridError::OccupiedCell => MarkError::OccupiedCell,
            GridError::OutOfBounds => MarkError::OutOfBounds,
            GridError::GameOver => MarkError::GameOver,
        }
    }
}

/// Errors from [`Game::undo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UndoError {
    #[error("No moves to undo")]
    NoMovesToUndo,

    #[error("Game is over")]
    GameOver,
}

/// Errors from [`Game::apply_action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Mark rejected: {0}")]
    Mark(#[from] MarkError),

    #[error("Undo rejected: {0}")]
    Undo(#[from] UndoError),
}

/// A successful mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOutcome {
    /// The player who made the move
    pub mover: Player,
    /// The game after the move
    pub game: Game,
}

pub type MarkResult = Result<MarkOutcome, MarkError>;

pub type UndoResult = Result<Game, UndoError>;

/// Reasons a decoded [`Game`] is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidGame {
    #[error("History entry {turn} is not a legal move from the previous grid")]
    BrokenHistory { turn: usize },

    #[error("Grid does not match the last history entry")]
    GridMismatch,

    #[error("Current player is {found}, expected {expected}")]
    WrongCurrentPlayer { expected: Player, found: Player },
}

/// A game of tic-tac-toe
///
/// Decoding replays the history, so only games reachable by legal moves
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameRepr")]
pub struct Game {
    current_player: Player,
    grid: Grid,
    /// Grid after each successful mark, oldest first
    history: Vec<Grid>,
}

/// Wire form of [`Game`] before validation
#[derive(Deserialize)]
struct GameRepr {
    current_player: Player,
    grid: Grid,
    history: Vec<Grid>,
}

impl TryFrom<GameRepr> for Game {
    type Error = InvalidGame;

    fn try_from(repr: GameRepr) -> Result<Self, Self::Error> {
        let mut game = Game::new();

        for (turn, snapshot) in repr.history.iter().enumerate() {
            let broken = InvalidGame::BrokenHistory { turn };
            let cell = snapshot.added_since(&game.grid).ok_or(broken)?;
            game = game.mark_cell(cell.coordinate).map_err(|_| broken)?.game;
            // Catches a mark by the wrong player
            if game.grid != *snapshot {
                return Err(broken);
            }
        }

        if game.grid != repr.grid {
            return Err(InvalidGame::GridMismatch);
        }
        if game.current_player != repr.current_player {
            return Err(InvalidGame::WrongCurrentPlayer {
                expected: game.current_player,
                found: repr.current_player,
            });
        }

        Ok(game)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A fresh game: empty grid, `X` to move, no history
    pub fn new() -> Self {
        Self {
            current_player: Player::X,
            grid: Grid::new(),
            history: Vec::new(),
        }
    }

    /// Whose turn it is, or the last mover once the game is over
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Grid snapshots after each move, oldest first
    pub fn history(&self) -> &[Grid] {
        &self.history
    }

    /// Number of moves made since the game started
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn state(&self) -> GameState {
        match self.grid.winner() {
            Some(winner) => GameState::Victory(winner),
            None if self.grid.is_draw() => GameState::Draw,
            None => GameState::InProgress,
        }
    }

    /// All cells in row-major order
    pub fn cells(&self) -> Vec<Cell> {
        self.grid.cells()
    }

    pub fn empty_cells(&self) -> Vec<Cell> {
        self.grid.empty_cells()
    }

    /// The occupant at `coordinate`.
    ///
    /// # Panics
    ///
    /// Panics if `coordinate` is outside the grid.
    pub fn player_at(&self, coordinate: Coordinate) -> Option<Player> {
        self.grid.cell_at(coordinate).occupant
    }

    /// Mark `coordinate` for the current player.
    ///
    /// The turn passes to the opponent only while the game stays in
    /// progress; the move that wins or fills the board leaves its mover as
    /// `current_player`.
    pub fn mark_cell(&self, coordinate: Coordinate) -> MarkResult {
        let mover = self.current_player;
        let grid = self.grid.mark_cell(mover, coordinate)?;

        let current_player = if grid.is_in_progress() {
            mover.opponent()
        } else {
            mover
        };

        let mut history = Vec::with_capacity(self.history.len() + 1);
        history.extend_from_slice(&self.history);
        history.push(grid);

        Ok(MarkOutcome {
            mover,
            game: Game {
                current_player,
                grid,
                history,
            },
        })
    }

    /// Take back the most recent move. Finished games cannot be undone.
    pub fn undo(&self) -> UndoResult {
        let Some((_, earlier)) = self.history.split_last() else {
            return Err(UndoError::NoMovesToUndo);
        };

        if self.state().is_terminal() {
            return Err(UndoError::GameOver);
        }

        Ok(Game {
            current_player: self.current_player.opponent(),
            grid: earlier.last().copied().unwrap_or_default(),
            history: earlier.to_vec(),
        })
    }

    /// The move made at 0-based turn `turn_index`
    pub fn move_at(&self, turn_index: usize) -> Option<Move> {
        let after = self.history.get(turn_index)?;
        let before = match turn_index {
            0 => Grid::new(),
            _ => self.history[turn_index - 1],
        };

        let cell = after.added_since(&before)?;
        cell.occupant.map(|player| Move {
            player,
            coordinate: cell.coordinate,
        })
    }

    /// Every move so far, oldest first
    pub fn moves(&self) -> Vec<Move> {
        (0..self.history.len())
            .filter_map(|turn| self.move_at(turn))
            .collect()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history
            .len()
            .checked_sub(1)
            .and_then(|turn| self.move_at(turn))
    }

    /// Apply an action, returning the new game and the events it caused
    pub fn apply_action(&self, action: GameAction) -> Result<(Game, Vec<GameEvent>), GameError> {
        let mut events = Vec::new();

        let game = match action {
            GameAction::Mark(coordinate) => {
                let outcome = self.mark_cell(coordinate)?;
                events.push(GameEvent::CellMarked {
                    player: outcome.mover,
                    coordinate,
                });

                match outcome.game.state() {
                    GameState::Victory(winner) => {
                        if let Some(line) = outcome.game.grid.winning_line() {
                            events.push(GameEvent::GameWon { winner, line });
                        }
                    }
                    GameState::Draw => events.push(GameEvent::GameDrawn),
                    GameState::InProgress => {}
                }

                outcome.game
            }

            GameAction::Undo => {
                let undone = self.last_move();
                let game = self.undo()?;
                if let Some(Move { player, coordinate }) = undone {
                    events.push(GameEvent::MoveUndone { player, coordinate });
                }
                game
            }
        };

        Ok((game, events))
    }

    /// JSON-friendly view of the game for bindings and hosts
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state(),
            current_player: self.current_player,
            cells: self.cells(),
            move_count: self.move_count(),
            winning_line: self.grid.winning_line(),
        }
    }
}

/// Serializable summary of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub state: GameState,
    pub current_player: Player,
    /// Row-major, nine entries
    pub cells: Vec<Cell>,
    pub move_count: usize,
    pub winning_line: Option<[Coordinate; 3]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn play(moves: &[(i32, i32)]) -> Game {
        moves.iter().fold(Game::new(), |game, &coord| {
            game.mark_cell(coord.into()).unwrap().game
        })
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.current_player(), Player::X);
        assert_eq!(game.state(), GameState::InProgress);
        assert_eq!(game.move_count(), 0);
        assert_eq!(game.player_at(Coordinate::new(0, 0)), None);
    }

    #[test]
    fn test_mark_flips_turn() {
        let outcome = Game::new().mark_cell(Coordinate::new(0, 0)).unwrap();
        assert_eq!(outcome.mover, Player::X);
        assert_eq!(outcome.game.current_player(), Player::O);
        assert_eq!(outcome.game.player_at(Coordinate::new(0, 0)), Some(Player::X));
        assert_eq!(outcome.game.history().len(), 1);
    }

    #[test]
    fn test_failed_mark_leaves_game_unchanged() {
        let game = play(&[(0, 0)]);
        let before = game.clone();
        assert_eq!(
            game.mark_cell(Coordinate::new(0, 0)),
            Err(MarkError::OccupiedCell)
        );
        assert_eq!(
            game.mark_cell(Coordinate::new(-1, 0)),
            Err(MarkError::OutOfBounds)
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_winner_stays_current_player() {
        let game = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(game.state(), GameState::Victory(Player::X));
        assert_eq!(game.current_player(), Player::X);
    }

    #[test]
    fn test_draw_keeps_last_mover() {
        let game = play(&[
            (0, 1),
            (0, 0),
            (1, 1),
            (0, 2),
            (1, 2),
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
        ]);
        assert_eq!(game.state(), GameState::Draw);
        assert_eq!(game.current_player(), Player::X);
    }

    #[test]
    fn test_undo_first_move_restores_fresh_game() {
        let game = play(&[(1, 1)]);
        assert_eq!(game.undo().unwrap(), Game::new());
    }

    #[test]
    fn test_undo_restores_previous_grid() {
        let two = play(&[(1, 1), (0, 0)]);
        let three = two.mark_cell(Coordinate::new(2, 2)).unwrap().game;
        let undone = three.undo().unwrap();
        assert_eq!(undone, two);
        assert_eq!(undone.current_player(), Player::X);
    }

    #[test]
    fn test_undo_errors() {
        assert_eq!(Game::new().undo(), Err(UndoError::NoMovesToUndo));

        let won = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(won.undo(), Err(UndoError::GameOver));
    }

    #[test]
    fn test_move_history() {
        let game = play(&[(1, 1), (0, 2), (2, 0)]);
        assert_eq!(
            game.moves(),
            vec![
                Move { player: Player::X, coordinate: Coordinate::new(1, 1) },
                Move { player: Player::O, coordinate: Coordinate::new(0, 2) },
                Move { player: Player::X, coordinate: Coordinate::new(2, 0) },
            ]
        );
        assert_eq!(game.move_at(3), None);
        assert_eq!(
            game.last_move(),
            Some(Move { player: Player::X, coordinate: Coordinate::new(2, 0) })
        );
        assert_eq!(Game::new().last_move(), None);
    }

    #[test]
    fn test_apply_action_events() {
        let game = play(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let (won, events) = game
            .apply_action(GameAction::Mark(Coordinate::new(0, 2)))
            .unwrap();

        assert_eq!(won.state(), GameState::Victory(Player::X));
        assert_eq!(
            events,
            vec![
                GameEvent::CellMarked { player: Player::X, coordinate: Coordinate::new(0, 2) },
                GameEvent::GameWon {
                    winner: Player::X,
                    line: [Coordinate::new(0, 0), Coordinate::new(0, 1), Coordinate::new(0, 2)],
                },
            ]
        );

        let (undone, events) = game.apply_action(GameAction::Undo).unwrap();
        assert_eq!(undone.move_count(), 3);
        assert_eq!(
            events,
            vec![GameEvent::MoveUndone { player: Player::O, coordinate: Coordinate::new(1, 1) }]
        );
    }

    #[test]
    fn test_apply_action_errors() {
        assert_eq!(
            Game::new().apply_action(GameAction::Undo),
            Err(GameError::Undo(UndoError::NoMovesToUndo))
        );
        assert_eq!(
            Game::new().apply_action(GameAction::Mark(Coordinate::new(0, 9))),
            Err(GameError::Mark(MarkError::OutOfBounds))
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = play(&[(0, 0)]);
        let snapshot = game.snapshot();
        assert_eq!(snapshot.cells.len(), 9);
        assert_eq!(snapshot.move_count, 1);
        assert_eq!(snapshot.winning_line, None);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    fn decode(value: serde_json::Value) -> Result<Game, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_decode_accepts_played_game() {
        let game = play(&[(1, 1), (0, 0), (2, 2)]);
        let back = decode(serde_json::to_value(&game).unwrap()).unwrap();
        assert_eq!(back, game);
    }

    #[test]
    fn test_decode_rejects_grid_without_history() {
        let err = decode(serde_json::json!({
            "current_player": "O",
            "grid": { "occupants": ["X", "X", "X", "O", "O", null, null, null, null] },
            "history": [],
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Grid does not match"));
    }

    #[test]
    fn test_decode_rejects_o_opening() {
        let opened_by_o = serde_json::json!({
            "occupants": ["O", null, null, null, null, null, null, null, null]
        });
        let err = decode(serde_json::json!({
            "current_player": "X",
            "grid": opened_by_o,
            "history": [opened_by_o],
        }))
        .unwrap_err();
        assert!(err.to_string().contains("History entry 0"));
    }

    #[test]
    fn test_decode_rejects_skipped_move() {
        let mut value = serde_json::to_value(play(&[(0, 0), (1, 1), (2, 2)])).unwrap();
        value["history"].as_array_mut().unwrap().remove(1);
        let err = decode(value).unwrap_err();
        assert!(err.to_string().contains("History entry 1"));
    }

    #[test]
    fn test_decode_rejects_move_after_win() {
        let won = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        let mut value = serde_json::to_value(&won).unwrap();
        let mut extra = value["grid"].clone();
        extra["occupants"][8] = serde_json::json!("O");
        value["history"].as_array_mut().unwrap().push(extra.clone());
        value["grid"] = extra;
        value["current_player"] = serde_json::json!("O");

        let err = decode(value).unwrap_err();
        assert!(err.to_string().contains("History entry 5"));
    }

    #[test]
    fn test_decode_rejects_wrong_current_player() {
        let mut value = serde_json::to_value(play(&[(1, 1)])).unwrap();
        value["current_player"] = serde_json::json!("X");
        let err = decode(value).unwrap_err();
        assert!(err.to_string().contains("Current player is X, expected O"));
    }

    #[test]
    #[should_panic]
    fn test_player_at_out_of_bounds_panics() {
        Game::new().player_at(Coordinate::new(0, 3));
    }
}
