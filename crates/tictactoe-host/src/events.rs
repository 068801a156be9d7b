//! Messages the host publishes to session subscribers.

use serde::{Deserialize, Serialize};
use tictactoe_core::{GameEvent, GameSnapshot, GameState, Player};
use uuid::Uuid;

/// Events published for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    /// Session opened
    Created { session_id: Uuid },

    /// Something happened on the board
    Game { session_id: Uuid, event: GameEvent },

    /// Board cleared for a new game, tallies kept
    Restarted { session_id: Uuid },

    /// A command failed and nothing changed
    Rejected { session_id: Uuid, reason: String },

    /// Session closed
    Removed { session_id: Uuid, tally: Tally },
}

impl SessionEvent {
    /// Whether this event ends a game
    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            SessionEvent::Game {
                event: GameEvent::GameWon { .. } | GameEvent::GameDrawn,
                ..
            }
        )
    }
}

/// Results across all games played in a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

impl Tally {
    /// Count a finished game. In-progress states are ignored.
    pub fn record(&mut self, state: GameState) {
        match state {
            GameState::Victory(Player::X) => self.x_wins += 1,
            GameState::Victory(Player::O) => self.o_wins += 1,
            GameState::Draw => self.draws += 1,
            GameState::InProgress => {}
        }
    }

    pub fn games(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }

    pub fn merge(&mut self, other: &Tally) {
        self.x_wins += other.x_wins;
        self.o_wins += other.o_wins;
        self.draws += other.draws;
    }
}

/// Session information for subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub game: GameSnapshot,
    pub tally: Tally,
    /// Players seated by a bot
    pub bots: Vec<Player>,
}
