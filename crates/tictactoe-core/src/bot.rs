//! Computer opponents.
//!
//! An agent only looks at a `Game` and proposes a coordinate. It never
//! changes the game; the caller feeds the proposal back through
//! `Game::mark_cell` like any other move.

use crate::coord::Coordinate;
use crate::game::Game;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors an agent can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AgentError {
    #[error("Game is over")]
    GameOver,
}

pub type AgentResult = Result<Coordinate, AgentError>;

/// Something that can pick a move for the player to act
pub trait Agent {
    fn choose_move(&mut self, game: &Game) -> AgentResult;
}

/// Picks uniformly among the empty cells
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible choices for a given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn choose_move(&mut self, game: &Game) -> AgentResult {
        if game.state().is_terminal() {
            return Err(AgentError::GameOver);
        }

        game.empty_cells()
            .choose(&mut self.rng)
            .map(|cell| cell.coordinate)
            .ok_or(AgentError::GameOver)
    }
}
