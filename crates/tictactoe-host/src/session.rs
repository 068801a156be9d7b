//! Game session management.
//!
//! A session owns the current `Game` for one table, swaps it after every
//! successful command and keeps win/draw tallies across restarts.

use std::collections::HashMap;
use thiserror::Error;
use tictactoe_core::{
    Agent, AgentError, Coordinate, Game, GameAction, GameError, GameEvent, MarkError, Player,
    RandomAgent, UndoError,
};
use tracing::debug;
use uuid::Uuid;

use crate::events::{SessionEvent, SessionInfo, Tally};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Mark rejected: {0}")]
    Mark(#[from] MarkError),

    #[error("Undo rejected: {0}")]
    Undo(#[from] UndoError),

    #[error("Bot cannot move: {0}")]
    Agent(#[from] AgentError),

    #[error("No bot in this session")]
    NoBot,

    #[error("Not a bot's turn")]
    NotBotTurn,

    #[error("Session not found")]
    SessionNotFound,
}

impl From<GameError> for SessionError {
    fn from(error: GameError) -> Self {
        match error {
            GameError::Mark(e) => SessionError::Mark(e),
            GameError::Undo(e) => SessionError::Undo(e),
        }
    }
}

/// Commands a session accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Mark a cell for the player to move
    Mark(Coordinate),
    /// Take back the last move
    Undo,
    /// Start a new game, keeping tallies
    Restart,
    /// Let the bot seated for the player to move pick a cell
    BotMove,
}

/// A single game table.
pub struct GameSession {
    pub id: Uuid,
    pub game: Game,
    pub tally: Tally,
    bots: HashMap<Player, RandomAgent>,
}

impl GameSession {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            game: Game::new(),
            tally: Tally::default(),
            bots: HashMap::new(),
        }
    }

    /// Seat a bot for `player`, replacing any bot already there
    pub fn with_bot(mut self, player: Player, agent: RandomAgent) -> Self {
        self.bots.insert(player, agent);
        self
    }

    pub fn has_bot(&self, player: Player) -> bool {
        self.bots.contains_key(&player)
    }

    /// Whether a bot should move next
    pub fn is_bot_turn(&self) -> bool {
        self.game.state().is_in_progress() && self.has_bot(self.game.current_player())
    }

    pub fn handle(&mut self, command: SessionCommand) -> Result<Vec<SessionEvent>, SessionError> {
        match command {
            SessionCommand::Mark(coordinate) => self.apply(GameAction::Mark(coordinate)),
            SessionCommand::Undo => self.apply(GameAction::Undo),
            SessionCommand::Restart => {
                self.game = Game::new();
                debug!(session = %self.id, "game restarted");
                Ok(vec![SessionEvent::Restarted {
                    session_id: self.id,
                }])
            }
            SessionCommand::BotMove => {
                let coordinate = self.choose_bot_move()?;
                self.apply(GameAction::Mark(coordinate))
            }
        }
    }

    fn choose_bot_move(&mut self) -> Result<Coordinate, SessionError> {
        if self.bots.is_empty() {
            return Err(SessionError::NoBot);
        }
        if self.game.state().is_terminal() {
            return Err(AgentError::GameOver.into());
        }

        let agent = self
            .bots
            .get_mut(&self.game.current_player())
            .ok_or(SessionError::NotBotTurn)?;

        Ok(agent.choose_move(&self.game)?)
    }

    fn apply(&mut self, action: GameAction) -> Result<Vec<SessionEvent>, SessionError> {
        let (game, events) = self.game.apply_action(action)?;
        self.game = game;

        for event in &events {
            match event {
                GameEvent::CellMarked { player, coordinate } => {
                    debug!(session = %self.id, %player, %coordinate, "cell marked");
                }
                GameEvent::MoveUndone { player, coordinate } => {
                    debug!(session = %self.id, %player, %coordinate, "move undone");
                }
                GameEvent::GameWon { winner, .. } => {
                    debug!(session = %self.id, %winner, "game won");
                    self.tally.record(self.game.state());
                }
                GameEvent::GameDrawn => {
                    debug!(session = %self.id, "game drawn");
                    self.tally.record(self.game.state());
                }
            }
        }

        Ok(events
            .into_iter()
            .map(|event| SessionEvent::Game {
                session_id: self.id,
                event,
            })
            .collect())
    }

    pub fn to_info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            game: self.game.snapshot(),
            tally: self.tally,
            bots: Player::ALL
                .into_iter()
                .filter(|p| self.has_bot(*p))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_core::GameState;

    fn mark(session: &mut GameSession, row: i32, column: i32) -> Vec<SessionEvent> {
        session
            .handle(SessionCommand::Mark(Coordinate::new(row, column)))
            .unwrap()
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new(Uuid::new_v4());
        assert_eq!(session.game, Game::new());
        assert_eq!(session.tally, Tally::default());
        assert!(!session.is_bot_turn());
    }

    #[test]
    fn test_win_is_tallied_once() {
        let mut session = GameSession::new(Uuid::new_v4());
        for (r, c) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            mark(&mut session, r, c);
        }
        let events = mark(&mut session, 0, 2);

        assert_eq!(events.len(), 2);
        assert!(events[1].is_game_over());
        assert_eq!(session.tally.x_wins, 1);

        // Further marks are rejected and do not touch the tally
        let err = session
            .handle(SessionCommand::Mark(Coordinate::new(2, 2)))
            .unwrap_err();
        assert!(matches!(err, SessionError::Mark(MarkError::GameOver)));
        assert_eq!(session.tally.games(), 1);
    }

    #[test]
    fn test_draw_is_tallied() {
        let mut session = GameSession::new(Uuid::new_v4());
        for (r, c) in [
            (0, 1),
            (0, 0),
            (1, 1),
            (0, 2),
            (1, 2),
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
        ] {
            mark(&mut session, r, c);
        }
        assert_eq!(session.game.state(), GameState::Draw);
        assert_eq!(session.tally.draws, 1);
    }

    #[test]
    fn test_restart_keeps_tally() {
        let mut session = GameSession::new(Uuid::new_v4());
        for (r, c) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
            mark(&mut session, r, c);
        }
        session.handle(SessionCommand::Restart).unwrap();

        assert_eq!(session.game, Game::new());
        assert_eq!(session.tally.x_wins, 1);
    }

    #[test]
    fn test_failed_command_leaves_session_unchanged() {
        let mut session = GameSession::new(Uuid::new_v4());
        assert!(matches!(
            session.handle(SessionCommand::Undo),
            Err(SessionError::Undo(UndoError::NoMovesToUndo))
        ));

        mark(&mut session, 1, 1);
        let before = session.game.clone();
        assert!(session
            .handle(SessionCommand::Mark(Coordinate::new(1, 1)))
            .is_err());
        assert_eq!(session.game, before);
    }

    #[test]
    fn test_rejection_carries_core_error() {
        let mut session = GameSession::new(Uuid::new_v4());
        let err = session
            .handle(SessionCommand::Mark(Coordinate::new(3, 0)))
            .unwrap_err();

        assert!(matches!(err, SessionError::Mark(MarkError::OutOfBounds)));
        assert_eq!(err.to_string(), "Mark rejected: Coordinate is outside the grid");
    }

    #[test]
    fn test_bot_moves_for_its_seat_only() {
        let mut session =
            GameSession::new(Uuid::new_v4()).with_bot(Player::O, RandomAgent::with_seed(1));

        assert!(!session.is_bot_turn());
        assert!(matches!(
            session.handle(SessionCommand::BotMove),
            Err(SessionError::NotBotTurn)
        ));

        mark(&mut session, 1, 1);
        assert!(session.is_bot_turn());
        session.handle(SessionCommand::BotMove).unwrap();

        assert_eq!(session.game.move_count(), 2);
        assert_eq!(session.game.current_player(), Player::X);
        assert_eq!(session.game.last_move().map(|m| m.player), Some(Player::O));
    }

    #[test]
    fn test_bot_move_without_bot() {
        let mut session = GameSession::new(Uuid::new_v4());
        assert!(matches!(
            session.handle(SessionCommand::BotMove),
            Err(SessionError::NoBot)
        ));
    }

    #[test]
    fn test_bots_play_to_completion() {
        let mut session = GameSession::new(Uuid::new_v4())
            .with_bot(Player::X, RandomAgent::with_seed(3))
            .with_bot(Player::O, RandomAgent::with_seed(4));

        while session.is_bot_turn() {
            session.handle(SessionCommand::BotMove).unwrap();
        }

        assert!(session.game.state().is_terminal());
        assert_eq!(session.tally.games(), 1);
        assert!(matches!(
            session.handle(SessionCommand::BotMove),
            Err(SessionError::Agent(AgentError::GameOver))
        ));
        assert_eq!(session.to_info().bots, vec![Player::X, Player::O]);
    }
}
