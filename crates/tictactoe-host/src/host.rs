//! Session registry, event fan-out and the bot-vs-bot simulation.

use crate::config::HostConfig;
use crate::events::{SessionEvent, SessionInfo, Tally};
use crate::session::{GameSession, SessionCommand, SessionError};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tictactoe_core::{Player, RandomAgent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Host state shared across all tasks.
pub struct HostState {
    /// All open sessions
    pub sessions: DashMap<Uuid, GameSession>,
    /// Event sender per session
    pub subscribers: DashMap<Uuid, mpsc::UnboundedSender<SessionEvent>>,
}

impl HostState {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            subscribers: DashMap::new(),
        }
    }

    /// Open a session with bots seated for `bots`.
    ///
    /// The returned receiver is subscribed before `Created` is published,
    /// so it sees every event of the session.
    pub fn create_session(
        &self,
        bots: Vec<(Player, RandomAgent)>,
    ) -> (Uuid, mpsc::UnboundedReceiver<SessionEvent>) {
        let id = Uuid::new_v4();
        let session = bots
            .into_iter()
            .fold(GameSession::new(id), |session, (player, agent)| {
                session.with_bot(player, agent)
            });

        self.sessions.insert(id, session);
        let rx = self.attach(id);
        info!(session = %id, "session created");
        self.publish(id, SessionEvent::Created { session_id: id });
        (id, rx)
    }

    /// Close a session, returning its final tally
    pub fn remove_session(&self, id: Uuid) -> Option<Tally> {
        let (_, session) = self.sessions.remove(&id)?;
        info!(session = %id, games = session.tally.games(), "session removed");

        self.publish(
            id,
            SessionEvent::Removed {
                session_id: id,
                tally: session.tally,
            },
        );
        self.subscribers.remove(&id);
        Some(session.tally)
    }

    /// Receive every event published for `id` from now on.
    ///
    /// A new subscription replaces the previous one.
    pub fn subscribe(
        &self,
        id: Uuid,
    ) -> Result<mpsc::UnboundedReceiver<SessionEvent>, SessionError> {
        // Holding the entry keeps `remove_session` from running in between
        let _session = self
            .sessions
            .get(&id)
            .ok_or(SessionError::SessionNotFound)?;

        Ok(self.attach(id))
    }

    fn attach(&self, id: Uuid) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        rx
    }

    /// Send an event to the session's subscriber, if any.
    pub fn publish(&self, id: Uuid, event: SessionEvent) {
        if let Some(sender) = self.subscribers.get(&id) {
            let _ = sender.send(event);
        }
    }

    /// Apply a command to a session and publish the outcome.
    ///
    /// The session entry stays locked only while the command runs, so
    /// commands against one session are applied one at a time.
    pub fn dispatch(
        &self,
        id: Uuid,
        command: SessionCommand,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        let result = {
            let mut session = self
                .sessions
                .get_mut(&id)
                .ok_or(SessionError::SessionNotFound)?;
            session.handle(command)
        };

        match &result {
            Ok(events) => {
                for event in events {
                    if event.is_game_over() {
                        info!(session = %id, ?event, "game finished");
                    }
                    self.publish(id, event.clone());
                }
            }
            Err(e) => {
                warn!(session = %id, ?command, "command rejected: {}", e);
                self.publish(
                    id,
                    SessionEvent::Rejected {
                        session_id: id,
                        reason: e.to_string(),
                    },
                );
            }
        }

        result
    }

    pub fn session_info(&self, id: Uuid) -> Option<SessionInfo> {
        self.sessions.get(&id).map(|s| s.to_info())
    }

    /// Combined tally of every open session
    pub fn scoreboard(&self) -> Tally {
        self.sessions.iter().fold(Tally::default(), |mut total, s| {
            total.merge(&s.tally);
            total
        })
    }
}

impl Default for HostState {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait `delay`, then let the session's bot make its move.
///
/// The session is not locked while waiting, so a human undo or restart
/// during the pause is seen by the bot.
pub async fn play_bot_turn(
    state: &HostState,
    id: Uuid,
    delay: Duration,
) -> Result<Vec<SessionEvent>, SessionError> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    state.dispatch(id, SessionCommand::BotMove)
}

/// Play `config.games` bot-vs-bot games spread over concurrent sessions.
pub async fn run_simulation(config: &HostConfig) -> anyhow::Result<Tally> {
    let state = Arc::new(HostState::new());
    let mut handles = Vec::with_capacity(config.sessions);
    let mut ids = Vec::with_capacity(config.sessions);

    for index in 0..config.sessions {
        let games = config.games_for_session(index);
        if games == 0 {
            continue;
        }

        let bots = Player::ALL
            .into_iter()
            .enumerate()
            .map(|(seat, player)| {
                let agent = match config.seed {
                    Some(seed) => RandomAgent::with_seed(
                        seed.wrapping_add((index * Player::ALL.len() + seat) as u64),
                    ),
                    None => RandomAgent::new(),
                };
                (player, agent)
            })
            .collect();

        let (id, mut events) = state.create_session(bots);
        ids.push(id);

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                debug!(?event, "session event");
            }
        });

        let state = Arc::clone(&state);
        let delay = config.bot_delay;
        handles.push(tokio::spawn(async move {
            play_games(&state, id, games, delay).await
        }));
    }

    for handle in handles {
        handle.await??;
    }

    let tally = state.scoreboard();
    for id in ids {
        if let Some(info) = state.session_info(id) {
            debug!(session = %id, tally = ?info.tally, "closing session");
        }
        state.remove_session(id);
    }

    info!(
        games = tally.games(),
        x_wins = tally.x_wins,
        o_wins = tally.o_wins,
        draws = tally.draws,
        "simulation finished"
    );
    Ok(tally)
}

async fn play_games(
    state: &HostState,
    id: Uuid,
    games: usize,
    delay: Duration,
) -> Result<(), SessionError> {
    let mut played = 0;

    while played < games {
        let events = play_bot_turn(state, id, delay).await?;
        if events.iter().any(SessionEvent::is_game_over) {
            played += 1;
            debug!(session = %id, played, "game complete");
            if played < games {
                state.dispatch(id, SessionCommand::Restart)?;
            }
        }
    }

    Ok(())
}
