//! Host configuration from environment variables.

use anyhow::{bail, Context};
use std::str::FromStr;
use std::time::Duration;

/// Settings for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Total games to play across all sessions
    pub games: usize,
    /// Sessions playing concurrently
    pub sessions: usize,
    /// Pause before each bot move
    pub bot_delay: Duration,
    /// Base seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            games: 100,
            sessions: 4,
            bot_delay: Duration::ZERO,
            seed: None,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            games: parse_var(&lookup, "TICTACTOE_GAMES")?.unwrap_or(defaults.games),
            sessions: parse_var(&lookup, "TICTACTOE_SESSIONS")?.unwrap_or(defaults.sessions),
            bot_delay: parse_var(&lookup, "TICTACTOE_BOT_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.bot_delay),
            seed: parse_var(&lookup, "TICTACTOE_SEED")?,
        };

        if config.sessions == 0 {
            bail!("TICTACTOE_SESSIONS must be at least 1");
        }

        Ok(config)
    }

    /// Number of games session `index` plays so that all sessions add up
    /// to `games`
    pub fn games_for_session(&self, index: usize) -> usize {
        let base = self.games / self.sessions;
        let extra = usize::from(index < self.games % self.sessions);
        base + extra
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(None),
    }
}
