//! Bot-vs-bot tic-tac-toe simulation host.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod events;
mod host;
mod session;

use config::HostConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HostConfig::from_env()?;
    info!(
        games = config.games,
        sessions = config.sessions,
        bot_delay = ?config.bot_delay,
        seed = ?config.seed,
        "Starting tic-tac-toe simulation..."
    );

    let tally = host::run_simulation(&config).await?;
    println!("{}", serde_json::to_string_pretty(&tally)?);

    Ok(())
}
