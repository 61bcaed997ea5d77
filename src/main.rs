//! Trivia bot binary entrypoint wiring configuration, topics, scores and the Rocket.Chat client.

use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_bot::{
    chat::rocketchat::RocketChatClient,
    config::AppConfig,
    dao::{scoreboard::Scoreboard, topics::TopicLoader},
    services::{game_service::TriviaGame, runner::GameRunner},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().context("loading configuration")?;

    let topics = TopicLoader::discover(&config.questions_dir).context("discovering topics")?;
    info!(topics = topics.names().len(), "topics discovered");

    let scoreboard = Scoreboard::load(&config.scoreboard_path).context("loading scoreboard")?;

    let client = RocketChatClient::connect(&config.chat)
        .await
        .context("connecting to Rocket.Chat")?;

    let game = TriviaGame::new(config.game.clone(), topics, scoreboard, Instant::now())
        .context("loading initial topic")?;
    let mut runner = GameRunner::start(client, game).await;

    tokio::select! {
        _ = runner.run() => {},
        _ = shutdown_signal() => info!("shutdown requested"),
    }

    if let Err(err) = runner.persist_scores() {
        warn!(error = %err, "failed to persist scores on shutdown");
    }
    info!("bye");
    Ok(())
}

/// Configure tracing subscribers; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,reqwest=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
