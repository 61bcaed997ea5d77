use std::time::Instant;

use rand::{Rng, rngs::StdRng};
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    chat::ChatTransport,
    dto::notice::Notice,
    error::ScoreboardError,
    services::{game_service::TriviaGame, poller::MessagePoller},
};

/// Drives a [`TriviaGame`] against a chat transport: ask, poll until resolved, wait, repeat.
pub struct GameRunner<T, R = StdRng> {
    transport: T,
    game: TriviaGame<R>,
    poller: MessagePoller,
}

impl<T, R> GameRunner<T, R>
where
    T: ChatTransport,
    R: Rng,
{
    /// Announce the initial topic and start polling after that announcement.
    pub async fn start(transport: T, game: TriviaGame<R>) -> Self {
        let mut checkpoint = None;
        for notice in game.topic_notices() {
            let posted = post_notice(&transport, &notice).await;
            checkpoint = checkpoint.or(posted);
        }
        let checkpoint = checkpoint.unwrap_or_else(OffsetDateTime::now_utc);
        info!(%checkpoint, "game announced; polling for messages");

        let poller = MessagePoller::new(checkpoint, transport.current_user_id());
        Self {
            transport,
            game,
            poller,
        }
    }

    /// The game being played.
    pub fn game(&self) -> &TriviaGame<R> {
        &self.game
    }

    /// The transport the game is played on.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Play rounds forever.
    pub async fn run(&mut self) {
        loop {
            self.play_round().await;
            sleep(self.game.config().round_delay).await;
        }
    }

    /// Ask a question (when active) and poll until the round, or the paused wait, resolves.
    pub async fn play_round(&mut self) {
        let notices = self.game.ask_question(Instant::now());
        self.post_all(notices).await;

        loop {
            sleep(self.game.config().poll_interval).await;
            if self.poll_once(Instant::now()).await {
                break;
            }
        }
    }

    /// Fetch new messages once and feed them to the game. Returns whether the round resolved.
    ///
    /// Messages left over from a batch cut short by a resolution are processed before the newly
    /// fetched ones. Transport failures are logged; timers still run and the fetch is retried on
    /// the next call.
    pub async fn poll_once(&mut self, now: Instant) -> bool {
        if let Err(err) = self.poller.poll(&self.transport).await {
            warn!(error = %err, "failed to fetch messages; retrying");
        }

        let outcome = self.game.process_batch(self.poller.pending(), now);
        self.poller.commit(outcome.consumed);
        self.post_all(outcome.notices).await;
        if outcome.scored {
            if let Err(err) = self.persist_scores() {
                warn!(error = %err, "failed to persist scores");
            }
        }
        outcome.resolved
    }

    /// Write the scoreboard to its durable store.
    pub fn persist_scores(&self) -> Result<(), ScoreboardError> {
        self.game.scoreboard().persist()
    }

    async fn post_all(&self, notices: Vec<Notice>) {
        for notice in notices {
            post_notice(&self.transport, &notice).await;
        }
    }
}

async fn post_notice<T>(transport: &T, notice: &Notice) -> Option<OffsetDateTime>
where
    T: ChatTransport + ?Sized,
{
    let text = notice.to_string();
    debug!(text = %text, "posting notice");
    match transport.post(text).await {
        Ok(timestamp) => Some(timestamp),
        Err(err) => {
            warn!(error = %err, "failed to post notice");
            None
        }
    }
}
