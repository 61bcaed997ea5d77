use std::{
    collections::VecDeque,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use futures::future::BoxFuture;
use rand::{SeedableRng, rngs::StdRng};
use time::OffsetDateTime;
use uuid::Uuid;

use trivia_bot::{
    chat::{
        ChatTransport,
        models::ChatMessage,
        transport::{TransportError, TransportResult},
    },
    config::GameConfig,
    dao::{scoreboard::Scoreboard, topics::TopicLoader},
    dto::notice::Notice,
    services::{game_service::TriviaGame, runner::GameRunner},
};

const BOT_ID: &str = "bot-id";

#[derive(Default)]
struct Channel {
    posted: Vec<String>,
    pending: VecDeque<ChatMessage>,
    failing_fetches: usize,
    clock: i64,
}

impl Channel {
    fn tick(&mut self) -> OffsetDateTime {
        self.clock += 1;
        OffsetDateTime::UNIX_EPOCH
            + time::Duration::days(20_000)
            + time::Duration::seconds(self.clock)
    }
}

/// In-memory channel: posts are recorded, queued messages are handed out on the next fetch.
#[derive(Clone, Default)]
struct MemoryChat {
    channel: Arc<Mutex<Channel>>,
}

impl MemoryChat {
    fn say(&self, author_id: &str, author_name: &str, text: &str) {
        let mut channel = self.channel.lock().unwrap();
        let timestamp = channel.tick();
        channel.pending.push_back(ChatMessage {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            author_name: author_name.to_string(),
            text: text.to_string(),
            timestamp,
        });
    }

    fn fail_next_fetches(&self, count: usize) {
        self.channel.lock().unwrap().failing_fetches = count;
    }

    fn posted(&self) -> Vec<String> {
        self.channel.lock().unwrap().posted.clone()
    }
}

impl ChatTransport for MemoryChat {
    fn current_user_id(&self) -> &str {
        BOT_ID
    }

    fn post(&self, text: String) -> BoxFuture<'static, TransportResult<OffsetDateTime>> {
        let mut channel = self.channel.lock().unwrap();
        let timestamp = channel.tick();
        channel.posted.push(text);
        Box::pin(async move { Ok(timestamp) })
    }

    fn fetch_since(
        &self,
        since: OffsetDateTime,
    ) -> BoxFuture<'static, TransportResult<Vec<ChatMessage>>> {
        let mut channel = self.channel.lock().unwrap();
        let result = if channel.failing_fetches > 0 {
            channel.failing_fetches -= 1;
            Err(TransportError::unavailable(
                "connection reset".into(),
                std::io::Error::other("connection reset"),
            ))
        } else {
            Ok(channel
                .pending
                .drain(..)
                .filter(|message| message.timestamp > since)
                .collect())
        };
        Box::pin(async move { result })
    }
}

struct Setup {
    dir: PathBuf,
    chat: MemoryChat,
    runner: GameRunner<MemoryChat>,
}

impl Drop for Setup {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn fast_config() -> GameConfig {
    GameConfig {
        poll_interval: Duration::from_millis(1),
        round_delay: Duration::from_millis(1),
        ..GameConfig::default()
    }
}

async fn setup(config: GameConfig) -> Setup {
    let dir = std::env::temp_dir().join(format!("trivia-flow-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("capitals.txt"),
        "What is the capital of France?`Paris`Paris, France\n",
    )
    .unwrap();

    let topics = TopicLoader::discover(&dir).unwrap();
    let scoreboard = Scoreboard::load(dir.join("scores.json")).unwrap();
    let game = TriviaGame::with_rng(
        config,
        topics,
        scoreboard,
        StdRng::seed_from_u64(3),
        Instant::now(),
    )
    .unwrap();

    let chat = MemoryChat::default();
    let runner = GameRunner::start(chat.clone(), game).await;
    Setup { dir, chat, runner }
}

async fn play(setup: &mut Setup) {
    tokio::time::timeout(Duration::from_secs(5), setup.runner.play_round())
        .await
        .expect("round did not resolve in time");
}

#[tokio::test]
async fn winning_answer_is_announced_and_persisted() {
    let mut setup = setup(fast_config()).await;
    setup.chat.say("u-alice", "alice", "paris");

    play(&mut setup).await;

    assert_eq!(
        setup.chat.posted(),
        vec![
            Notice::TopicSet {
                name: "capitals".into()
            }
            .to_string(),
            Notice::Question {
                prompt: "What is the capital of France?".into()
            }
            .to_string(),
            Notice::Win {
                username: "alice".into(),
                answer: "paris".into()
            }
            .to_string(),
            Notice::Score {
                text: "alice's score is 1".into()
            }
            .to_string(),
        ]
    );

    let stored = Scoreboard::load(setup.dir.join("scores.json")).unwrap();
    assert_eq!(stored.entry("u-alice").map(|entry| entry.score), Some(1));
}

#[tokio::test]
async fn command_sent_right_after_a_win_is_handled_next_round() {
    let config = GameConfig {
        answer_timeout: Duration::from_millis(50),
        ..fast_config()
    };
    let mut setup = setup(config).await;
    setup.chat.say("u-alice", "alice", "paris");
    setup.chat.say("u-bob", "bob", "!commands");

    play(&mut setup).await;
    play(&mut setup).await;

    let question = Notice::Question {
        prompt: "What is the capital of France?".into(),
    }
    .to_string();
    assert_eq!(
        setup.chat.posted(),
        vec![
            Notice::TopicSet {
                name: "capitals".into()
            }
            .to_string(),
            question.clone(),
            Notice::Win {
                username: "alice".into(),
                answer: "paris".into()
            }
            .to_string(),
            Notice::Score {
                text: "alice's score is 1".into()
            }
            .to_string(),
            question,
            Notice::CommandList.to_string(),
            Notice::TimeUp {
                answer: "paris".into()
            }
            .to_string(),
        ]
    );
}

#[tokio::test]
async fn unanswered_question_times_out() {
    let config = GameConfig {
        answer_timeout: Duration::from_millis(20),
        ..fast_config()
    };
    let mut setup = setup(config).await;
    setup.chat.say(BOT_ID, "bot", "paris");
    setup.chat.say("u-bob", "bob", "lyon");

    play(&mut setup).await;

    let posted = setup.chat.posted();
    assert_eq!(
        posted.last(),
        Some(
            &Notice::TimeUp {
                answer: "paris".into()
            }
            .to_string()
        )
    );
    assert!(setup.runner.game().scoreboard().entry(BOT_ID).is_none());
}

#[tokio::test]
async fn fetch_failures_are_retried() {
    let mut setup = setup(fast_config()).await;
    setup.chat.fail_next_fetches(2);
    setup.chat.say("u-carol", "carol", "Paris, France");

    play(&mut setup).await;

    assert_eq!(
        setup.runner.game().scoreboard().get_message("u-carol"),
        "carol's score is 1"
    );
}

#[tokio::test]
async fn paused_game_resumes_on_start() {
    let config = GameConfig {
        start_active: false,
        ..fast_config()
    };
    let mut setup = setup(config).await;
    setup.chat.say("u-dave", "dave", "hello?");
    setup.chat.say("u-dave", "dave", "!start");

    play(&mut setup).await;

    assert_eq!(
        setup.chat.posted(),
        vec![
            Notice::TopicSetWhilePaused {
                name: "capitals".into()
            }
            .to_string(),
            Notice::PausedReminder.to_string(),
            Notice::Resumed.to_string(),
        ]
    );
    assert!(setup.runner.game().is_active());
}
