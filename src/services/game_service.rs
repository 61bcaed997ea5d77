use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use tracing::{debug, info, warn};

use crate::{
    chat::models::ChatMessage,
    config::GameConfig,
    dao::{scoreboard::Scoreboard, topics::TopicLoader},
    dto::{command::Command, notice::Notice},
    error::TopicError,
    state::{GameState, state_machine::Resolution},
};

/// Points awarded for a correct answer.
const POINTS_PER_WIN: u64 = 1;

/// What a processed batch of messages produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Notices to post, in order.
    pub notices: Vec<Notice>,
    /// The current round (or the waiting period while paused) ended.
    pub resolved: bool,
    /// A score changed and should be persisted.
    pub scored: bool,
    /// Number of leading messages of the batch that were handled. The rest must be fed
    /// to the next call.
    pub consumed: usize,
}

/// The trivia game: topic, round lifecycle, commands and scores.
///
/// All time-dependent operations take `now` from the caller's monotonic clock.
pub struct TriviaGame<R = StdRng> {
    pub(crate) config: GameConfig,
    pub(crate) topics: TopicLoader,
    pub(crate) scoreboard: Scoreboard,
    pub(crate) state: GameState,
    pub(crate) rng: R,
}

impl TriviaGame<StdRng> {
    /// Create a game on a random topic, seeded from the OS.
    pub fn new(
        config: GameConfig,
        topics: TopicLoader,
        scoreboard: Scoreboard,
        now: Instant,
    ) -> Result<Self, TopicError> {
        Self::with_rng(config, topics, scoreboard, StdRng::from_os_rng(), now)
    }
}

impl<R: Rng> TriviaGame<R> {
    /// Create a game on a random topic drawn with `rng`.
    pub fn with_rng(
        config: GameConfig,
        topics: TopicLoader,
        scoreboard: Scoreboard,
        mut rng: R,
        now: Instant,
    ) -> Result<Self, TopicError> {
        let topic = topics.load(None, &mut rng)?;
        info!(topic = %topic.name, questions = topic.questions.len(), "initial topic loaded");
        let state = GameState::new(topic, config.start_active, now);

        Ok(Self {
            config,
            topics,
            scoreboard,
            state,
            rng,
        })
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Scores known to the game.
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Game settings.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Whether questions are being asked.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Notices announcing the topic in play.
    pub fn topic_notices(&self) -> Vec<Notice> {
        let name = self.state.topic().name.clone();
        if self.state.is_active() {
            vec![Notice::TopicSet { name }]
        } else {
            vec![Notice::TopicSetWhilePaused { name }]
        }
    }

    /// Pick a random question from the topic and open a round.
    ///
    /// Does nothing while paused.
    pub fn ask_question(&mut self, now: Instant) -> Vec<Notice> {
        if !self.state.is_active() {
            debug!("game paused; not asking");
            return Vec::new();
        }

        let Some(question) = self.state.topic().questions.choose(&mut self.rng).cloned() else {
            warn!(topic = %self.state.topic().name, "topic has no questions");
            return Vec::new();
        };

        match self.state.begin_round(question, now) {
            Ok(round) => {
                debug!(answer = %round.canonical_answer(), "question asked");
                vec![Notice::Question {
                    prompt: round.question().prompt.clone(),
                }]
            }
            Err(err) => {
                warn!(error = %err, "unable to ask question");
                Vec::new()
            }
        }
    }

    /// Process a chronologically ordered batch of player messages.
    ///
    /// Commands come first, then answers, then the answer timeout and the inactivity timeout.
    /// Processing stops at the first message that resolves the round; the messages after it
    /// are left unconsumed.
    pub fn process_batch(&mut self, messages: &[ChatMessage], now: Instant) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for message in messages {
            self.state.record_activity(now);
            outcome.consumed += 1;

            if let Some(command) = Command::parse(&message.text) {
                if self.dispatch(command, message, now, &mut outcome.notices) {
                    outcome.resolved = true;
                    return outcome;
                }
                continue;
            }

            if !self.state.is_active() {
                if self.state.take_pause_reminder() {
                    outcome.notices.push(Notice::PausedReminder);
                }
                continue;
            }

            let correct = self
                .state
                .round()
                .is_some_and(|round| round.question().accepts(&message.text));
            if correct {
                self.award_win(message, &mut outcome.notices);
                outcome.resolved = true;
                outcome.scored = true;
                return outcome;
            }
        }

        outcome.resolved = self.check_timers(now, &mut outcome.notices);
        outcome
    }

    fn award_win(&mut self, message: &ChatMessage, notices: &mut Vec<Notice>) {
        let round = match self.state.resolve(Resolution::Answered) {
            Ok(Some(round)) => round,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "unable to resolve answered round");
                return;
            }
        };

        self.scoreboard
            .give_score(&message.author_id, &message.author_name, POINTS_PER_WIN);
        info!(
            user = %message.author_name,
            answer = %round.canonical_answer(),
            "round won"
        );

        notices.push(Notice::Win {
            username: message.author_name.clone(),
            answer: round.canonical_answer().to_string(),
        });
        notices.push(Notice::Score {
            text: self.scoreboard.get_message(&message.author_id),
        });
    }

    fn check_timers(&mut self, now: Instant, notices: &mut Vec<Notice>) -> bool {
        if !self.state.is_active() {
            return false;
        }

        let timed_out = self
            .state
            .round()
            .is_some_and(|round| round.elapsed(now) >= self.config.answer_timeout);
        if timed_out {
            match self.state.resolve(Resolution::TimedOut) {
                Ok(Some(round)) => {
                    info!(answer = %round.canonical_answer(), "round timed out");
                    notices.push(Notice::TimeUp {
                        answer: round.canonical_answer().to_string(),
                    });
                    return true;
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "unable to time out round"),
            }
        }

        if self.state.idle_for(now) >= self.config.inactivity_timeout {
            match self.state.pause() {
                Ok(()) => {
                    info!(idle_secs = self.state.idle_for(now).as_secs(), "pausing idle game");
                    notices.push(Notice::AutoPaused);
                    return true;
                }
                Err(err) => warn!(error = %err, "unable to pause idle game"),
            }
        }

        false
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{fs, path::PathBuf, sync::Arc, time::Duration};

    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::state::state_machine::{GameMode, GamePhase};

    pub(crate) struct Fixture {
        pub game: TriviaGame<StdRng>,
        pub start: Instant,
        pub dir: PathBuf,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    pub(crate) fn fixture(topics: &[(&str, &str)], config: GameConfig) -> Fixture {
        let dir = std::env::temp_dir().join(format!("trivia-game-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        for (name, contents) in topics {
            fs::write(dir.join(format!("{name}.txt")), contents).unwrap();
        }

        let loader = TopicLoader::discover(&dir).unwrap();
        let scoreboard = Scoreboard::load(dir.join("scores.json")).unwrap();
        let start = Instant::now();
        let game = TriviaGame::with_rng(
            config,
            loader,
            scoreboard,
            StdRng::seed_from_u64(11),
            start,
        )
        .unwrap();

        Fixture { game, start, dir }
    }

    pub(crate) fn capitals() -> Fixture {
        fixture(
            &[("capitals", "What is the capital of France?`Paris\n")],
            GameConfig::default(),
        )
    }

    pub(crate) fn message(author: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            author_id: format!("id-{author}"),
            author_name: author.to_string(),
            text: text.to_string(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    fn secs(start: Instant, secs: u64) -> Instant {
        start + Duration::from_secs(secs)
    }

    #[test]
    fn asks_question_from_topic() {
        let mut fx = capitals();
        let notices = fx.game.ask_question(fx.start);

        assert_eq!(
            notices,
            vec![Notice::Question {
                prompt: "What is the capital of France?".into()
            }]
        );
        assert_eq!(fx.game.state().phase(), GamePhase::RoundActive);
        assert_eq!(fx.game.state().round().unwrap().canonical_answer(), "paris");
    }

    #[test]
    fn correct_answer_with_odd_case_and_spacing_wins() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        let now = secs(fx.start, 5);
        let outcome = fx.game.process_batch(&[message("alice", "PARIS ")], now);

        assert!(outcome.resolved);
        assert!(outcome.scored);
        assert_eq!(
            outcome.notices,
            vec![
                Notice::Win {
                    username: "alice".into(),
                    answer: "paris".into()
                },
                Notice::Score {
                    text: "alice's score is 1".into()
                },
            ]
        );
        assert_eq!(fx.game.state().phase(), GamePhase::AwaitingQuestion);
        assert_eq!(fx.game.scoreboard().entry("id-alice").unwrap().score, 1);
    }

    #[test]
    fn messages_after_a_win_are_left_unconsumed() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        let batch = [
            message("bob", "lyon"),
            message("alice", "paris"),
            message("bob", "!commands"),
        ];
        let outcome = fx.game.process_batch(&batch, secs(fx.start, 5));
        assert!(outcome.resolved);
        assert_eq!(outcome.consumed, 2);
        assert!(!outcome.notices.contains(&Notice::CommandList));

        let outcome = fx.game.process_batch(&batch[outcome.consumed..], secs(fx.start, 6));
        assert_eq!(outcome.consumed, 1);
        assert_eq!(outcome.notices, vec![Notice::CommandList]);
    }

    #[test]
    fn wrong_answers_do_not_resolve() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        let outcome = fx
            .game
            .process_batch(&[message("bob", "lyon"), message("bob", "par")], secs(fx.start, 3));

        assert_eq!(outcome, BatchOutcome::default());
        assert_eq!(fx.game.state().phase(), GamePhase::RoundActive);
    }

    #[test]
    fn command_matching_an_answer_is_never_scored() {
        let mut fx = fixture(
            &[("bangs", "Say it loud`!score\n")],
            GameConfig::default(),
        );
        fx.game.ask_question(fx.start);

        let outcome = fx.game.process_batch(&[message("alice", "!score")], secs(fx.start, 1));

        assert!(!outcome.resolved);
        assert!(!outcome.scored);
        assert_eq!(
            outcome.notices,
            vec![Notice::Score {
                text: "Unknown user".into()
            }]
        );
    }

    #[test]
    fn first_correct_answer_in_batch_wins() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        let outcome = fx.game.process_batch(
            &[message("alice", "paris"), message("bob", "paris")],
            secs(fx.start, 2),
        );

        assert!(outcome.resolved);
        assert!(fx.game.scoreboard().entry("id-bob").is_none());
        assert_eq!(fx.game.scoreboard().entry("id-alice").unwrap().score, 1);
    }

    #[test]
    fn timeout_reveals_answer_without_points() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        let outcome = fx.game.process_batch(&[message("bob", "lyon")], secs(fx.start, 60));

        assert!(outcome.resolved);
        assert!(!outcome.scored);
        assert_eq!(
            outcome.notices,
            vec![Notice::TimeUp {
                answer: "paris".into()
            }]
        );
        assert!(fx.game.scoreboard().entry("id-bob").is_none());
    }

    #[test]
    fn timeout_fires_without_any_messages() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        assert!(!fx.game.process_batch(&[], secs(fx.start, 59)).resolved);
        assert!(fx.game.process_batch(&[], secs(fx.start, 61)).resolved);
    }

    #[test]
    fn inactivity_pauses_and_ignores_play_until_start() {
        let config = GameConfig {
            answer_timeout: Duration::from_secs(600),
            inactivity_timeout: Duration::from_secs(300),
            ..GameConfig::default()
        };
        let mut fx = fixture(
            &[("capitals", "What is the capital of France?`Paris\n")],
            config,
        );
        fx.game.ask_question(fx.start);

        let outcome = fx.game.process_batch(&[], secs(fx.start, 301));
        assert!(outcome.resolved);
        assert_eq!(outcome.notices, vec![Notice::AutoPaused]);
        assert_eq!(fx.game.state().mode(), GameMode::Paused);
        assert!(fx.game.state().round().is_none());

        assert!(fx.game.ask_question(secs(fx.start, 302)).is_empty());

        let outcome = fx.game.process_batch(
            &[message("alice", "paris"), message("alice", "!hint")],
            secs(fx.start, 303),
        );
        assert!(!outcome.resolved);
        assert_eq!(outcome.notices, vec![Notice::PausedReminder]);
        assert!(fx.game.scoreboard().entry("id-alice").is_none());

        let outcome = fx.game.process_batch(&[message("alice", "!start")], secs(fx.start, 304));
        assert!(outcome.resolved);
        assert_eq!(outcome.notices, vec![Notice::Resumed]);
        assert!(fx.game.is_active());
        assert_eq!(fx.game.ask_question(secs(fx.start, 305)).len(), 1);
    }

    #[test]
    fn recent_activity_prevents_auto_pause() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        fx.game.process_batch(&[message("bob", "lyon")], secs(fx.start, 250));
        fx.game.process_batch(&[message("bob", "!topic capitals")], secs(fx.start, 250));
        fx.game.ask_question(secs(fx.start, 260));

        let outcome = fx.game.process_batch(&[], secs(fx.start, 301));
        assert!(!outcome.notices.contains(&Notice::AutoPaused));
        assert!(fx.game.is_active());
    }

    #[test]
    fn paused_start_announces_differently() {
        let config = GameConfig {
            start_active: false,
            ..GameConfig::default()
        };
        let fx = fixture(&[("capitals", "Q`A\n")], config);

        assert_eq!(
            fx.game.topic_notices(),
            vec![Notice::TopicSetWhilePaused {
                name: "capitals".into()
            }]
        );
    }

    #[test]
    fn question_is_shared_not_copied() {
        let mut fx = capitals();
        fx.game.ask_question(fx.start);

        let round = fx.game.state().round().unwrap();
        assert!(Arc::ptr_eq(
            round.question(),
            &fx.game.state().topic().questions[0]
        ));
    }
}
