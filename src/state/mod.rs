pub mod game;
pub mod hint;
pub mod state_machine;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use rand::Rng;

use self::{
    game::{LoadedTopic, Question},
    hint::HintState,
    state_machine::{
        GameEvent, GameMode, GamePhase, GameStateMachine, InvalidTransition, Resolution,
    },
};

/// The question currently in play. Only [`GameState`] changes it.
#[derive(Debug, Clone)]
pub struct Round {
    question: Arc<Question>,
    canonical_answer: String,
    asked_at: Instant,
    hints: HintState,
    last_hint_at: Option<Instant>,
}

impl Round {
    fn new(question: Arc<Question>, now: Instant) -> Self {
        let canonical_answer = question.canonical_answer().to_string();
        let hints = HintState::prepare(&canonical_answer);
        Self {
            question,
            canonical_answer,
            asked_at: now,
            hints,
            last_hint_at: None,
        }
    }

    /// Question being asked.
    pub fn question(&self) -> &Arc<Question> {
        &self.question
    }

    /// Shortest accepted answer, used for display and hints.
    pub fn canonical_answer(&self) -> &str {
        &self.canonical_answer
    }

    /// When the question was posted (local clock).
    pub fn asked_at(&self) -> Instant {
        self.asked_at
    }

    /// Hint reveal state for the canonical answer.
    pub fn hints(&self) -> &HintState {
        &self.hints
    }

    /// When the last hint was given (local clock).
    pub fn last_hint_at(&self) -> Option<Instant> {
        self.last_hint_at
    }

    /// Time since the question was posted.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.asked_at)
    }

    /// Time left before `!hint` is honoured again; zero when a hint can be given.
    pub fn hint_cooldown(&self, now: Instant, hint_delay: Duration) -> Duration {
        let since = self.last_hint_at.unwrap_or(self.asked_at);
        (since + hint_delay).saturating_duration_since(now)
    }
}

/// Result of a hint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    /// Paused, or no round is open.
    Unavailable,
    /// Every hint for the round was given.
    Exhausted,
    /// Asked too early; the next hint is available after this duration.
    Cooldown(Duration),
    /// A letter was uncovered.
    Revealed {
        /// Mask after the reveal.
        mask: String,
        /// Hints left.
        remaining: usize,
    },
}

/// Game state owned by the game service. Every transition goes through the state machine.
#[derive(Debug)]
pub struct GameState {
    machine: GameStateMachine,
    topic: LoadedTopic,
    round: Option<Round>,
    last_activity: Instant,
    pause_reminded: bool,
}

impl GameState {
    /// Create the state for `topic`, starting the activity clock at `now`.
    pub fn new(topic: LoadedTopic, start_active: bool, now: Instant) -> Self {
        Self {
            machine: GameStateMachine::new(start_active),
            topic,
            round: None,
            last_activity: now,
            pause_reminded: false,
        }
    }

    /// Question cycle phase.
    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    /// Active/paused flag.
    pub fn mode(&self) -> GameMode {
        self.machine.mode()
    }

    /// Whether the game is active.
    pub fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    /// Topic currently in play.
    pub fn topic(&self) -> &LoadedTopic {
        &self.topic
    }

    /// Active round, if any.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Start a round for `question`.
    pub fn begin_round(
        &mut self,
        question: Arc<Question>,
        now: Instant,
    ) -> Result<&Round, InvalidTransition> {
        self.machine.apply(GameEvent::AskQuestion)?;
        Ok(&*self.round.insert(Round::new(question, now)))
    }

    /// End the active round, returning it.
    pub fn resolve(&mut self, resolution: Resolution) -> Result<Option<Round>, InvalidTransition> {
        self.machine.apply(GameEvent::Resolve(resolution))?;
        Ok(self.round.take())
    }

    /// Swap in a freshly loaded topic and drop any round.
    pub fn change_topic(
        &mut self,
        topic: LoadedTopic,
        now: Instant,
    ) -> Result<(), InvalidTransition> {
        self.machine.apply(GameEvent::ChangeTopic)?;
        self.topic = topic;
        self.round = None;
        self.last_activity = now;
        Ok(())
    }

    /// Uncover one more letter of the answer if the round allows it at `now`.
    ///
    /// Exhaustion is reported before the cooldown.
    pub fn give_hint<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        hint_delay: Duration,
        rng: &mut R,
    ) -> HintOutcome {
        if !self.is_active() {
            return HintOutcome::Unavailable;
        }
        let Some(round) = self.round.as_mut() else {
            return HintOutcome::Unavailable;
        };

        if round.hints.is_exhausted() {
            return HintOutcome::Exhausted;
        }
        let cooldown = round.hint_cooldown(now, hint_delay);
        if !cooldown.is_zero() {
            return HintOutcome::Cooldown(cooldown);
        }

        let reveal = round.hints.reveal_next(rng);
        round.last_hint_at = Some(now);
        HintOutcome::Revealed {
            mask: reveal.mask,
            remaining: round.hints.remaining(),
        }
    }

    /// Pause the game and drop any round.
    pub fn pause(&mut self) -> Result<(), InvalidTransition> {
        self.machine.apply(GameEvent::Pause)?;
        self.round = None;
        self.pause_reminded = false;
        Ok(())
    }

    /// Resume a paused game.
    pub fn resume(&mut self, now: Instant) -> Result<(), InvalidTransition> {
        self.machine.apply(GameEvent::Resume)?;
        self.round = None;
        self.last_activity = now;
        Ok(())
    }

    /// Record a message from a player.
    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = self.last_activity.max(now);
    }

    /// Time since the last player message.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Returns `true` once per pause period, the first time it is asked.
    pub fn take_pause_reminder(&mut self) -> bool {
        if self.is_active() || self.pause_reminded {
            return false;
        }
        self.pause_reminded = true;
        true
    }
}
