use thiserror::Error;

/// Where the question cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No round is active; the next question can be asked.
    AwaitingQuestion,
    /// A question is posted and answers are being polled.
    RoundActive,
}

/// Orthogonal active/paused flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Questions are asked and answers evaluated.
    Active,
    /// Only commands are processed.
    Paused,
}

/// Why an active round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A player gave an accepted answer.
    Answered,
    /// The answer timeout elapsed.
    TimedOut,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new question was posted.
    AskQuestion,
    /// The active round ended on its own.
    Resolve(Resolution),
    /// A new topic was loaded; any round is discarded.
    ChangeTopic,
    /// The game paused itself after a silent period.
    Pause,
    /// A player resumed the game.
    Resume,
}

/// Snapshot of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Question cycle phase.
    pub phase: GamePhase,
    /// Active/paused flag.
    pub mode: GameMode,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// State the machine was in when the invalid event was received.
    pub from: Snapshot,
    /// The event that cannot be applied from this state.
    pub event: GameEvent,
}

/// Transition table for the question cycle and the pause flag.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    phase: GamePhase,
    mode: GameMode,
}

impl GameStateMachine {
    /// Create a state machine waiting for its first question.
    pub fn new(start_active: bool) -> Self {
        Self {
            phase: GamePhase::AwaitingQuestion,
            mode: if start_active {
                GameMode::Active
            } else {
                GameMode::Paused
            },
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Inspect the current mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Whether the game is active.
    pub fn is_active(&self) -> bool {
        self.mode == GameMode::Active
    }

    /// Create a snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            mode: self.mode,
        }
    }

    /// Apply `event`, returning the new snapshot.
    pub fn apply(&mut self, event: GameEvent) -> Result<Snapshot, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next.phase;
        self.mode = next.mode;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: GameEvent) -> Result<Snapshot, InvalidTransition> {
        use GameMode::{Active, Paused};
        use GamePhase::{AwaitingQuestion, RoundActive};

        let (phase, mode) = match (self.phase, self.mode, event) {
            (AwaitingQuestion, Active, GameEvent::AskQuestion) => (RoundActive, Active),
            (RoundActive, Active, GameEvent::Resolve(_)) => (AwaitingQuestion, Active),
            (_, mode, GameEvent::ChangeTopic) => (AwaitingQuestion, mode),
            (_, Active, GameEvent::Pause) => (AwaitingQuestion, Paused),
            (_, Paused, GameEvent::Resume) => (AwaitingQuestion, Active),
            (_, _, event) => {
                return Err(InvalidTransition {
                    from: self.snapshot(),
                    event,
                });
            }
        };

        Ok(Snapshot { phase, mode })
    }
}
