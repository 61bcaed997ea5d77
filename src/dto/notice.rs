//! Messages the bot posts to the channel.

use std::{fmt, time::Duration};

const COMMAND_LIST: &str = "```
!topic - Change topic to a random one
!topic <topic> - Change topic to <topic>
!topics - List available topics
!hint - Reveal a letter of the answer
!score - Show your score
!commands - List of available commands
!start - Resume the game```";

/// A chat notice produced by the game. [`fmt::Display`] renders the posted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A new question.
    Question {
        /// Question text.
        prompt: String,
    },
    /// A topic was loaded.
    TopicSet {
        /// Topic name.
        name: String,
    },
    /// A topic was loaded while the game is paused.
    TopicSetWhilePaused {
        /// Topic name.
        name: String,
    },
    /// `!topic <name>` named a topic that does not exist.
    UnknownTopic {
        /// Requested name.
        name: String,
    },
    /// A topic exists but could not be loaded.
    TopicUnavailable {
        /// Topic name, empty for a random pick.
        name: String,
    },
    /// Known topic names.
    TopicList {
        /// Sorted names.
        names: Vec<String>,
    },
    /// A player answered correctly.
    Win {
        /// Winner's display name.
        username: String,
        /// Canonical answer.
        answer: String,
    },
    /// Score line for a user, as rendered by the scoreboard.
    Score {
        /// Rendered score message.
        text: String,
    },
    /// The answer timeout elapsed.
    TimeUp {
        /// Canonical answer.
        answer: String,
    },
    /// The game paused itself after a silent period.
    AutoPaused,
    /// Reminder that the game is paused.
    PausedReminder,
    /// `!start` resumed the game.
    Resumed,
    /// Answer mask after a hint.
    Hint {
        /// Current mask.
        mask: String,
        /// Hints left after this one.
        remaining: usize,
    },
    /// `!hint` asked too early.
    HintCooldown {
        /// Time until the next hint.
        remaining: Duration,
    },
    /// All hints for this round were given.
    NoMoreHints,
    /// `!a` with debugging enabled.
    DebugAnswer {
        /// Canonical answer.
        answer: String,
    },
    /// `!commands`
    CommandList,
    /// Unrecognised command.
    UnknownCommand,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Question { prompt } => write!(f, ":question: `{prompt}` :question:"),
            Notice::TopicSet { name } => write!(f, ":robot: Topic set to _*{name}*_"),
            Notice::TopicSetWhilePaused { name } => write!(
                f,
                ":robot: Topic set to _*{name}*_. The game is paused, type _!start_ to play."
            ),
            Notice::UnknownTopic { name } => write!(f, ":robot: _Unknown topic_ `{name}`"),
            Notice::TopicUnavailable { name } if name.is_empty() => {
                write!(f, ":robot: _Unable to load a topic_")
            }
            Notice::TopicUnavailable { name } => {
                write!(f, ":robot: _Unable to load topic_ `{name}`")
            }
            Notice::TopicList { names } => write!(f, ":robot: Topics: {}", names.join(", ")),
            Notice::Win { username, answer } => write!(
                f,
                ":boom: @{username} wins this round! :boom: (The answer is _{answer}_)"
            ),
            Notice::Score { text } => f.write_str(text),
            Notice::TimeUp { answer } => write!(f, "Time's up! The answer was {answer}"),
            Notice::AutoPaused => write!(
                f,
                "No activity for a while. Pausing a game.\nType _!start_ to resume."
            ),
            Notice::PausedReminder => write!(f, "Game is paused. Type !start to resume."),
            Notice::Resumed => write!(f, "Resuming the game."),
            Notice::Hint { mask, remaining } => {
                write!(f, ":bulb: Hint: `{mask}` ({remaining} left)")
            }
            Notice::HintCooldown { remaining } => write!(
                f,
                ":hourglass: Next hint available in {}s",
                remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
            ),
            Notice::NoMoreHints => write!(f, ":bulb: No more hints"),
            Notice::DebugAnswer { answer } => f.write_str(answer),
            Notice::CommandList => f.write_str(COMMAND_LIST),
            Notice::UnknownCommand => write!(
                f,
                ":robot: Unknown command. Write _!commands_ for list of commands"
            ),
        }
    }
}
