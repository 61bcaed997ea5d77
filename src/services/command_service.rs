//! Handling of `!` commands. Each handler returns whether the command ended the current round.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    chat::models::ChatMessage,
    dto::{command::Command, notice::Notice},
    services::game_service::TriviaGame,
    state::HintOutcome,
};

impl<R: Rng> TriviaGame<R> {
    pub(crate) fn dispatch(
        &mut self,
        command: Command,
        message: &ChatMessage,
        now: Instant,
        notices: &mut Vec<Notice>,
    ) -> bool {
        debug!(command = ?command, user = %message.author_name, "dispatching command");

        match command {
            Command::Topic(name) => self.change_topic(name.as_deref(), now, notices),
            Command::Answer => {
                if self.config.debug {
                    if let Some(round) = self.state.round() {
                        notices.push(Notice::DebugAnswer {
                            answer: round.canonical_answer().to_string(),
                        });
                    }
                }
                false
            }
            Command::Commands => {
                notices.push(Notice::CommandList);
                false
            }
            Command::Start => self.resume(now, notices),
            Command::Score => {
                notices.push(Notice::Score {
                    text: self.scoreboard.get_message(&message.author_id),
                });
                false
            }
            Command::Topics => {
                notices.push(Notice::TopicList {
                    names: self.topics.names(),
                });
                false
            }
            Command::Hint => {
                self.give_hint(now, notices);
                false
            }
            Command::Unknown(text) => {
                debug!(command = %text, "unknown command");
                notices.push(Notice::UnknownCommand);
                false
            }
        }
    }

    /// Load a named or random topic. A failed load leaves the current topic and round as they were.
    fn change_topic(&mut self, name: Option<&str>, now: Instant, notices: &mut Vec<Notice>) -> bool {
        match self.topics.load(name, &mut self.rng) {
            Ok(topic) => {
                let (name, questions) = (topic.name.clone(), topic.questions.len());
                if let Err(err) = self.state.change_topic(topic, now) {
                    warn!(error = %err, "unable to change topic");
                    return false;
                }
                info!(topic = %name, questions, "topic changed");
                notices.extend(self.topic_notices());
                true
            }
            Err(err) if err.is_not_found() => {
                notices.push(Notice::UnknownTopic {
                    name: name.unwrap_or_default().to_string(),
                });
                false
            }
            Err(err) => {
                warn!(error = %err, "failed to load topic");
                notices.push(Notice::TopicUnavailable {
                    name: name.unwrap_or_default().to_string(),
                });
                false
            }
        }
    }

    fn resume(&mut self, now: Instant, notices: &mut Vec<Notice>) -> bool {
        if self.state.is_active() {
            return false;
        }

        match self.state.resume(now) {
            Ok(()) => {
                info!("game resumed");
                notices.push(Notice::Resumed);
                true
            }
            Err(err) => {
                warn!(error = %err, "unable to resume game");
                false
            }
        }
    }

    fn give_hint(&mut self, now: Instant, notices: &mut Vec<Notice>) {
        match self
            .state
            .give_hint(now, self.config.hint_delay, &mut self.rng)
        {
            HintOutcome::Unavailable => {}
            HintOutcome::Exhausted => notices.push(Notice::NoMoreHints),
            HintOutcome::Cooldown(remaining) => notices.push(Notice::HintCooldown { remaining }),
            HintOutcome::Revealed { mask, remaining } => {
                debug!(mask = %mask, remaining, "hint given");
                notices.push(Notice::Hint { mask, remaining });
            }
        }
    }
}
