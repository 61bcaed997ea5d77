/// Prefix marking a chat message as a bot command.
pub const COMMAND_PREFIX: char = '!';

/// Commands understood by the bot. Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!topic` (random) or `!topic <name>`; words after the name are ignored.
    Topic(Option<String>),
    /// `!a`: print the answer when debugging is enabled.
    Answer,
    /// `!commands`
    Commands,
    /// `!start`
    Start,
    /// `!score`
    Score,
    /// `!topics`
    Topics,
    /// `!hint`
    Hint,
    /// Any other text starting with the prefix.
    Unknown(String),
}

impl Command {
    /// Parse `text` as a command. Returns `None` when it does not start with [`COMMAND_PREFIX`].
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_end();
        if !text.starts_with(COMMAND_PREFIX) {
            return None;
        }

        let command = match text {
            "!topic" => Command::Topic(None),
            "!a" => Command::Answer,
            "!commands" => Command::Commands,
            "!start" => Command::Start,
            "!score" => Command::Score,
            "!topics" => Command::Topics,
            "!hint" => Command::Hint,
            // Only the first word names the topic.
            other => match other.strip_prefix("!topic ") {
                Some(rest) => Command::Topic(rest.split_whitespace().next().map(Into::into)),
                None => Command::Unknown(other.into()),
            },
        };
        Some(command)
    }
}
