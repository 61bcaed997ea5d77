//! Bot configuration loading: a JSON file on disk plus credential overrides from the environment.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;

/// Default location on disk where the bot looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/trivia.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_BOT_CONFIG_PATH";
const USERNAME_ENV: &str = "TRIVIA_BOT_USERNAME";
const PASSWORD_ENV: &str = "TRIVIA_BOT_PASSWORD";

/// Connection settings for the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL of the chat server, e.g. `https://chat.example.com`.
    pub server: String,
    /// Bot account login.
    pub username: String,
    /// Bot account password.
    pub password: String,
    /// Name of the channel the game runs in.
    pub channel: String,
    /// Maximum number of messages requested per poll.
    pub history_count: u32,
}

/// Game tuning knobs handed to the game at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Enables the `!a` command.
    pub debug: bool,
    /// How long a question stays open before the answer is revealed.
    pub answer_timeout: Duration,
    /// Silence period after which an active game pauses itself.
    pub inactivity_timeout: Duration,
    /// Delay after the question (or the previous hint) before `!hint` is honoured.
    pub hint_delay: Duration,
    /// Whether the game starts active or paused.
    pub start_active: bool,
    /// Wait between two polls inside a round.
    pub poll_interval: Duration,
    /// Wait between the end of a round and the next question.
    pub round_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            debug: false,
            answer_timeout: Duration::from_secs(60),
            inactivity_timeout: Duration::from_secs(300),
            hint_delay: Duration::from_secs(15),
            start_active: true,
            poll_interval: Duration::from_millis(2_000),
            round_delay: Duration::from_millis(1_000),
        }
    }
}

/// Immutable runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Chat server settings.
    pub chat: ChatConfig,
    /// Game settings.
    pub game: GameConfig,
    /// Directory scanned for `*.txt` topic files.
    pub questions_dir: PathBuf,
    /// Location of the durable score store.
    pub scoreboard_path: PathBuf,
}

impl AppConfig {
    /// Load the configuration from the resolved path and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = resolve_config_path();
        let mut config = Self::from_file(&path)?;

        if let Ok(username) = env::var(USERNAME_ENV) {
            config.chat.username = username;
        }
        if let Ok(password) = env::var(PASSWORD_ENV) {
            config.chat.password = password;
        }
        config.validate()?;

        info!(
            path = %path.display(),
            server = %config.chat.server,
            channel = %config.chat.channel,
            "loaded bot configuration"
        );
        Ok(config)
    }

    /// Parse a configuration file without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("server", &self.chat.server),
            ("username", &self.chat.username),
            ("password", &self.chat.password),
            ("channel", &self.chat.channel),
        ];
        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("`{key}` must not be empty")));
        }
        if self.game.answer_timeout.is_zero() {
            return Err(ConfigError::Invalid("`timeout` must be positive".into()));
        }
        if self.game.inactivity_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "`activity_timeout` must be positive".into(),
            ));
        }
        if self.chat.history_count == 0 {
            return Err(ConfigError::Invalid("`history_count` must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    server: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    channel: String,
    #[serde(default)]
    debug: bool,
    #[serde(default = "default_timeout")]
    timeout: u64,
    #[serde(default = "default_activity_timeout")]
    activity_timeout: u64,
    #[serde(default = "default_hint_time")]
    hint_time: u64,
    #[serde(default = "default_true")]
    start_active: bool,
    #[serde(default = "default_questions_dir")]
    questions_dir: PathBuf,
    #[serde(default = "default_scoreboard_path")]
    scoreboard_path: PathBuf,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default = "default_round_delay_ms")]
    round_delay_ms: u64,
    #[serde(default = "default_history_count")]
    history_count: u32,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            chat: ChatConfig {
                server: value.server,
                username: value.username,
                password: value.password,
                channel: value.channel,
                history_count: value.history_count,
            },
            game: GameConfig {
                debug: value.debug,
                answer_timeout: Duration::from_secs(value.timeout),
                inactivity_timeout: Duration::from_secs(value.activity_timeout),
                hint_delay: Duration::from_secs(value.hint_time),
                start_active: value.start_active,
                poll_interval: Duration::from_millis(value.poll_interval_ms),
                round_delay: Duration::from_millis(value.round_delay_ms),
            },
            questions_dir: value.questions_dir,
            scoreboard_path: value.scoreboard_path,
        }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_activity_timeout() -> u64 {
    300
}

fn default_hint_time() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

fn default_questions_dir() -> PathBuf {
    PathBuf::from("questions")
}

fn default_scoreboard_path() -> PathBuf {
    PathBuf::from("scoreboard.json")
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_round_delay_ms() -> u64 {
    1_000
}

fn default_history_count() -> u32 {
    50
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_uses_defaults() {
        let config = AppConfig::from_json(
            r#"{"server": "https://chat.example.com", "channel": "trivia",
                "username": "bot", "password": "secret"}"#,
        )
        .unwrap();

        assert_eq!(config.game, GameConfig::default());
        assert_eq!(config.questions_dir, PathBuf::from("questions"));
        assert_eq!(config.scoreboard_path, PathBuf::from("scoreboard.json"));
        assert_eq!(config.chat.history_count, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timers_are_read_in_seconds() {
        let config = AppConfig::from_json(
            r#"{"server": "s", "channel": "c", "username": "u", "password": "p",
                "debug": true, "timeout": 30, "activity_timeout": 120,
                "hint_time": 10, "start_active": false}"#,
        )
        .unwrap();

        assert!(config.game.debug);
        assert!(!config.game.start_active);
        assert_eq!(config.game.answer_timeout, Duration::from_secs(30));
        assert_eq!(config.game.inactivity_timeout, Duration::from_secs(120));
        assert_eq!(config.game.hint_delay, Duration::from_secs(10));
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let config =
            AppConfig::from_json(r#"{"server": "https://chat.example.com", "channel": "trivia"}"#)
                .unwrap();

        match config.validate() {
            Err(ConfigError::Invalid(message)) => assert!(message.contains("username")),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = AppConfig::from_json(
            r#"{"server": "s", "channel": "c", "username": "u", "password": "p", "timeout": 0}"#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
