//! Error types for topic loading, score persistence and configuration.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures raised while discovering or loading topic files.
#[derive(Debug, Error)]
pub enum TopicError {
    /// The configured questions directory does not exist.
    #[error("unable to find questions directory `{}`", path.display())]
    DirectoryMissing {
        /// Directory that was scanned.
        path: PathBuf,
    },
    /// The questions directory could not be listed.
    #[error("failed to scan questions directory `{}`", path.display())]
    Scan {
        /// Directory that was scanned.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The questions directory holds no topic files.
    #[error("no topics found in `{}`", path.display())]
    NoTopics {
        /// Directory that was scanned.
        path: PathBuf,
    },
    /// A topic with the requested name is not known.
    #[error("unknown topic `{name}`")]
    NotFound {
        /// Requested topic name.
        name: String,
    },
    /// The topic file could not be read.
    #[error("failed to read topic file `{}`", path.display())]
    Read {
        /// Topic file path.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The topic file parsed to zero questions.
    #[error("topic `{name}` contains no questions")]
    Empty {
        /// Topic name.
        name: String,
    },
}

impl TopicError {
    /// Whether the error comes from a user asking for a topic that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TopicError::NotFound { .. })
    }
}

/// Failures raised by the durable score store.
#[derive(Debug, Error)]
pub enum ScoreboardError {
    /// The store file exists but could not be read.
    #[error("failed to read scoreboard `{}`", path.display())]
    Read {
        /// Store path.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The store file content is not a valid scoreboard document.
    #[error("failed to decode scoreboard `{}`", path.display())]
    Decode {
        /// Store path.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Serializing the in-memory scores failed.
    #[error("failed to encode scoreboard")]
    Encode(#[source] serde_json::Error),
    /// Writing or renaming the store file failed.
    #[error("failed to write scoreboard `{}`", path.display())]
    Write {
        /// Path that was being written.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures raised while loading the bot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config `{}`", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid JSON for the expected schema.
    #[error("failed to parse config `{}`", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A required value is missing or out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
