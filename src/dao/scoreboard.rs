//! Durable per-user scores backed by a JSON file.

use std::{
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ScoreboardError;

/// Text returned for users that never scored.
pub const UNKNOWN_USER: &str = "Unknown user";

/// Score record for a single chat user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntry {
    /// Latest display name seen for the user.
    pub name: String,
    /// Accumulated points.
    pub score: u64,
}

/// In-memory scoreboard, loaded once and rewritten wholesale on [`Scoreboard::persist`].
#[derive(Debug, Clone)]
pub struct Scoreboard {
    path: PathBuf,
    scores: IndexMap<String, ScoreEntry>,
}

impl Scoreboard {
    /// Load the scoreboard stored at `path`. A missing or blank file is an empty scoreboard.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ScoreboardError> {
        let path = path.into();
        let scores = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => IndexMap::new(),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| ScoreboardError::Decode {
                    path: path.clone(),
                    source,
                })?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => IndexMap::new(),
            Err(source) => return Err(ScoreboardError::Read { path, source }),
        };

        info!(path = %path.display(), users = scores.len(), "loaded scoreboard");
        Ok(Self { path, scores })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add `delta` points to `user_id`, creating the entry on first contact.
    ///
    /// The display name is always replaced by `display_name`.
    pub fn give_score(&mut self, user_id: &str, display_name: &str, delta: u64) {
        let entry = self
            .scores
            .entry(user_id.to_string())
            .or_insert_with(|| ScoreEntry {
                name: display_name.to_string(),
                score: 0,
            });
        entry.score = entry.score.saturating_add(delta);
        if entry.name != display_name {
            entry.name = display_name.to_string();
        }
        debug!(user_id, display_name, score = entry.score, "score updated");
    }

    /// Score entry for `user_id`, if the user ever scored.
    pub fn entry(&self, user_id: &str) -> Option<&ScoreEntry> {
        self.scores.get(user_id)
    }

    /// Chat message describing the score of `user_id`.
    pub fn get_message(&self, user_id: &str) -> String {
        match self.scores.get(user_id) {
            Some(entry) => format!("{}'s score is {}", entry.name, entry.score),
            None => UNKNOWN_USER.to_string(),
        }
    }

    /// Rewrite the backing file from memory through a temporary file and a rename.
    pub fn persist(&self) -> Result<(), ScoreboardError> {
        let data = serde_json::to_string_pretty(&self.scores).map_err(ScoreboardError::Encode)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let write_tmp = || -> io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(data.as_bytes())?;
            file.sync_all()
        };
        write_tmp().map_err(|source| ScoreboardError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| ScoreboardError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), users = self.scores.len(), "scoreboard persisted");
        Ok(())
    }
}
