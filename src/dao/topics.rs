//! Topic discovery and question file parsing.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use rand::{Rng, seq::IteratorRandom};
use tracing::{debug, info};

use crate::{
    error::TopicError,
    state::game::{LoadedTopic, Question},
};

/// Extension of files recognised as topics.
const TOPIC_EXTENSION: &str = "txt";
/// Separator between the question text and its answers on a topic line.
const ANSWER_DELIMITER: char = '`';

/// Index of the topic files available under the questions directory.
#[derive(Debug, Clone)]
pub struct TopicLoader {
    topics: BTreeMap<String, PathBuf>,
}

impl TopicLoader {
    /// Scan `dir` for topic files.
    ///
    /// A missing directory or an empty index is a startup failure.
    pub fn discover(dir: &Path) -> Result<Self, TopicError> {
        if !dir.is_dir() {
            return Err(TopicError::DirectoryMissing {
                path: dir.to_path_buf(),
            });
        }

        let entries = fs::read_dir(dir).map_err(|source| TopicError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut topics = BTreeMap::new();
        for entry in entries {
            let path = entry
                .map_err(|source| TopicError::Scan {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != TOPIC_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                topics.insert(name.to_string(), path.clone());
            }
        }

        if topics.is_empty() {
            return Err(TopicError::NoTopics {
                path: dir.to_path_buf(),
            });
        }

        info!(dir = %dir.display(), count = topics.len(), "discovered topics");
        Ok(Self { topics })
    }

    /// Sorted names of the known topics.
    pub fn names(&self) -> Vec<String> {
        self.topics.keys().cloned().collect()
    }

    /// Load the named topic, or a uniformly random one when `name` is `None`.
    pub fn load<R: Rng + ?Sized>(
        &self,
        name: Option<&str>,
        rng: &mut R,
    ) -> Result<LoadedTopic, TopicError> {
        let (name, path) = match name {
            Some(name) => self
                .topics
                .get_key_value(name)
                .ok_or_else(|| TopicError::NotFound {
                    name: name.to_string(),
                })?,
            // The index is never empty once discovered.
            None => self
                .topics
                .iter()
                .choose(rng)
                .ok_or_else(|| TopicError::NotFound {
                    name: String::new(),
                })?,
        };

        let contents = fs::read_to_string(path).map_err(|source| TopicError::Read {
            path: path.clone(),
            source,
        })?;
        let questions = parse_questions(&contents);
        if questions.is_empty() {
            return Err(TopicError::Empty { name: name.clone() });
        }

        debug!(topic = %name, questions = questions.len(), "parsed topic file");
        Ok(LoadedTopic {
            name: name.clone(),
            questions,
        })
    }
}

/// Parse `question`answer[`alias...]` lines, skipping lines without an answer.
pub fn parse_questions(contents: &str) -> Vec<Arc<Question>> {
    contents
        .lines()
        .filter_map(|line| {
            let mut parts = line.split(ANSWER_DELIMITER);
            let prompt = parts.next()?;
            if prompt.trim().is_empty() {
                return None;
            }
            Question::new(prompt, parts).map(Arc::new)
        })
        .collect()
}
