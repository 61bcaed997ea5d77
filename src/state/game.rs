use std::sync::Arc;

/// Normalise answer text for comparison: lowercase, trimmed, inner whitespace collapsed.
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single trivia question parsed from a topic file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Text shown to players.
    pub prompt: String,
    /// Normalised accepted answers, deduplicated, in the order they appear in the topic file.
    pub accepted_answers: Vec<String>,
}

impl Question {
    /// Build a question from its prompt and raw candidate answers.
    ///
    /// Returns `None` when no candidate survives normalisation.
    pub fn new<'a>(prompt: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut accepted_answers: Vec<String> = Vec::new();
        for candidate in candidates {
            let normalized = normalize_answer(candidate);
            if !normalized.is_empty() && !accepted_answers.contains(&normalized) {
                accepted_answers.push(normalized);
            }
        }

        if accepted_answers.is_empty() {
            return None;
        }

        Some(Self {
            prompt: prompt.trim().to_string(),
            accepted_answers,
        })
    }

    /// Shortest accepted answer; the earliest listed one wins ties.
    pub fn canonical_answer(&self) -> &str {
        self.accepted_answers
            .iter()
            .min_by_key(|answer| answer.chars().count())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Exact match of the normalised attempt against the accepted answers.
    pub fn accepts(&self, attempt: &str) -> bool {
        let attempt = normalize_answer(attempt);
        self.accepted_answers.iter().any(|answer| *answer == attempt)
    }
}

/// Questions of the topic currently in play.
#[derive(Debug, Clone)]
pub struct LoadedTopic {
    /// Topic name (file stem).
    pub name: String,
    /// Parsed questions; never empty.
    pub questions: Vec<Arc<Question>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_ignores_case_and_whitespace() {
        assert_eq!(normalize_answer("  PARIS "), "paris");
        assert_eq!(normalize_answer("New   York\t"), "new york");
        assert_eq!(normalize_answer("   "), "");
    }

    #[test]
    fn canonical_answer_is_shortest_with_stable_ties() {
        let question = Question::new("Q", ["United Kingdom", "UK", "GB"]).unwrap();
        assert_eq!(question.canonical_answer(), "uk");

        let question = Question::new("Q", ["Paris"]).unwrap();
        assert_eq!(question.canonical_answer(), "paris");
    }

    #[test]
    fn accepts_requires_exact_normalised_match() {
        let question = Question::new("Capital of France?", ["Paris", "City of Light"]).unwrap();

        assert!(question.accepts("PARIS "));
        assert!(question.accepts("city  of light"));
        assert!(!question.accepts("par"));
        assert!(!question.accepts("paris france"));
    }

    #[test]
    fn duplicate_and_blank_candidates_are_dropped() {
        let question = Question::new("Q", ["Paris", " paris", "  "]).unwrap();
        assert_eq!(question.accepted_answers, vec!["paris".to_string()]);

        assert!(Question::new("Q", ["", "  "]).is_none());
    }
}
