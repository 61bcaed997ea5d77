//! Progressive reveal of the current answer.
//!
//! Each hint picks one distinct letter of the answer that is still hidden and uncovers every
//! position holding it. Characters that are not alphanumeric (spaces, punctuation) are shown
//! from the start and never count as letters.

use std::collections::BTreeSet;

use rand::{Rng, seq::IteratorRandom};

/// Glyph rendered for positions that are still hidden.
pub const MASK_GLYPH: char = '*';

/// Result of a single [`HintState::reveal_next`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintReveal {
    /// Mask after the call.
    pub mask: String,
    /// Letter uncovered by this call, `None` when the hints were already used up.
    pub letter: Option<char>,
    /// No further hint can be given.
    pub exhausted: bool,
}

/// Hint bookkeeping for the answer of the active round.
#[derive(Debug, Clone)]
pub struct HintState {
    answer: Vec<char>,
    positions_revealed: BTreeSet<usize>,
    letters_revealed: BTreeSet<char>,
    hints_given: usize,
    hints_available: usize,
}

fn is_hidden_letter(c: char) -> bool {
    c.is_alphanumeric()
}

impl HintState {
    /// Prepare hints for `answer`.
    ///
    /// `hints_available = min(len / 3, distinct letters)`.
    pub fn prepare(answer: &str) -> Self {
        let answer: Vec<char> = answer.chars().collect();
        let distinct = answer
            .iter()
            .copied()
            .filter(|c| is_hidden_letter(*c))
            .collect::<BTreeSet<_>>()
            .len();
        let hints_available = (answer.len() / 3).min(distinct);

        Self {
            answer,
            positions_revealed: BTreeSet::new(),
            letters_revealed: BTreeSet::new(),
            hints_given: 0,
            hints_available,
        }
    }

    /// Number of hints handed out this round.
    pub fn hints_given(&self) -> usize {
        self.hints_given
    }

    /// Upper bound on hints for this answer.
    pub fn hints_available(&self) -> usize {
        self.hints_available
    }

    /// Hints left before exhaustion.
    pub fn remaining(&self) -> usize {
        self.hints_available - self.hints_given
    }

    /// Whether every available hint has been given.
    pub fn is_exhausted(&self) -> bool {
        self.hints_given >= self.hints_available
    }

    /// Letters uncovered so far.
    pub fn letters_revealed(&self) -> &BTreeSet<char> {
        &self.letters_revealed
    }

    /// Current rendering of the answer; same length as the answer.
    pub fn mask(&self) -> String {
        self.answer
            .iter()
            .enumerate()
            .map(|(index, &c)| {
                if !is_hidden_letter(c) || self.positions_revealed.contains(&index) {
                    c
                } else {
                    MASK_GLYPH
                }
            })
            .collect()
    }

    /// Uncover every occurrence of one random hidden letter.
    ///
    /// Once exhausted, further calls change nothing and report the same mask.
    pub fn reveal_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> HintReveal {
        if self.is_exhausted() {
            return HintReveal {
                mask: self.mask(),
                letter: None,
                exhausted: true,
            };
        }

        let letter = self
            .answer
            .iter()
            .copied()
            .filter(|c| is_hidden_letter(*c) && !self.letters_revealed.contains(c))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .choose(rng);

        if let Some(letter) = letter {
            self.letters_revealed.insert(letter);
            for (index, _) in self.answer.iter().enumerate().filter(|(_, c)| **c == letter) {
                self.positions_revealed.insert(index);
            }
            self.hints_given += 1;
        } else {
            // Nothing left to uncover; close the hint budget.
            self.hints_given = self.hints_available;
        }

        HintReveal {
            mask: self.mask(),
            letter,
            exhausted: self.is_exhausted(),
        }
    }
}
