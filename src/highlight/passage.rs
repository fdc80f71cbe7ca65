//! Passages and the matches they contain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// How a passage was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PassageScore {
    /// Selected for its relevance score.
    Scored(f32),
    /// One of the leading segments returned when nothing matched.
    Fallback,
}

impl PassageScore {
    /// The relevance score, if the passage was scored.
    pub fn value(&self) -> Option<f32> {
        match self {
            PassageScore::Scored(score) => Some(*score),
            PassageScore::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PassageScore::Fallback)
    }
}

impl Default for PassageScore {
    fn default() -> Self {
        PassageScore::Scored(0.0)
    }
}

/// One highlighted term occurrence inside a passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub start_offset: usize,
    pub end_offset: usize,
    /// The query term that matched.
    pub term: Arc<str>,
}

/// A contiguous excerpt of field text, `[start_offset, end_offset)` in bytes.
///
/// Matches are recorded in occurrence order and sorted by
/// [`sort_matches`](Passage::sort_matches) once the passage is final.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    start_offset: usize,
    end_offset: usize,
    score: PassageScore,
    matches: Vec<Match>,
}

impl Passage {
    /// An empty passage.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fallback passage over `[start_offset, end_offset)`.
    pub fn fallback(start_offset: usize, end_offset: usize) -> Self {
        Passage {
            start_offset,
            end_offset,
            score: PassageScore::Fallback,
            matches: Vec::new(),
        }
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    pub fn score(&self) -> PassageScore {
        self.score
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn num_matches(&self) -> usize {
        self.matches.len()
    }

    pub(crate) fn open(&mut self, start_offset: usize, end_offset: usize) {
        self.start_offset = start_offset;
        self.end_offset = end_offset;
    }

    pub(crate) fn set_score(&mut self, score: PassageScore) {
        self.score = score;
    }

    pub(crate) fn add_match(&mut self, start_offset: usize, end_offset: usize, term: Arc<str>) {
        self.matches.push(Match {
            start_offset,
            end_offset,
            term,
        });
    }

    /// Order matches by start offset; equal starts keep occurrence order.
    pub fn sort_matches(&mut self) {
        self.matches.sort_by_key(|m| m.start_offset);
    }

    /// Clear every field so the passage can be reused.
    pub fn reset(&mut self) {
        self.start_offset = 0;
        self.end_offset = 0;
        self.score = PassageScore::default();
        self.matches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_and_reset() {
        let term: Arc<str> = Arc::from("test");
        let mut passage = Passage::new();
        passage.open(10, 40);
        passage.add_match(30, 34, Arc::clone(&term));
        passage.add_match(12, 16, Arc::clone(&term));
        passage.set_score(PassageScore::Scored(1.5));

        passage.sort_matches();
        let starts: Vec<usize> = passage.matches().iter().map(|m| m.start_offset).collect();
        assert_eq!(starts, vec![12, 30]);
        assert_eq!(passage.len(), 30);
        assert_eq!(passage.score().value(), Some(1.5));

        passage.reset();
        assert_eq!(passage, Passage::new());
        assert_eq!(passage.num_matches(), 0);
    }

    #[test]
    fn test_fallback_score() {
        let passage = Passage::fallback(0, 5);
        assert!(passage.score().is_fallback());
        assert_eq!(passage.score().value(), None);
    }
}
