//! Text boundary providers.
//!
//! A boundary provider is a cursor over the segment edges of one text. Edges
//! are byte offsets; offset `0` and the text length are always edges of a
//! non-empty text. The navigation methods follow the usual break-iterator
//! contract:
//!
//! - [`following`](BoundaryProvider::following) returns the first edge
//!   strictly after an offset;
//! - [`preceding`](BoundaryProvider::preceding) returns the last edge strictly
//!   before an offset;
//! - [`next`](BoundaryProvider::next) and
//!   [`previous`](BoundaryProvider::previous) step from the current edge.
//!
//! Each returns `None` when no such edge exists, and otherwise moves the
//! cursor to the edge it returns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{GlaiveError, Result};

/// Locates segment edges in a text.
pub trait BoundaryProvider: Send + fmt::Debug {
    /// Bind the provider to `text` and move the cursor to the first edge.
    fn set_text(&mut self, text: &str);

    /// Move to the first edge and return it.
    fn first(&mut self) -> usize;

    /// The edge the cursor is on.
    fn current(&self) -> usize;

    /// Move to the edge after the current one.
    fn next(&mut self) -> Option<usize>;

    /// Move to the edge before the current one.
    fn previous(&mut self) -> Option<usize>;

    /// Move to the first edge greater than `offset`.
    fn following(&mut self, offset: usize) -> Option<usize>;

    /// Move to the last edge smaller than `offset`.
    fn preceding(&mut self, offset: usize) -> Option<usize>;
}

/// The segmentation a [`SegmentBoundaryProvider`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Unicode sentence boundaries (UAX #29).
    #[default]
    Sentence,
    /// Unicode word boundaries (UAX #29).
    Word,
    /// Hard line breaks: an edge follows every `\n`.
    Line,
    /// The whole text is one segment.
    Whole,
}

impl BoundaryKind {
    /// A fresh provider of this kind.
    pub fn provider(self) -> Box<dyn BoundaryProvider> {
        Box::new(SegmentBoundaryProvider::new(self))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryKind::Sentence => "sentence",
            BoundaryKind::Word => "word",
            BoundaryKind::Line => "line",
            BoundaryKind::Whole => "whole",
        }
    }

    fn edges(self, text: &str) -> Vec<usize> {
        let mut edges: Vec<usize> = match self {
            BoundaryKind::Sentence => text.split_sentence_bound_indices().map(|(i, _)| i).collect(),
            BoundaryKind::Word => text.split_word_bound_indices().map(|(i, _)| i).collect(),
            BoundaryKind::Line => std::iter::once(0)
                .chain(text.match_indices('\n').map(|(i, _)| i + 1))
                .collect(),
            BoundaryKind::Whole => vec![0],
        };
        if edges.first() != Some(&0) {
            edges.insert(0, 0);
        }
        if edges.last() != Some(&text.len()) {
            edges.push(text.len());
        }
        edges
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryKind {
    type Err = GlaiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sentence" => Ok(BoundaryKind::Sentence),
            "word" => Ok(BoundaryKind::Word),
            "line" => Ok(BoundaryKind::Line),
            "whole" | "whole-text" => Ok(BoundaryKind::Whole),
            other => Err(GlaiveError::invalid_argument(format!(
                "unknown boundary kind '{other}', expected sentence, word, line or whole"
            ))),
        }
    }
}

/// A boundary provider over precomputed segment edges.
#[derive(Debug, Clone)]
pub struct SegmentBoundaryProvider {
    kind: BoundaryKind,
    edges: Vec<usize>,
    index: usize,
}

impl SegmentBoundaryProvider {
    pub fn new(kind: BoundaryKind) -> Self {
        SegmentBoundaryProvider {
            kind,
            edges: vec![0],
            index: 0,
        }
    }

    pub fn sentence() -> Self {
        Self::new(BoundaryKind::Sentence)
    }

    pub fn word() -> Self {
        Self::new(BoundaryKind::Word)
    }

    pub fn line() -> Self {
        Self::new(BoundaryKind::Line)
    }

    pub fn whole() -> Self {
        Self::new(BoundaryKind::Whole)
    }

    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    /// All edges of the bound text.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    fn move_to(&mut self, index: usize) -> Option<usize> {
        let edge = self.edges.get(index).copied()?;
        self.index = index;
        Some(edge)
    }
}

impl BoundaryProvider for SegmentBoundaryProvider {
    fn set_text(&mut self, text: &str) {
        self.edges = self.kind.edges(text);
        self.index = 0;
    }

    fn first(&mut self) -> usize {
        self.index = 0;
        self.edges[0]
    }

    fn current(&self) -> usize {
        self.edges[self.index]
    }

    fn next(&mut self) -> Option<usize> {
        self.move_to(self.index + 1)
    }

    fn previous(&mut self) -> Option<usize> {
        self.move_to(self.index.checked_sub(1)?)
    }

    fn following(&mut self, offset: usize) -> Option<usize> {
        let index = self.edges.partition_point(|&edge| edge <= offset);
        self.move_to(index)
    }

    fn preceding(&mut self, offset: usize) -> Option<usize> {
        let index = self.edges.partition_point(|&edge| edge < offset);
        self.move_to(index.checked_sub(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_edges() {
        let text = "This is a test. Just a test highlighting from postings. Feel free to ignore.";
        let mut provider = SegmentBoundaryProvider::sentence();
        provider.set_text(text);
        assert_eq!(provider.edges(), &[0, 16, 56, text.len()]);

        assert_eq!(provider.preceding(24), Some(16));
        assert_eq!(provider.next(), Some(56));
        assert_eq!(provider.following(56), Some(text.len()));
        assert_eq!(provider.next(), None);
        assert_eq!(provider.current(), text.len());
        assert_eq!(provider.previous(), Some(56));
    }

    #[test]
    fn test_lowercase_after_period_is_one_sentence() {
        let text = "test this is.  another sentence this test has.  far away is that planet.";
        let mut provider = SegmentBoundaryProvider::sentence();
        provider.set_text(text);
        assert_eq!(provider.edges(), &[0, text.len()]);
    }

    #[test]
    fn test_word_edges() {
        let mut provider = SegmentBoundaryProvider::word();
        provider.set_text("hello, world");
        assert_eq!(provider.edges(), &[0, 5, 6, 7, 12]);
        assert_eq!(provider.preceding(8), Some(7));
        assert_eq!(provider.next(), Some(12));
    }

    #[test]
    fn test_line_edges() {
        let mut provider = SegmentBoundaryProvider::line();
        provider.set_text("one\ntwo\n");
        assert_eq!(provider.edges(), &[0, 4, 8]);

        provider.set_text("no newline");
        assert_eq!(provider.edges(), &[0, 10]);
    }

    #[test]
    fn test_whole_text() {
        let mut provider = SegmentBoundaryProvider::whole();
        provider.set_text("Any text. At all.");
        assert_eq!(provider.first(), 0);
        assert_eq!(provider.next(), Some(17));
        assert_eq!(provider.next(), None);
        assert_eq!(provider.preceding(5), Some(0));
        assert_eq!(provider.preceding(0), None);
        assert_eq!(provider.following(17), None);
    }

    #[test]
    fn test_empty_text() {
        let mut provider = SegmentBoundaryProvider::sentence();
        provider.set_text("");
        assert_eq!(provider.first(), 0);
        assert_eq!(provider.next(), None);
        assert_eq!(provider.following(0), None);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Sentence".parse::<BoundaryKind>().unwrap(), BoundaryKind::Sentence);
        assert_eq!("whole-text".parse::<BoundaryKind>().unwrap(), BoundaryKind::Whole);
        assert!("paragraph".parse::<BoundaryKind>().is_err());
        assert_eq!(BoundaryKind::Line.to_string(), "line");
    }
}
