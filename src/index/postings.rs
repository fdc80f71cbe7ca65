//! Postings cursors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::DocId;

/// One occurrence of a term inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Token position within the field.
    pub position: u32,
    /// Byte offset of the first character, when offsets were indexed.
    pub start_offset: Option<usize>,
    /// Byte offset one past the last character, when offsets were indexed.
    pub end_offset: Option<usize>,
}

impl Occurrence {
    pub fn new(position: u32, start_offset: usize, end_offset: usize) -> Self {
        Occurrence {
            position,
            start_offset: Some(start_offset),
            end_offset: Some(end_offset),
        }
    }

    /// Both offsets, if the postings carry them.
    pub fn offsets(&self) -> Option<(usize, usize)> {
        self.start_offset.zip(self.end_offset)
    }
}

/// A forward-only cursor over the documents containing one term, and over
/// the occurrences of that term inside the current document.
///
/// A fresh cursor is unpositioned: [`doc`](PostingsEnum::doc) returns `None`
/// until [`advance`](PostingsEnum::advance) or
/// [`next_doc`](PostingsEnum::next_doc) is called. Once the documents run
/// out the cursor is exhausted and stays so.
pub trait PostingsEnum: Send + fmt::Debug {
    /// The current document, or `None` when unpositioned or exhausted.
    fn doc(&self) -> Option<DocId>;

    /// Move to the first document at or after `target`, never backwards.
    fn advance(&mut self, target: DocId) -> Result<Option<DocId>>;

    /// Move to the next document.
    fn next_doc(&mut self) -> Result<Option<DocId>>;

    /// Number of occurrences in the current document.
    fn freq(&self) -> u32;

    /// The next occurrence in the current document, in position order.
    ///
    /// Returns `None` after [`freq`](PostingsEnum::freq) occurrences, or
    /// immediately when positions were not indexed.
    fn next_position(&mut self) -> Result<Option<Occurrence>>;

    /// Whether the cursor has run out of documents.
    fn is_exhausted(&self) -> bool;
}
