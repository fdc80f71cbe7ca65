//! K-way merge of per-term occurrence streams.
//!
//! Each query term present in the document contributes one stream of
//! occurrences in offset order. The merger interleaves them by
//! `(start offset, term ordinal)` using a binary heap holding at most one
//! pending occurrence per stream, so positions are read lazily and never
//! materialized up front.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;

use crate::error::{GlaiveError, Result};
use crate::index::postings::PostingsEnum;

/// A byte range of one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One query term's postings, positioned on the document being highlighted.
pub struct TermStream<'a> {
    term: Arc<str>,
    weight: f32,
    postings: &'a mut dyn PostingsEnum,
}

impl<'a> TermStream<'a> {
    pub fn new(term: Arc<str>, weight: f32, postings: &'a mut dyn PostingsEnum) -> Self {
        TermStream {
            term,
            weight,
            postings,
        }
    }

    pub fn term(&self) -> &Arc<str> {
        &self.term
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }
}

impl fmt::Debug for TermStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermStream")
            .field("term", &self.term)
            .field("weight", &self.weight)
            .field("doc", &self.postings.doc())
            .finish()
    }
}

/// Merges term streams in offset order.
///
/// Ordinals are indexes into the stream list given to
/// [`new`](OffsetStreamMerger::new); ties on start offset go to the lower
/// ordinal. A stream whose occurrences run out is dropped, and
/// [`pop`](OffsetStreamMerger::pop) returns `None` once every stream is gone.
#[derive(Debug)]
pub struct OffsetStreamMerger<'a> {
    field: &'a str,
    content: &'a str,
    streams: Vec<TermStream<'a>>,
    queue: BinaryHeap<Reverse<(usize, usize, usize)>>,
}

impl<'a> OffsetStreamMerger<'a> {
    /// Seed the merge with the first occurrence of every stream.
    ///
    /// `content` is the (possibly truncated) field text; occurrences are
    /// checked against it as they are read.
    pub fn new(field: &'a str, content: &'a str, streams: Vec<TermStream<'a>>) -> Result<Self> {
        let mut merger = OffsetStreamMerger {
            field,
            content,
            queue: BinaryHeap::with_capacity(streams.len()),
            streams,
        };
        for ordinal in 0..merger.streams.len() {
            if let Some(span) = merger.read(ordinal)? {
                merger.push_back(ordinal, span);
            }
        }
        Ok(merger)
    }

    /// Number of streams still queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn term(&self, ordinal: usize) -> &Arc<str> {
        self.streams[ordinal].term()
    }

    pub fn weight(&self, ordinal: usize) -> f32 {
        self.streams[ordinal].weight()
    }

    /// Remove and return the earliest pending occurrence.
    pub fn pop(&mut self) -> Option<(usize, Span)> {
        self.queue
            .pop()
            .map(|Reverse((start, ordinal, end))| (ordinal, Span { start, end }))
    }

    /// Queue `span` as the pending occurrence of `ordinal`.
    pub fn push_back(&mut self, ordinal: usize, span: Span) {
        self.queue.push(Reverse((span.start, ordinal, span.end)));
    }

    /// Read the next occurrence of `ordinal` if it lies inside the window
    /// ending at `window_end` and within the content.
    ///
    /// An occurrence outside the window is queued again and `None` is
    /// returned; a stream with no more occurrences is dropped.
    pub fn next_in_window(&mut self, ordinal: usize, window_end: usize) -> Result<Option<Span>> {
        match self.read(ordinal)? {
            Some(span) if span.start >= window_end || span.end > self.content.len() => {
                self.push_back(ordinal, span);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn read(&mut self, ordinal: usize) -> Result<Option<Span>> {
        let Some(occurrence) = self.streams[ordinal].postings.next_position()? else {
            return Ok(None);
        };
        let (start, end) = occurrence
            .offsets()
            .ok_or_else(|| GlaiveError::offsets_not_indexed(self.field))?;

        let on_boundary = |offset: usize| {
            offset > self.content.len() || self.content.is_char_boundary(offset)
        };
        if start > end || !on_boundary(start) || !on_boundary(end) {
            return Err(GlaiveError::highlight(format!(
                "invalid offsets [{start}, {end}) for term '{}' in field '{}'",
                self.streams[ordinal].term, self.field
            )));
        }
        Ok(Some(Span { start, end }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Document, IndexReader, MemoryIndex};

    #[test]
    fn test_merges_in_offset_order() {
        let content = "b a b c a";
        let docs = vec![Document::builder().add_text("body", content).build()];
        let index = MemoryIndex::from_documents(&docs).unwrap();

        let mut a = index.postings("body", "a").unwrap().unwrap();
        let mut b = index.postings("body", "b").unwrap().unwrap();
        a.advance(0).unwrap();
        b.advance(0).unwrap();
        let streams = vec![
            TermStream::new(Arc::from("a"), 1.0, a.as_mut()),
            TermStream::new(Arc::from("b"), 2.0, b.as_mut()),
        ];
        let mut merger = OffsetStreamMerger::new("body", content, streams).unwrap();
        assert_eq!(merger.len(), 2);

        let mut order = Vec::new();
        while let Some((ordinal, span)) = merger.pop() {
            order.push((merger.term(ordinal).to_string(), span.start));
            if let Some(next) = merger.next_in_window(ordinal, 0).unwrap() {
                panic!("window of zero width returned {next:?}");
            }
        }
        assert_eq!(
            order,
            vec![
                ("b".to_string(), 0),
                ("a".to_string(), 2),
                ("b".to_string(), 4),
                ("a".to_string(), 8)
            ]
        );
        assert!(merger.is_empty());
    }

    #[test]
    fn test_next_in_window() {
        let content = "x x. y x";
        let docs = vec![Document::builder().add_text("body", content).build()];
        let index = MemoryIndex::from_documents(&docs).unwrap();

        let mut x = index.postings("body", "x").unwrap().unwrap();
        x.advance(0).unwrap();
        let streams = vec![TermStream::new(Arc::from("x"), 1.0, x.as_mut())];
        let mut merger = OffsetStreamMerger::new("body", content, streams).unwrap();

        let (ordinal, first) = merger.pop().unwrap();
        assert_eq!(first, Span { start: 0, end: 1 });
        assert_eq!(
            merger.next_in_window(ordinal, 5).unwrap(),
            Some(Span { start: 2, end: 3 })
        );
        assert_eq!(merger.next_in_window(ordinal, 5).unwrap(), None);
        assert_eq!(merger.pop(), Some((0, Span { start: 7, end: 8 })));
        assert_eq!(merger.next_in_window(ordinal, 100).unwrap(), None);
        assert!(merger.pop().is_none());
    }
}
