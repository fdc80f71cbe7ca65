//! Passage selection.
//!
//! The selector walks the merged occurrence stream of one document, grows a
//! passage per boundary-delimited segment that contains matches, scores it,
//! and keeps the best `n` in a bounded min-heap. Passage storage lives in an
//! arena; passages that lose their place are reset and reused.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;

use crate::error::Result;
use crate::highlight::boundary::BoundaryProvider;
use crate::highlight::merger::OffsetStreamMerger;
use crate::highlight::passage::{Passage, PassageScore};
use crate::highlight::scorer::PassageScorer;

/// Passage storage addressed by slot index.
#[derive(Debug, Default)]
struct PassageArena {
    passages: Vec<Passage>,
    free: Vec<usize>,
}

impl PassageArena {
    fn acquire(&mut self) -> usize {
        match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.passages.push(Passage::new());
                self.passages.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) {
        self.passages[slot].reset();
        self.free.push(slot);
    }

    fn get(&self, slot: usize) -> &Passage {
        &self.passages[slot]
    }

    fn get_mut(&mut self, slot: usize) -> &mut Passage {
        &mut self.passages[slot]
    }

    fn take(&mut self, slot: usize) -> Passage {
        std::mem::take(&mut self.passages[slot])
    }
}

/// A retained passage, ordered so the heap top is the weakest one: lowest
/// score, then highest start offset.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    score: f32,
    start: usize,
    slot: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.start.cmp(&other.start))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// The `n` best passages seen so far.
#[derive(Debug)]
struct TopPassages {
    capacity: usize,
    heap: BinaryHeap<Ranked>,
    arena: PassageArena,
}

impl TopPassages {
    fn new(capacity: usize) -> Self {
        TopPassages {
            capacity,
            heap: BinaryHeap::new(),
            arena: PassageArena::default(),
        }
    }

    /// Offer the passage in `slot` with its final score. A full set keeps the
    /// candidate only if it beats the current minimum.
    fn offer(&mut self, slot: usize, score: f32) {
        let start = self.arena.get(slot).start_offset();
        if self.heap.len() >= self.capacity
            && self.heap.peek().is_some_and(|weakest| score <= weakest.score)
        {
            trace!("discarding passage at {start} with score {score}");
            self.arena.release(slot);
            return;
        }

        self.arena.get_mut(slot).set_score(PassageScore::Scored(score));
        self.heap.push(Ranked { score, start, slot });
        if self.heap.len() > self.capacity {
            if let Some(evicted) = self.heap.pop() {
                trace!("evicting passage at {} with score {}", evicted.start, evicted.score);
                self.arena.release(evicted.slot);
            }
        }
    }

    fn into_sorted(mut self) -> Vec<Passage> {
        let slots: Vec<usize> = self.heap.drain().map(|r| r.slot).collect();
        let mut passages: Vec<Passage> = slots
            .into_iter()
            .map(|slot| {
                let mut passage = self.arena.take(slot);
                passage.sort_matches();
                passage
            })
            .collect();
        passages.sort_by_key(Passage::start_offset);
        passages
    }
}

/// Selects and scores the top passages of one document.
#[derive(Debug, Clone, Copy)]
pub struct PassageSelector<'s> {
    scorer: &'s dyn PassageScorer,
    max_passages: usize,
}

impl<'s> PassageSelector<'s> {
    pub fn new(scorer: &'s dyn PassageScorer, max_passages: usize) -> Self {
        PassageSelector {
            scorer,
            max_passages,
        }
    }

    /// Consume `merger` and return at most `max_passages` passages sorted by
    /// start offset. The result is empty when no occurrence lies fully inside
    /// `content`.
    ///
    /// `boundary` must already be bound to `content`.
    pub fn select(
        &self,
        merger: &mut OffsetStreamMerger<'_>,
        boundary: &mut dyn BoundaryProvider,
        content: &str,
    ) -> Result<Vec<Passage>> {
        let content_length = content.len();
        let mut top = TopPassages::new(self.max_passages);
        // slot of the open passage and its score so far
        let mut current: Option<(usize, f32)> = None;

        while let Some((ordinal, mut span)) = merger.pop() {
            // straddles the truncation point: forget this term
            if span.start < content_length && span.end > content_length {
                continue;
            }

            let window_end = current.map(|(slot, _)| top.arena.get(slot).end_offset());
            if window_end.is_none_or(|end| span.start >= end) {
                if let Some((slot, score)) = current.take() {
                    let norm = self.scorer.norm(top.arena.get(slot).start_offset());
                    top.offer(slot, score * norm);
                }
                if span.start >= content_length {
                    return Ok(top.into_sorted());
                }

                let start = boundary.preceding(span.start + 1).unwrap_or(0);
                let end = boundary
                    .next()
                    .unwrap_or(content_length)
                    .min(content_length);
                let slot = top.arena.acquire();
                top.arena.get_mut(slot).open(start, end);
                current = Some((slot, 0.0));
            }

            let Some((slot, score)) = current.as_mut() else {
                continue;
            };
            let passage = top.arena.get(*slot);
            let (start, end) = (passage.start_offset(), passage.end_offset());

            let mut tf = 0;
            loop {
                tf += 1;
                top.arena
                    .get_mut(*slot)
                    .add_match(span.start, span.end, merger.term(ordinal).clone());
                match merger.next_in_window(ordinal, end)? {
                    Some(next) => span = next,
                    None => break,
                }
            }
            *score += merger.weight(ordinal) * self.scorer.tf(tf, end - start);
        }

        if let Some((slot, score)) = current {
            let norm = self.scorer.norm(top.arena.get(slot).start_offset());
            top.offer(slot, score * norm);
        }
        Ok(top.into_sorted())
    }
}

/// Up to `max_passages` consecutive segments from the start of the text,
/// used when nothing in the document matched.
pub fn leading_passages(boundary: &mut dyn BoundaryProvider, max_passages: usize) -> Vec<Passage> {
    let mut passages = Vec::new();
    let mut pos = boundary.first();
    while passages.len() < max_passages {
        let Some(next) = boundary.next() else {
            break;
        };
        passages.push(Passage::fallback(pos, next));
        pos = next;
    }
    passages
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::highlight::boundary::SegmentBoundaryProvider;
    use crate::highlight::merger::TermStream;
    use crate::highlight::scorer::Bm25PassageScorer;
    use crate::index::{Document, IndexReader, MemoryIndex, PostingsEnum};

    fn select(content: &str, terms: &[&str], max_passages: usize) -> Vec<Passage> {
        let docs = vec![Document::builder().add_text("body", content).build()];
        let index = MemoryIndex::from_documents(&docs).unwrap();
        let scorer = Bm25PassageScorer::default();

        let mut cursors: Vec<Box<dyn PostingsEnum + '_>> = terms
            .iter()
            .filter_map(|t| index.postings("body", t).unwrap())
            .collect();
        let mut streams = Vec::new();
        for (cursor, term) in cursors.iter_mut().zip(terms) {
            cursor.advance(0).unwrap();
            let weight = scorer.weight(content.len(), cursor.freq());
            streams.push(TermStream::new(Arc::from(*term), weight, cursor.as_mut()));
        }

        let mut merger = OffsetStreamMerger::new("body", content, streams).unwrap();
        let mut boundary = SegmentBoundaryProvider::sentence();
        boundary.set_text(content);
        PassageSelector::new(&scorer, max_passages)
            .select(&mut merger, &mut boundary, content)
            .unwrap()
    }

    #[test]
    fn test_single_match_passage() {
        let content = "The quick brown fox jumps. The lazy dog sleeps.";
        let passages = select(content, &["fox"], 1);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].start_offset(), 0);
        assert_eq!(passages[0].end_offset(), 27);
        assert_eq!(passages[0].num_matches(), 1);
        assert_eq!(passages[0].matches()[0].start_offset, 16);
        assert_eq!(passages[0].matches()[0].end_offset, 19);
    }

    #[test]
    fn test_two_terms_one_passage_score() {
        let content = "The quick brown fox jumps. The lazy dog sleeps.";
        let passages = select(content, &["quick", "fox"], 1);
        assert_eq!(passages.len(), 1);
        let passage = &passages[0];
        let starts: Vec<usize> = passage.matches().iter().map(|m| m.start_offset).collect();
        assert_eq!(starts, vec![4, 16]);

        let scorer = Bm25PassageScorer::default();
        let weight = scorer.weight(content.len(), 1);
        let expected = (weight * scorer.tf(1, 27) + weight * scorer.tf(1, 27)) * scorer.norm(0);
        assert_eq!(passage.score(), PassageScore::Scored(expected));
    }

    #[test]
    fn test_keeps_only_top_passages() {
        let content = "One test. Two words here. Test test test here. Nothing. Another test.";
        let passages = select(content, &["test"], 1);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].num_matches(), 3);
        assert_eq!(&content[passages[0].start_offset()..passages[0].end_offset()], "Test test test here. ");

        let passages = select(content, &["test"], 2);
        assert_eq!(passages.len(), 2);
        assert!(passages[0].end_offset() <= passages[1].start_offset());
    }

    #[test]
    fn test_no_match_gives_nothing() {
        let passages = select("Nothing to see here.", &["absent"], 3);
        assert!(passages.is_empty());
    }

    #[test]
    fn test_leading_passages() {
        let mut boundary = SegmentBoundaryProvider::sentence();
        boundary.set_text("First one. Second one. Third one.");
        let passages = leading_passages(&mut boundary, 2);
        assert_eq!(passages.len(), 2);
        assert_eq!((passages[0].start_offset(), passages[0].end_offset()), (0, 11));
        assert_eq!((passages[1].start_offset(), passages[1].end_offset()), (11, 23));
        assert!(passages.iter().all(|p| p.score().is_fallback()));
    }

    #[test]
    fn test_arena_reuses_released_slots() {
        let mut arena = PassageArena::default();
        let a = arena.acquire();
        arena.get_mut(a).open(3, 9);
        arena.get_mut(a).add_match(4, 5, Arc::from("x"));
        arena.release(a);

        let b = arena.acquire();
        assert_eq!(a, b);
        assert_eq!(arena.get(b), &Passage::new());
    }

    #[test]
    fn test_ties_keep_the_earlier_passage() {
        let mut top = TopPassages::new(1);
        let first = top.arena.acquire();
        top.arena.get_mut(first).open(0, 10);
        top.offer(first, 1.0);
        let second = top.arena.acquire();
        top.arena.get_mut(second).open(10, 20);
        top.offer(second, 1.0);

        let kept = top.into_sorted();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start_offset(), 0);
    }

    #[test]
    fn test_eviction_prefers_dropping_later_ties() {
        let mut top = TopPassages::new(2);
        for (start, score) in [(0, 1.0), (10, 1.0), (20, 2.0)] {
            let slot = top.arena.acquire();
            top.arena.get_mut(slot).open(start, start + 10);
            top.offer(slot, score);
        }

        let starts: Vec<usize> = top.into_sorted().iter().map(Passage::start_offset).collect();
        assert_eq!(starts, vec![0, 20]);
    }
}
