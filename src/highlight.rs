//! Postings-based passage highlighting.
//!
//! The highlighter never re-analyzes text. It reads each query term's
//! positions and character offsets from the index, merges them in offset
//! order, groups them into boundary-delimited passages, scores the passages
//! with a BM25-family formula and renders the best ones.
//!
//! ```text
//! postings ─► OffsetStreamMerger ─► PassageSelector ─► PassageFormatter ─► snippet
//!                                        ▲
//!                          BoundaryProvider, PassageScorer
//! ```

pub mod boundary;
pub mod config;
pub(crate) mod field_loader;
pub mod formatter;
pub mod highlighter;
pub mod merger;
pub mod passage;
pub mod scorer;
pub mod selector;

pub use boundary::{BoundaryKind, BoundaryProvider, SegmentBoundaryProvider};
pub use config::{DEFAULT_MAX_LENGTH, HighlighterConfig};
pub use formatter::{DefaultPassageFormatter, FormatterConfig, PassageFormatter};
pub use highlighter::{DefaultStrategy, DocumentPassages, HighlightStrategy, PostingsHighlighter};
pub use merger::{OffsetStreamMerger, Span, TermStream};
pub use passage::{Match, Passage, PassageScore};
pub use scorer::{Bm25PassageScorer, PassageScorer, ScorerConfig};
pub use selector::{PassageSelector, leading_passages};
