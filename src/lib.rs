//! # Glaive
//!
//! Postings-based passage highlighting for full-text search.
//!
//! Given a query and a set of matching documents, Glaive picks the most
//! relevant excerpts of each document and marks the query terms in them. It
//! reads term positions and character offsets straight from the index instead
//! of re-analyzing the text, so highlighting costs little more than loading
//! the stored field.
//!
//! ## Features
//!
//! - Offset-ordered merge of per-term postings, read lazily
//! - Sentence, word, line or whole-text passages
//! - BM25-style passage scoring with a bounded top-N selection
//! - Pluggable boundary providers, scorers and formatters
//! - A small in-memory index, analysis chain and query parser to drive it
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use glaive::prelude::*;
//!
//! let docs = vec![
//!     Document::builder()
//!         .add_text("body", "This is a test. Just a test highlighting from postings. Feel free to ignore.")
//!         .build(),
//! ];
//! let searcher = IndexSearcher::new(Arc::new(MemoryIndex::from_documents(&docs).unwrap()));
//! let query = QueryParser::standard().unwrap().with_default_field("body").parse("highlighting").unwrap();
//! let top_docs = searcher.search(query.as_ref(), 10).unwrap();
//!
//! let highlighter = PostingsHighlighter::default();
//! let snippets = highlighter.highlight("body", query.as_ref(), &searcher, &top_docs, 1).unwrap();
//! assert_eq!(snippets[&0], "Just a test <b>highlighting</b> from postings. ");
//! ```

pub mod analysis;
pub mod cli;
pub mod error;
pub mod highlight;
pub mod index;
pub mod query;

pub mod prelude {
    pub use crate::analysis::{Analyzer, StandardAnalyzer};
    pub use crate::error::{GlaiveError, Result};
    pub use crate::highlight::{
        BoundaryKind, HighlightStrategy, HighlighterConfig, Passage, PassageFormatter,
        PassageScorer, PostingsHighlighter,
    };
    pub use crate::index::{
        DocId, Document, IndexReader, IndexSearcher, MemoryIndex, MemoryIndexConfig,
        MemoryIndexWriter, TopDocs,
    };
    pub use crate::query::{BooleanQuery, PhraseQuery, Query, QueryParser, TermQuery};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
