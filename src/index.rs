//! Index abstractions consumed by the highlighter, plus an in-memory index.
//!
//! The highlighter only talks to an index through [`IndexReader`],
//! [`PostingsEnum`] and [`StoredFieldVisitor`]. [`memory::MemoryIndex`] is a
//! complete implementation of those traits that keeps everything in memory.

use std::fmt;

use crate::error::Result;

pub mod document;
pub mod field;
pub mod memory;
pub mod postings;
pub mod searcher;
pub mod stored;
pub mod term;

pub use document::{Document, DocumentBuilder, Field};
pub use field::{FieldInfo, FieldOptions, IndexOptions};
pub use memory::{MemoryIndex, MemoryIndexConfig, MemoryIndexWriter};
pub use postings::{Occurrence, PostingsEnum};
pub use searcher::{IndexSearcher, ScoreDoc, TopDocs};
pub use stored::{DocumentCollector, StoredFieldVisitor, VisitStatus};
pub use term::Term;

/// Document identifier, dense and assigned in insertion order.
pub type DocId = u64;

/// Read access to an index.
pub trait IndexReader: Send + Sync + fmt::Debug {
    /// One more than the largest document id.
    fn max_doc(&self) -> u64;

    /// Metadata for `field`, or `None` if no document ever had it.
    fn field_info(&self, field: &str) -> Option<FieldInfo>;

    /// Metadata for every known field, ordered by name.
    fn fields(&self) -> Vec<FieldInfo>;

    /// The term dictionary of `field`, sorted.
    fn terms(&self, field: &str) -> Result<Vec<String>>;

    /// A fresh postings cursor for `term` in `field`, or `None` if the term
    /// does not occur in the field.
    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingsEnum + '_>>>;

    /// Feed the stored values of `doc` to `visitor`.
    fn document(&self, doc: DocId, visitor: &mut dyn StoredFieldVisitor) -> Result<()>;
}
