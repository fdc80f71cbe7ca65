//! Base query trait.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::error::Result;
use crate::index::term::Term;
use crate::index::{DocId, IndexReader};

/// Trait for search queries.
///
/// Highlighting needs two things from a query: its primitive form, obtained
/// with [`rewrite`](Query::rewrite), and the concrete terms of that form, via
/// [`extract_terms`](Query::extract_terms). Multi-term queries (prefix,
/// wildcard) contribute no terms until rewritten against a reader.
pub trait Query: Send + Sync + Debug {
    /// Rewrite to a primitive form made only of term, phrase and boolean
    /// queries.
    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>>;

    /// Add every term this query can match on to `terms`.
    fn extract_terms(&self, terms: &mut BTreeSet<Term>);

    /// Ids of the matching documents, ascending.
    fn doc_ids(&self, reader: &dyn IndexReader) -> Result<Vec<DocId>>;

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;

    /// Get this query as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The field this query searches in, if it targets exactly one.
    fn field(&self) -> Option<&str> {
        None
    }
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
