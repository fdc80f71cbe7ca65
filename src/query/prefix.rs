//! Prefix query implementation.

use std::any::Any;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::index::term::Term;
use crate::index::{DocId, IndexReader};
use crate::query::multi_term::{self, DEFAULT_MAX_EXPANSIONS};
use crate::query::query::Query;

/// A query matching every term of a field that starts with a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixQuery {
    field: String,
    prefix: String,
    max_expansions: usize,
}

impl PrefixQuery {
    pub fn new<F: Into<String>, P: Into<String>>(field: F, prefix: P) -> Self {
        PrefixQuery {
            field: field.into(),
            prefix: prefix.into(),
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }

    /// Cap the number of terms this query expands to.
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Query for PrefixQuery {
    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        multi_term::expand(
            reader,
            &self.field,
            self.max_expansions,
            &self.description(),
            |term| term.starts_with(&self.prefix),
        )
    }

    // Unrewritten multi-term queries contribute nothing.
    fn extract_terms(&self, _terms: &mut BTreeSet<Term>) {}

    fn doc_ids(&self, reader: &dyn IndexReader) -> Result<Vec<DocId>> {
        self.rewrite(reader)?.doc_ids(reader)
    }

    fn description(&self) -> String {
        format!("{}:{}*", self.field, self.prefix)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }
}
