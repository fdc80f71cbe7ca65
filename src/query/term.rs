//! Term query implementation for exact term matching.

use std::any::Any;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::index::term::Term;
use crate::index::{DocId, IndexReader};
use crate::query::query::Query;

/// A query that matches documents containing a specific term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    term: Term,
}

impl TermQuery {
    /// Create a new term query.
    ///
    /// The term is not analyzed; it must already be in indexed form
    /// (lowercased, for the standard analyzer).
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            term: Term::new(field, term),
        }
    }

    /// Get the term.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Get the term text.
    pub fn text(&self) -> &str {
        self.term.text()
    }
}

impl Query for TermQuery {
    fn rewrite(&self, _reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        Ok(Box::new(self.clone()))
    }

    fn extract_terms(&self, terms: &mut BTreeSet<Term>) {
        terms.insert(self.term.clone());
    }

    fn doc_ids(&self, reader: &dyn IndexReader) -> Result<Vec<DocId>> {
        let mut docs = Vec::new();
        if let Some(mut postings) = reader.postings(self.term.field(), self.term.text())? {
            while let Some(doc) = postings.next_doc()? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn description(&self) -> String {
        self.term.to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self) -> Option<&str> {
        Some(self.term.field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Document, MemoryIndex};

    #[test]
    fn test_term_query_creation() {
        let query = TermQuery::new("title", "hello");

        assert_eq!(query.field(), Some("title"));
        assert_eq!(query.text(), "hello");
        assert_eq!(query.description(), "title:hello");
    }

    #[test]
    fn test_term_query_doc_ids_and_terms() {
        let docs = vec![
            Document::builder().add_text("body", "hello world").build(),
            Document::builder().add_text("body", "goodbye").build(),
            Document::builder().add_text("body", "Hello again").build(),
        ];
        let index = MemoryIndex::from_documents(&docs).unwrap();

        let query = TermQuery::new("body", "hello");
        assert_eq!(query.doc_ids(&index).unwrap(), vec![0, 2]);
        assert!(TermQuery::new("body", "absent").doc_ids(&index).unwrap().is_empty());

        let mut terms = BTreeSet::new();
        query.extract_terms(&mut terms);
        assert!(terms.contains(&Term::new("body", "hello")));
    }
}
