//! Wildcard query implementation for pattern matching.

use std::any::Any;
use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{GlaiveError, Result};
use crate::index::term::Term;
use crate::index::{DocId, IndexReader};
use crate::query::multi_term::{self, DEFAULT_MAX_EXPANSIONS};
use crate::query::query::Query;

/// A query that matches terms against a wildcard pattern.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
/// - `\*` and `\?` match literal `*` and `?`
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    field: String,
    pattern: String,
    regex: Regex,
    max_expansions: usize,
}

impl WildcardQuery {
    /// Create a new wildcard query.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Self::compile_pattern(&pattern)?;

        Ok(WildcardQuery {
            field: field.into(),
            pattern,
            regex,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        })
    }

    /// Cap the number of terms this query expands to.
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn compile_pattern(pattern: &str) -> Result<Regex> {
        let mut regex_pattern = String::with_capacity(pattern.len() + 8);
        regex_pattern.push('^');

        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => regex_pattern.push_str(&regex::escape(&escaped.to_string())),
                    None => regex_pattern.push_str(r"\\"),
                },
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                c => regex_pattern.push_str(&regex::escape(&c.to_string())),
            }
        }
        regex_pattern.push('$');

        Regex::new(&regex_pattern)
            .map_err(|e| GlaiveError::query(format!("Invalid wildcard pattern: {e}")))
    }

    /// Check if a term matches the wildcard pattern.
    pub fn matches(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }
}

impl Query for WildcardQuery {
    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        multi_term::expand(
            reader,
            &self.field,
            self.max_expansions,
            &self.description(),
            |term| self.matches(term),
        )
    }

    fn extract_terms(&self, _terms: &mut BTreeSet<Term>) {}

    fn doc_ids(&self, reader: &dyn IndexReader) -> Result<Vec<DocId>> {
        self.rewrite(reader)?.doc_ids(reader)
    }

    fn description(&self) -> String {
        format!("{}:{}", self.field, self.pattern)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Document, MemoryIndex};

    #[test]
    fn test_pattern_matching() {
        let query = WildcardQuery::new("body", "te?t*").unwrap();
        assert!(query.matches("test"));
        assert!(query.matches("texts"));
        assert!(!query.matches("tet"));
        assert!(!query.matches("attest"));

        let literal = WildcardQuery::new("body", r"a\*b.c").unwrap();
        assert!(literal.matches("a*b.c"));
        assert!(!literal.matches("axb.c"));
        assert!(!literal.matches("a*bxc"));
    }

    #[test]
    fn test_rewrite_expands_terms() {
        let docs: Vec<Document> = ["test one", "text two", "toast"]
            .iter()
            .map(|t| Document::builder().add_text("body", *t).build())
            .collect();
        let index = MemoryIndex::from_documents(&docs).unwrap();

        let query = WildcardQuery::new("body", "te?t").unwrap();
        let mut terms = BTreeSet::new();
        query.rewrite(&index).unwrap().extract_terms(&mut terms);
        let texts: Vec<&str> = terms.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["test", "text"]);
        assert_eq!(query.doc_ids(&index).unwrap(), vec![0, 1]);
    }
}
