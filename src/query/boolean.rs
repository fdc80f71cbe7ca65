//! Boolean query implementation for combining multiple queries.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::index::term::Term;
use crate::index::{DocId, IndexReader};
use crate::query::query::Query;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    pub query: Box<dyn Query>,
    pub occur: Occur,
}

impl BooleanClause {
    pub fn new(query: Box<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }

    fn render(&self) -> String {
        let inner = match self.query.as_any().downcast_ref::<BooleanQuery>() {
            Some(nested) if nested.clauses.len() > 1 => format!("({})", nested.description()),
            _ => self.query.description(),
        };
        match self.occur {
            Occur::Must => format!("+{inner}"),
            Occur::Should => inner,
            Occur::MustNot => format!("-{inner}"),
        }
    }
}

/// A boolean query that combines multiple queries with boolean logic.
///
/// Without any `Must` clause at least one `Should` clause has to match.
/// `MustNot` clauses only exclude; a query made of them alone matches
/// nothing. Terms under `MustNot` are never extracted for highlighting.
#[derive(Debug, Clone, Default)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
    minimum_should_match: usize,
}

impl BooleanQuery {
    /// Create a new empty boolean query.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::new(query, Occur::Must));
    }

    pub fn add_should(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::new(query, Occur::Should));
    }

    pub fn add_must_not(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::new(query, Occur::MustNot));
    }

    /// Require at least `minimum` `Should` clauses to match.
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl Query for BooleanQuery {
    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        let mut rewritten = BooleanQuery::new().with_minimum_should_match(self.minimum_should_match);
        for clause in &self.clauses {
            rewritten.add_clause(BooleanClause::new(clause.query.rewrite(reader)?, clause.occur));
        }
        Ok(Box::new(rewritten))
    }

    fn extract_terms(&self, terms: &mut BTreeSet<Term>) {
        for clause in &self.clauses {
            if clause.occur != Occur::MustNot {
                clause.query.extract_terms(terms);
            }
        }
    }

    fn doc_ids(&self, reader: &dyn IndexReader) -> Result<Vec<DocId>> {
        let mut required: Option<BTreeSet<DocId>> = None;
        let mut should_counts: BTreeMap<DocId, usize> = BTreeMap::new();
        let mut excluded: BTreeSet<DocId> = BTreeSet::new();

        for clause in &self.clauses {
            let docs = clause.query.doc_ids(reader)?;
            match clause.occur {
                Occur::Must => {
                    let docs: BTreeSet<DocId> = docs.into_iter().collect();
                    required = Some(match required {
                        None => docs,
                        Some(current) => current.intersection(&docs).copied().collect(),
                    });
                }
                Occur::Should => {
                    for doc in docs {
                        *should_counts.entry(doc).or_insert(0) += 1;
                    }
                }
                Occur::MustNot => excluded.extend(docs),
            }
        }

        let min_should = if required.is_some() {
            self.minimum_should_match
        } else {
            self.minimum_should_match.max(1)
        };
        let candidates = required.unwrap_or_else(|| should_counts.keys().copied().collect());

        Ok(candidates
            .into_iter()
            .filter(|doc| should_counts.get(doc).copied().unwrap_or(0) >= min_should)
            .filter(|doc| !excluded.contains(doc))
            .collect())
    }

    fn description(&self) -> String {
        self.clauses
            .iter()
            .map(BooleanClause::render)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builder for creating boolean queries.
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    query: BooleanQuery,
}

impl BooleanQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_must(query);
        self
    }

    pub fn should(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_should(query);
        self
    }

    pub fn must_not(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_must_not(query);
        self
    }

    pub fn minimum_should_match(mut self, minimum: usize) -> Self {
        self.query.minimum_should_match = minimum;
        self
    }

    pub fn build(self) -> BooleanQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Document, MemoryIndex};
    use crate::query::term::TermQuery;

    fn index() -> MemoryIndex {
        let docs: Vec<Document> = [
            "apple banana",
            "apple cherry",
            "banana cherry",
            "apple banana cherry",
        ]
        .iter()
        .map(|t| Document::builder().add_text("body", *t).build())
        .collect();
        MemoryIndex::from_documents(&docs).unwrap()
    }

    fn term(text: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new("body", text))
    }

    #[test]
    fn test_must_and_should() {
        let index = index();

        let query = BooleanQueryBuilder::new()
            .must(term("apple"))
            .must(term("banana"))
            .build();
        assert_eq!(query.doc_ids(&index).unwrap(), vec![0, 3]);

        let query = BooleanQueryBuilder::new()
            .should(term("cherry"))
            .should(term("missing"))
            .build();
        assert_eq!(query.doc_ids(&index).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_must_not_excludes_and_is_not_extracted() {
        let index = index();
        let query = BooleanQueryBuilder::new()
            .should(term("apple"))
            .must_not(term("cherry"))
            .build();
        assert_eq!(query.doc_ids(&index).unwrap(), vec![0]);

        let mut terms = BTreeSet::new();
        query.extract_terms(&mut terms);
        assert_eq!(terms.len(), 1);
        assert!(terms.contains(&Term::new("body", "apple")));

        let only_negative = BooleanQueryBuilder::new().must_not(term("apple")).build();
        assert!(only_negative.doc_ids(&index).unwrap().is_empty());
    }

    #[test]
    fn test_minimum_should_match() {
        let index = index();
        let query = BooleanQueryBuilder::new()
            .should(term("apple"))
            .should(term("banana"))
            .should(term("cherry"))
            .minimum_should_match(3)
            .build();
        assert_eq!(query.doc_ids(&index).unwrap(), vec![3]);
    }

    #[test]
    fn test_description() {
        let nested = BooleanQueryBuilder::new()
            .should(term("a"))
            .should(term("b"))
            .build();
        let query = BooleanQueryBuilder::new()
            .must(term("apple"))
            .must_not(Box::new(nested))
            .build();
        assert_eq!(query.description(), "+body:apple -(body:a body:b)");
    }
}
