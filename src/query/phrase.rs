//! Phrase query implementation for exact phrase matching.

use std::any::Any;
use std::collections::BTreeSet;

use crate::error::{GlaiveError, Result};
use crate::index::postings::PostingsEnum;
use crate::index::term::Term;
use crate::index::{DocId, IndexReader};
use crate::query::query::Query;
use crate::query::term::TermQuery;

/// A query that matches documents containing an exact phrase.
///
/// A phrase query finds documents where the specified terms appear at
/// consecutive positions, in order. Matching needs positions; a field
/// indexed without them is a query error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseQuery {
    field: String,
    terms: Vec<String>,
}

impl PhraseQuery {
    /// Create a new phrase query.
    pub fn new<S: Into<String>>(field: S, terms: Vec<String>) -> Self {
        PhraseQuery {
            field: field.into(),
            terms,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    fn positions(postings: &mut dyn PostingsEnum) -> Result<Vec<u32>> {
        let mut positions = Vec::with_capacity(postings.freq() as usize);
        while let Some(occurrence) = postings.next_position()? {
            positions.push(occurrence.position);
        }
        Ok(positions)
    }
}

impl Query for PhraseQuery {
    fn rewrite(&self, _reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        match self.terms.as_slice() {
            [single] => Ok(Box::new(TermQuery::new(self.field.as_str(), single.as_str()))),
            _ => Ok(Box::new(self.clone())),
        }
    }

    fn extract_terms(&self, terms: &mut BTreeSet<Term>) {
        for text in &self.terms {
            terms.insert(Term::new(self.field.as_str(), text.as_str()));
        }
    }

    fn doc_ids(&self, reader: &dyn IndexReader) -> Result<Vec<DocId>> {
        if self.terms.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(info) = reader.field_info(&self.field) {
            if !info.index_options.is_some_and(|o| o.has_positions()) {
                return Err(GlaiveError::query(format!(
                    "field '{}' was indexed without positions, cannot run phrase query",
                    self.field
                )));
            }
        }

        let mut cursors = Vec::with_capacity(self.terms.len());
        for text in &self.terms {
            match reader.postings(&self.field, text)? {
                Some(postings) => cursors.push(postings),
                None => return Ok(Vec::new()),
            }
        }

        let mut docs = Vec::new();
        let mut target: DocId = 0;
        'docs: loop {
            let mut max = target;
            for cursor in cursors.iter_mut() {
                match cursor.advance(max)? {
                    Some(doc) => max = max.max(doc),
                    None => break 'docs,
                }
            }
            if cursors.iter().any(|c| c.doc() != Some(max)) {
                target = max;
                continue;
            }

            let mut per_term = Vec::with_capacity(cursors.len());
            for cursor in cursors.iter_mut() {
                per_term.push(Self::positions(cursor.as_mut())?);
            }
            let matched = per_term.split_first().is_some_and(|(first, rest)| {
                first.iter().any(|&start| {
                    rest.iter().enumerate().all(|(i, positions)| {
                        positions.binary_search(&(start + i as u32 + 1)).is_ok()
                    })
                })
            });
            if matched {
                docs.push(max);
            }
            target = max + 1;
        }
        Ok(docs)
    }

    fn description(&self) -> String {
        format!("{}:\"{}\"", self.field, self.terms.join(" "))
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
