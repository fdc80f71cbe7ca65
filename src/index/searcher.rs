//! Searching an index.
//!
//! Document ranking is outside this crate's concern: hits are collected with
//! a constant score, in ascending document order.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::stored::StoredFieldVisitor;
use crate::index::{DocId, IndexReader};
use crate::query::Query;

/// One search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDoc {
    pub doc: DocId,
    pub score: f32,
}

/// The hits of a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopDocs {
    /// Number of matching documents, including those beyond the limit.
    pub total_hits: u64,
    pub score_docs: Vec<ScoreDoc>,
}

impl TopDocs {
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.score_docs.iter().map(|sd| sd.doc).collect()
    }
}

/// Runs queries against a reader.
#[derive(Debug, Clone)]
pub struct IndexSearcher {
    reader: Arc<dyn IndexReader>,
}

impl IndexSearcher {
    pub fn new(reader: Arc<dyn IndexReader>) -> Self {
        IndexSearcher { reader }
    }

    pub fn reader(&self) -> &dyn IndexReader {
        self.reader.as_ref()
    }

    /// Rewrite `query` against this searcher's reader.
    pub fn rewrite(&self, query: &dyn Query) -> Result<Box<dyn Query>> {
        query.rewrite(self.reader.as_ref())
    }

    /// Collect the first `limit` matching documents.
    pub fn search(&self, query: &dyn Query, limit: usize) -> Result<TopDocs> {
        let rewritten = self.rewrite(query)?;
        let docs = rewritten.doc_ids(self.reader.as_ref())?;
        debug!("{} matched {} documents", query.description(), docs.len());

        Ok(TopDocs {
            total_hits: docs.len() as u64,
            score_docs: docs
                .into_iter()
                .take(limit)
                .map(|doc| ScoreDoc { doc, score: 1.0 })
                .collect(),
        })
    }

    /// Feed the stored values of `doc` to `visitor`.
    pub fn doc(&self, doc: DocId, visitor: &mut dyn StoredFieldVisitor) -> Result<()> {
        self.reader.document(doc, visitor)
    }
}
