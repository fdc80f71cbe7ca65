//! The postings highlighter.
//!
//! [`PostingsHighlighter`] drives the whole pipeline for a batch of documents:
//! it rewrites the query and extracts its terms, loads the stored text of each
//! requested field, then for every field and document opens the terms'
//! postings, merges their occurrences, selects the best passages and formats
//! them. Nothing is re-analyzed; all offsets come from the index.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use lazy_static::lazy_static;
use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{GlaiveError, Result};
use crate::highlight::boundary::{BoundaryKind, BoundaryProvider};
use crate::highlight::config::HighlighterConfig;
use crate::highlight::field_loader::load_field_values;
use crate::highlight::formatter::{DefaultPassageFormatter, FormatterConfig, PassageFormatter};
use crate::highlight::merger::{OffsetStreamMerger, TermStream};
use crate::highlight::passage::Passage;
use crate::highlight::scorer::{Bm25PassageScorer, PassageScorer, ScorerConfig};
use crate::highlight::selector::{PassageSelector, leading_passages};
use crate::index::postings::PostingsEnum;
use crate::index::searcher::{IndexSearcher, TopDocs};
use crate::index::term::Term;
use crate::index::{DocId, IndexReader};
use crate::query::Query;

lazy_static! {
    static ref DEFAULT_FORMATTER: Arc<dyn PassageFormatter> =
        Arc::new(DefaultPassageFormatter::default());
    static ref DEFAULT_SCORER: Arc<dyn PassageScorer> = Arc::new(Bm25PassageScorer::default());
}

/// Per-field hooks of the highlighter.
///
/// Every method is asked once per field and call. Returning `None` from
/// [`formatter`](HighlightStrategy::formatter) or
/// [`scorer`](HighlightStrategy::scorer) is a configuration error.
pub trait HighlightStrategy: Send + Sync + fmt::Debug {
    /// A fresh boundary provider for `field`.
    fn boundary_provider(&self, field: &str) -> Box<dyn BoundaryProvider>;

    fn formatter(&self, field: &str) -> Option<Arc<dyn PassageFormatter>>;

    fn scorer(&self, field: &str) -> Option<Arc<dyn PassageScorer>>;

    /// Joins the values of a multi-valued `field`.
    fn multi_valued_separator(&self, field: &str) -> char;

    /// Passages for a document in which nothing matched. `boundary` is bound
    /// to the document's text.
    fn empty_highlight(
        &self,
        _field: &str,
        boundary: &mut dyn BoundaryProvider,
        max_passages: usize,
    ) -> Vec<Passage> {
        leading_passages(boundary, max_passages)
    }
}

/// The strategy built from a [`HighlighterConfig`]: same settings for every
/// field.
#[derive(Debug, Clone)]
pub struct DefaultStrategy {
    boundary: BoundaryKind,
    formatter: Arc<dyn PassageFormatter>,
    scorer: Arc<dyn PassageScorer>,
    separator: char,
}

impl DefaultStrategy {
    pub fn new(config: &HighlighterConfig) -> Self {
        let formatter: Arc<dyn PassageFormatter> = if config.formatter == FormatterConfig::default() {
            Arc::clone(&*DEFAULT_FORMATTER)
        } else {
            Arc::new(DefaultPassageFormatter::new(config.formatter.clone()))
        };
        let scorer: Arc<dyn PassageScorer> = if config.scorer == ScorerConfig::default() {
            Arc::clone(&*DEFAULT_SCORER)
        } else {
            Arc::new(Bm25PassageScorer::new(config.scorer))
        };
        DefaultStrategy {
            boundary: config.boundary,
            formatter,
            scorer,
            separator: config.multi_valued_separator,
        }
    }
}

impl HighlightStrategy for DefaultStrategy {
    fn boundary_provider(&self, _field: &str) -> Box<dyn BoundaryProvider> {
        self.boundary.provider()
    }

    fn formatter(&self, _field: &str) -> Option<Arc<dyn PassageFormatter>> {
        Some(Arc::clone(&self.formatter))
    }

    fn scorer(&self, _field: &str) -> Option<Arc<dyn PassageScorer>> {
        Some(Arc::clone(&self.scorer))
    }

    fn multi_valued_separator(&self, _field: &str) -> char {
        self.separator
    }
}

/// The passages selected in one document, with the text they refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPassages {
    pub doc: DocId,
    /// The field text, truncated to the configured maximum length.
    pub content: String,
    pub passages: Vec<Passage>,
}

/// A term's postings cursor for one field, opened on first use.
enum CursorSlot<'r> {
    Unopened,
    Absent,
    Open(Box<dyn PostingsEnum + 'r>),
}

/// Everything computed once per call before fields are highlighted.
struct Batch {
    fields: Vec<String>,
    // sorted, without duplicates
    docs: Vec<DocId>,
    field_terms: Vec<Vec<Arc<str>>>,
    // [field][doc], aligned with `docs`
    contents: Vec<Vec<String>>,
}

/// Highlights documents using the positions and offsets stored in the index.
///
/// ```
/// use std::sync::Arc;
///
/// use glaive::highlight::PostingsHighlighter;
/// use glaive::index::{Document, IndexSearcher, MemoryIndex};
/// use glaive::query::TermQuery;
///
/// let docs = vec![Document::builder().add_text("body", "This is a test. Another sentence.").build()];
/// let searcher = IndexSearcher::new(Arc::new(MemoryIndex::from_documents(&docs).unwrap()));
/// let query = TermQuery::new("body", "test");
/// let top_docs = searcher.search(&query, 10).unwrap();
///
/// let highlighter = PostingsHighlighter::default();
/// let snippets = highlighter.highlight("body", &query, &searcher, &top_docs, 1).unwrap();
/// assert_eq!(snippets[&0], "This is a <b>test</b>. ");
/// ```
#[derive(Debug, Clone)]
pub struct PostingsHighlighter {
    config: HighlighterConfig,
    strategy: Arc<dyn HighlightStrategy>,
}

impl Default for PostingsHighlighter {
    fn default() -> Self {
        let config = HighlighterConfig::default();
        let strategy = Arc::new(DefaultStrategy::new(&config));
        PostingsHighlighter { config, strategy }
    }
}

impl PostingsHighlighter {
    /// Create a highlighter using the [`DefaultStrategy`] for `config`.
    pub fn new(config: HighlighterConfig) -> Result<Self> {
        config.validate()?;
        let strategy = Arc::new(DefaultStrategy::new(&config));
        Ok(PostingsHighlighter { config, strategy })
    }

    /// Create a highlighter with custom per-field hooks. Only `max_length`
    /// and `fallback_passages` are taken from `config`.
    pub fn with_strategy(config: HighlighterConfig, strategy: Arc<dyn HighlightStrategy>) -> Result<Self> {
        config.validate()?;
        Ok(PostingsHighlighter { config, strategy })
    }

    pub fn config(&self) -> &HighlighterConfig {
        &self.config
    }

    /// Highlight `field` in the hits of `top_docs`.
    ///
    /// Documents with nothing to show (empty text, field not indexed) are
    /// missing from the result.
    pub fn highlight(
        &self,
        field: &str,
        query: &dyn Query,
        searcher: &IndexSearcher,
        top_docs: &TopDocs,
        max_passages: usize,
    ) -> Result<HashMap<DocId, String>> {
        let doc_ids = top_docs.doc_ids();
        let mut highlights =
            self.highlight_fields(&[field], query, searcher, &doc_ids, &[max_passages])?;
        let snippets = highlights.remove(field).unwrap_or_default();

        Ok(doc_ids
            .into_iter()
            .zip(snippets)
            .filter_map(|(doc, snippet)| snippet.map(|s| (doc, s)))
            .collect())
    }

    /// Highlight several fields of several documents.
    ///
    /// Each field maps to one entry per element of `doc_ids`, in the same
    /// order; an entry is `None` when the document has nothing to show for
    /// that field. `max_passages[i]` bounds the passages of `fields[i]`.
    pub fn highlight_fields(
        &self,
        fields: &[&str],
        query: &dyn Query,
        searcher: &IndexSearcher,
        doc_ids: &[DocId],
        max_passages: &[usize],
    ) -> Result<HashMap<String, Vec<Option<String>>>> {
        let passages =
            self.highlight_fields_as_passages(fields, query, searcher, doc_ids, max_passages)?;
        self.format_all(passages)
    }

    /// Like [`highlight_fields`](Self::highlight_fields), but fields are
    /// processed in parallel.
    pub fn par_highlight_fields(
        &self,
        fields: &[&str],
        query: &dyn Query,
        searcher: &IndexSearcher,
        doc_ids: &[DocId],
        max_passages: &[usize],
    ) -> Result<HashMap<String, Vec<Option<String>>>> {
        let batch = self.prepare(fields, query, searcher, doc_ids, max_passages)?;
        let reader = searcher.reader();

        let per_field = (0..batch.fields.len())
            .into_par_iter()
            .map(|i| self.highlight_field(reader, &batch, i, max_passages[i]))
            .collect::<Result<Vec<_>>>()?;

        self.format_all(Self::assemble(&batch, per_field, doc_ids))
    }

    /// Highlight several fields of several documents, returning the selected
    /// passages instead of formatted text.
    pub fn highlight_fields_as_passages(
        &self,
        fields: &[&str],
        query: &dyn Query,
        searcher: &IndexSearcher,
        doc_ids: &[DocId],
        max_passages: &[usize],
    ) -> Result<HashMap<String, Vec<Option<DocumentPassages>>>> {
        let batch = self.prepare(fields, query, searcher, doc_ids, max_passages)?;
        let reader = searcher.reader();

        let per_field = (0..batch.fields.len())
            .map(|i| self.highlight_field(reader, &batch, i, max_passages[i]))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::assemble(&batch, per_field, doc_ids))
    }

    fn prepare(
        &self,
        fields: &[&str],
        query: &dyn Query,
        searcher: &IndexSearcher,
        doc_ids: &[DocId],
        max_passages: &[usize],
    ) -> Result<Batch> {
        if fields.is_empty() {
            return Err(GlaiveError::invalid_argument("fields must not be empty"));
        }
        if fields.len() != max_passages.len() {
            return Err(GlaiveError::invalid_argument(format!(
                "got {} fields but {} max_passages values",
                fields.len(),
                max_passages.len()
            )));
        }
        if let Some(i) = max_passages.iter().position(|&n| n == 0) {
            return Err(GlaiveError::invalid_argument(format!(
                "max_passages for field '{}' must be positive",
                fields[i]
            )));
        }

        let reader = searcher.reader();
        for &field in fields {
            if reader
                .field_info(field)
                .is_some_and(|info| info.is_indexed() && !info.has_offsets())
            {
                return Err(GlaiveError::offsets_not_indexed(field));
            }
            if self.strategy.formatter(field).is_none() {
                return Err(GlaiveError::highlight(format!("no formatter for field '{field}'")));
            }
            if self.strategy.scorer(field).is_none() {
                return Err(GlaiveError::highlight(format!("no scorer for field '{field}'")));
            }
        }

        let rewritten = searcher.rewrite(query)?;
        let mut terms = BTreeSet::new();
        rewritten.extract_terms(&mut terms);
        if terms.is_empty() {
            return Err(GlaiveError::highlight(format!(
                "query '{}' has no terms to highlight",
                query.description()
            )));
        }

        let mut docs = doc_ids.to_vec();
        docs.sort_unstable();
        docs.dedup();

        let field_terms: Vec<Vec<Arc<str>>> = fields
            .iter()
            .map(|&field| {
                terms
                    .range(Term::field_start(field)..)
                    .take_while(|t| t.field() == field)
                    .map(|t| Arc::from(t.text()))
                    .collect()
            })
            .collect();

        let separators: Vec<char> = fields
            .iter()
            .map(|field| self.strategy.multi_valued_separator(field))
            .collect();
        let contents = load_field_values(reader, fields, &separators, &docs, self.config.max_length)?;

        debug!(
            "highlighting {} fields of {} documents for {}",
            fields.len(),
            docs.len(),
            rewritten.description()
        );
        Ok(Batch {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            docs,
            field_terms,
            contents,
        })
    }

    /// Passages for every document of the batch in field `index`, aligned
    /// with `batch.docs`.
    fn highlight_field(
        &self,
        reader: &dyn IndexReader,
        batch: &Batch,
        index: usize,
        max_passages: usize,
    ) -> Result<Vec<Option<DocumentPassages>>> {
        let field = batch.fields[index].as_str();
        let terms = &batch.field_terms[index];
        let contents = &batch.contents[index];

        if !reader.field_info(field).is_some_and(|info| info.is_indexed()) {
            debug!("field '{field}' is not indexed, nothing to highlight");
            return Ok(vec![None; batch.docs.len()]);
        }
        let scorer = self
            .strategy
            .scorer(field)
            .ok_or_else(|| GlaiveError::highlight(format!("no scorer for field '{field}'")))?;
        let selector = PassageSelector::new(scorer.as_ref(), max_passages);
        let mut boundary = self.strategy.boundary_provider(field);

        let mut slots: Vec<CursorSlot<'_>> = terms.iter().map(|_| CursorSlot::Unopened).collect();
        let mut results = Vec::with_capacity(batch.docs.len());

        for (&doc, content) in batch.docs.iter().zip(contents) {
            if content.is_empty() {
                results.push(None);
                continue;
            }
            boundary.set_text(content);

            let mut on_doc = Vec::with_capacity(terms.len());
            for (slot, term) in slots.iter_mut().zip(terms) {
                on_doc.push(position_cursor(slot, reader, field, term, doc)?);
            }

            let mut streams = Vec::new();
            for ((slot, term), _) in slots
                .iter_mut()
                .zip(terms)
                .zip(&on_doc)
                .filter(|(_, on)| **on)
            {
                if let CursorSlot::Open(postings) = slot {
                    let weight = scorer.weight(content.len(), postings.freq());
                    streams.push(TermStream::new(Arc::clone(term), weight, postings.as_mut()));
                }
            }
            trace!("doc {doc}: {} of {} terms present in '{field}'", streams.len(), terms.len());

            let mut merger = OffsetStreamMerger::new(field, content, streams)?;
            let mut passages = selector.select(&mut merger, boundary.as_mut(), content)?;
            if passages.is_empty() && self.config.fallback_passages {
                passages = self.strategy.empty_highlight(field, boundary.as_mut(), max_passages);
            }

            results.push((!passages.is_empty()).then(|| DocumentPassages {
                doc,
                content: content.clone(),
                passages,
            }));
        }
        Ok(results)
    }

    /// Map per-field results, aligned with the sorted batch documents, back to
    /// the caller's document order.
    fn assemble(
        batch: &Batch,
        per_field: Vec<Vec<Option<DocumentPassages>>>,
        doc_ids: &[DocId],
    ) -> HashMap<String, Vec<Option<DocumentPassages>>> {
        batch
            .fields
            .iter()
            .zip(per_field)
            .map(|(field, results)| {
                let by_doc: AHashMap<DocId, DocumentPassages> = results
                    .into_iter()
                    .flatten()
                    .map(|dp| (dp.doc, dp))
                    .collect();
                let aligned = doc_ids.iter().map(|doc| by_doc.get(doc).cloned()).collect();
                (field.clone(), aligned)
            })
            .collect()
    }

    fn format_all(
        &self,
        passages: HashMap<String, Vec<Option<DocumentPassages>>>,
    ) -> Result<HashMap<String, Vec<Option<String>>>> {
        passages
            .into_iter()
            .map(|(field, docs)| {
                let formatter = self
                    .strategy
                    .formatter(&field)
                    .ok_or_else(|| GlaiveError::highlight(format!("no formatter for field '{field}'")))?;
                let snippets = docs
                    .into_iter()
                    .map(|dp| dp.map(|dp| formatter.format(&dp.passages, &dp.content)))
                    .collect();
                Ok((field, snippets))
            })
            .collect()
    }
}

/// Open the cursor in `slot` if needed and move it to `doc`. Returns whether
/// the term occurs in `doc`. A cursor that runs out of documents is dropped.
fn position_cursor<'r>(
    slot: &mut CursorSlot<'r>,
    reader: &'r dyn IndexReader,
    field: &str,
    term: &str,
    doc: DocId,
) -> Result<bool> {
    if let CursorSlot::Unopened = slot {
        *slot = match reader.postings(field, term)? {
            Some(postings) => CursorSlot::Open(postings),
            None => CursorSlot::Absent,
        };
    }
    let CursorSlot::Open(postings) = slot else {
        return Ok(false);
    };

    let current = match postings.doc() {
        Some(d) if d >= doc => Some(d),
        _ => postings.advance(doc)?,
    };
    match current {
        Some(d) => Ok(d == doc),
        None => {
            *slot = CursorSlot::Absent;
            Ok(false)
        }
    }
}
