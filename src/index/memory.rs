//! An in-memory inverted index recording positions and character offsets.
//!
//! Documents are analyzed once at insertion time. For every indexed field the
//! writer keeps a sorted term dictionary whose entries list, per document,
//! each occurrence's position and byte offsets. Multi-valued fields are laid
//! out as if their values were concatenated with `offset_gap` bytes between
//! them, so a reader that joins the stored values with a separator of that
//! byte length sees offsets that line up with the joined text.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::standard::StandardAnalyzer;
use crate::error::{GlaiveError, Result};
use crate::index::document::Document;
use crate::index::field::{FieldInfo, FieldOptions, IndexOptions};
use crate::index::postings::{Occurrence, PostingsEnum};
use crate::index::stored::{StoredFieldVisitor, VisitStatus};
use crate::index::{DocId, IndexReader};

/// Configuration for [`MemoryIndexWriter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryIndexConfig {
    /// Options for fields without an explicit entry.
    pub default_field_options: FieldOptions,

    /// Bytes inserted between consecutive values of a multi-valued field.
    pub offset_gap: usize,

    /// Positions inserted between consecutive values of a multi-valued field.
    pub position_gap: u32,
}

impl Default for MemoryIndexConfig {
    fn default() -> Self {
        MemoryIndexConfig {
            default_field_options: FieldOptions::highlightable(),
            offset_gap: 1,
            position_gap: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct DocPostings {
    doc: DocId,
    occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone)]
struct FieldPostings {
    index_options: IndexOptions,
    terms: BTreeMap<String, Vec<DocPostings>>,
}

/// Builds a [`MemoryIndex`] one document at a time.
pub struct MemoryIndexWriter {
    config: MemoryIndexConfig,
    default_analyzer: Arc<dyn Analyzer>,
    field_analyzers: AHashMap<String, Arc<dyn Analyzer>>,
    field_options: AHashMap<String, FieldOptions>,
    field_infos: BTreeMap<String, FieldInfo>,
    postings: AHashMap<String, FieldPostings>,
    stored: Vec<Vec<(String, String)>>,
}

impl MemoryIndexWriter {
    /// Create a writer using the standard analyzer for every field.
    pub fn new(config: MemoryIndexConfig) -> Result<Self> {
        Ok(Self::with_analyzer(config, Arc::new(StandardAnalyzer::new()?)))
    }

    /// Create a writer with the given default analyzer.
    pub fn with_analyzer(config: MemoryIndexConfig, analyzer: Arc<dyn Analyzer>) -> Self {
        MemoryIndexWriter {
            config,
            default_analyzer: analyzer,
            field_analyzers: AHashMap::new(),
            field_options: AHashMap::new(),
            field_infos: BTreeMap::new(),
            postings: AHashMap::new(),
            stored: Vec::new(),
        }
    }

    /// Use `analyzer` for `field` instead of the default one.
    pub fn set_field_analyzer<S: Into<String>>(&mut self, field: S, analyzer: Arc<dyn Analyzer>) {
        self.field_analyzers.insert(field.into(), analyzer);
    }

    /// Index `field` with `options` instead of the defaults.
    ///
    /// Must be called before the first document containing the field.
    pub fn set_field_options<S: Into<String>>(&mut self, field: S, options: FieldOptions) {
        self.field_options.insert(field.into(), options);
    }

    pub fn config(&self) -> &MemoryIndexConfig {
        &self.config
    }

    fn options_for(&self, field: &str) -> FieldOptions {
        self.field_options
            .get(field)
            .copied()
            .unwrap_or(self.config.default_field_options)
    }

    fn analyzer_for(&self, field: &str) -> Arc<dyn Analyzer> {
        self.field_analyzers
            .get(field)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_analyzer))
    }

    /// Analyze and add a document, returning its id.
    pub fn add_document(&mut self, doc: &Document) -> Result<DocId> {
        let doc_id = self.stored.len() as DocId;

        for name in doc.field_names() {
            let options = self.options_for(name);
            self.field_infos
                .entry(name.to_string())
                .or_insert_with(|| FieldInfo::new(name, options));

            let Some(index_options) = options.index_options else {
                continue;
            };
            let analyzer = self.analyzer_for(name);
            let field = self
                .postings
                .entry(name.to_string())
                .or_insert_with(|| FieldPostings {
                    index_options,
                    terms: BTreeMap::new(),
                });

            let mut offset_base = 0usize;
            let mut position_base = 0u32;
            for value in doc.get_all(name) {
                let mut last_position = None;
                for token in analyzer.analyze(value)? {
                    let position = position_base + u32::try_from(token.position).map_err(|_| {
                        GlaiveError::index(format!("too many tokens in field '{name}'"))
                    })?;
                    let occurrence = Occurrence::new(
                        position,
                        offset_base + token.start_offset,
                        offset_base + token.end_offset,
                    );
                    let entries = field.terms.entry(token.text).or_default();
                    match entries.last_mut() {
                        Some(last) if last.doc == doc_id => last.occurrences.push(occurrence),
                        _ => entries.push(DocPostings {
                            doc: doc_id,
                            occurrences: vec![occurrence],
                        }),
                    }
                    last_position = Some(position);
                }
                if let Some(position) = last_position {
                    position_base = position + 1 + self.config.position_gap;
                }
                offset_base += value.len() + self.config.offset_gap;
            }
        }

        let stored = doc
            .fields()
            .iter()
            .filter(|f| self.options_for(&f.name).stored)
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();
        self.stored.push(stored);

        Ok(doc_id)
    }

    /// Number of documents added so far.
    pub fn num_docs(&self) -> u64 {
        self.stored.len() as u64
    }

    /// Freeze the writer into a searchable index.
    pub fn finish(self) -> MemoryIndex {
        debug!(
            "finished memory index: {} docs, {} fields",
            self.stored.len(),
            self.field_infos.len()
        );
        MemoryIndex {
            field_infos: self.field_infos,
            postings: self.postings,
            stored: self.stored,
        }
    }
}

impl fmt::Debug for MemoryIndexWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryIndexWriter")
            .field("config", &self.config)
            .field("default_analyzer", &self.default_analyzer.name())
            .field("num_docs", &self.stored.len())
            .finish()
    }
}

/// A read-only in-memory index.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    field_infos: BTreeMap<String, FieldInfo>,
    postings: AHashMap<String, FieldPostings>,
    stored: Vec<Vec<(String, String)>>,
}

impl MemoryIndex {
    /// Index every document with the default configuration.
    pub fn from_documents<'a, I>(docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut writer = MemoryIndexWriter::new(MemoryIndexConfig::default())?;
        for doc in docs {
            writer.add_document(doc)?;
        }
        Ok(writer.finish())
    }

    /// Number of documents containing `term` in `field`.
    pub fn doc_freq(&self, field: &str, term: &str) -> u64 {
        self.postings
            .get(field)
            .and_then(|p| p.terms.get(term))
            .map_or(0, |entries| entries.len() as u64)
    }
}

impl IndexReader for MemoryIndex {
    fn max_doc(&self) -> u64 {
        self.stored.len() as u64
    }

    fn field_info(&self, field: &str) -> Option<FieldInfo> {
        self.field_infos.get(field).cloned()
    }

    fn fields(&self) -> Vec<FieldInfo> {
        self.field_infos.values().cloned().collect()
    }

    fn terms(&self, field: &str) -> Result<Vec<String>> {
        Ok(self
            .postings
            .get(field)
            .map(|p| p.terms.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingsEnum + '_>>> {
        let Some(field_postings) = self.postings.get(field) else {
            return Ok(None);
        };
        Ok(field_postings.terms.get(term).map(|entries| {
            Box::new(MemoryPostingsEnum::new(entries, field_postings.index_options))
                as Box<dyn PostingsEnum + '_>
        }))
    }

    fn document(&self, doc: DocId, visitor: &mut dyn StoredFieldVisitor) -> Result<()> {
        let stored = usize::try_from(doc)
            .ok()
            .and_then(|i| self.stored.get(i))
            .ok_or_else(|| GlaiveError::index(format!("document {doc} does not exist")))?;

        for (name, value) in stored {
            match visitor.needs_field(name) {
                VisitStatus::Yes => visitor.string_field(name, value),
                VisitStatus::No => {}
                VisitStatus::Stop => break,
            }
        }
        Ok(())
    }
}

/// Postings cursor over a [`MemoryIndex`] term.
#[derive(Debug)]
pub struct MemoryPostingsEnum<'a> {
    entries: &'a [DocPostings],
    index_options: IndexOptions,
    // None until the first advance; entries.len() once exhausted.
    cursor: Option<usize>,
    next_occurrence: usize,
}

impl<'a> MemoryPostingsEnum<'a> {
    fn new(entries: &'a [DocPostings], index_options: IndexOptions) -> Self {
        MemoryPostingsEnum {
            entries,
            index_options,
            cursor: None,
            next_occurrence: 0,
        }
    }

    fn current(&self) -> Option<&'a DocPostings> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    fn move_to(&mut self, index: usize) -> Option<DocId> {
        if self.cursor != Some(index) {
            self.cursor = Some(index.min(self.entries.len()));
            self.next_occurrence = 0;
        }
        self.doc()
    }
}

impl PostingsEnum for MemoryPostingsEnum<'_> {
    fn doc(&self) -> Option<DocId> {
        self.current().map(|d| d.doc)
    }

    fn advance(&mut self, target: DocId) -> Result<Option<DocId>> {
        let from = self.cursor.unwrap_or(0).min(self.entries.len());
        let index = from + self.entries[from..].partition_point(|d| d.doc < target);
        Ok(self.move_to(index))
    }

    fn next_doc(&mut self) -> Result<Option<DocId>> {
        let index = self.cursor.map_or(0, |i| i.saturating_add(1));
        Ok(self.move_to(index))
    }

    fn freq(&self) -> u32 {
        if self.index_options == IndexOptions::Docs {
            return 1;
        }
        self.current().map_or(0, |d| d.occurrences.len() as u32)
    }

    fn next_position(&mut self) -> Result<Option<Occurrence>> {
        if !self.index_options.has_positions() {
            return Ok(None);
        }
        let Some(current) = self.current() else {
            return Ok(None);
        };
        let Some(occurrence) = current.occurrences.get(self.next_occurrence) else {
            return Ok(None);
        };
        self.next_occurrence += 1;

        if self.index_options.has_offsets() {
            Ok(Some(*occurrence))
        } else {
            Ok(Some(Occurrence {
                position: occurrence.position,
                start_offset: None,
                end_offset: None,
            }))
        }
    }

    fn is_exhausted(&self) -> bool {
        self.cursor.is_some_and(|i| i >= self.entries.len())
    }
}
