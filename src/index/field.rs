//! Per-field indexing metadata.

use serde::{Deserialize, Serialize};

/// What the postings of a field record, from least to most detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOptions {
    /// Only which documents contain a term.
    Docs,
    /// Documents and per-document term frequencies.
    DocsAndFreqs,
    /// Documents, frequencies and token positions.
    DocsFreqsPositions,
    /// Documents, frequencies, positions and character offsets.
    DocsFreqsPositionsOffsets,
}

impl IndexOptions {
    /// Whether positions are recorded.
    pub fn has_positions(self) -> bool {
        self >= IndexOptions::DocsFreqsPositions
    }

    /// Whether character offsets are recorded.
    pub fn has_offsets(self) -> bool {
        self == IndexOptions::DocsFreqsPositionsOffsets
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions::DocsFreqsPositionsOffsets
    }
}

/// How a field is handled when documents are added to an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Postings detail, or `None` for a field that is not indexed.
    pub index_options: Option<IndexOptions>,
    /// Whether the raw value is kept for retrieval.
    pub stored: bool,
}

impl FieldOptions {
    /// Indexed with offsets and stored: the layout highlighting needs.
    pub fn highlightable() -> Self {
        FieldOptions {
            index_options: Some(IndexOptions::DocsFreqsPositionsOffsets),
            stored: true,
        }
    }

    /// Indexed with the given options and stored.
    pub fn indexed(index_options: IndexOptions) -> Self {
        FieldOptions {
            index_options: Some(index_options),
            stored: true,
        }
    }

    /// Stored but not indexed.
    pub fn stored_only() -> Self {
        FieldOptions {
            index_options: None,
            stored: true,
        }
    }
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self::highlightable()
    }
}

/// Metadata about a field as seen by a reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub index_options: Option<IndexOptions>,
    pub stored: bool,
}

impl FieldInfo {
    pub fn new<S: Into<String>>(name: S, options: FieldOptions) -> Self {
        FieldInfo {
            name: name.into(),
            index_options: options.index_options,
            stored: options.stored,
        }
    }

    /// Whether the field has postings at all.
    pub fn is_indexed(&self) -> bool {
        self.index_options.is_some()
    }

    /// Whether the field's postings carry character offsets.
    pub fn has_offsets(&self) -> bool {
        self.index_options.is_some_and(IndexOptions::has_offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_options_levels() {
        assert!(!IndexOptions::Docs.has_positions());
        assert!(!IndexOptions::DocsAndFreqs.has_offsets());
        assert!(IndexOptions::DocsFreqsPositions.has_positions());
        assert!(!IndexOptions::DocsFreqsPositions.has_offsets());
        assert!(IndexOptions::DocsFreqsPositionsOffsets.has_offsets());
    }

    #[test]
    fn test_field_info() {
        let info = FieldInfo::new("body", FieldOptions::highlightable());
        assert!(info.is_indexed());
        assert!(info.has_offsets());

        let info = FieldInfo::new("id", FieldOptions::stored_only());
        assert!(!info.is_indexed());
        assert!(!info.has_offsets());
    }
}
