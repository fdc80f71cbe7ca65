//! Passage scoring.
//!
//! Each passage is treated as a tiny document inside a pseudo-collection
//! made of the field text cut into `pivot`-byte chunks. A term's weight is
//! its BM25 inverse frequency within that collection, its contribution to a
//! passage saturates with frequency and shrinks with passage length, and the
//! final score is boosted slightly for passages near the start of the text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores passages.
///
/// Implementations must be pure: identical arguments always give identical
/// results, and degenerate inputs (zero length, zero frequency) give finite
/// values.
pub trait PassageScorer: Send + Sync + fmt::Debug {
    /// Weight of a term occurring `term_freq` times in a text of
    /// `content_length` bytes.
    fn weight(&self, content_length: usize, term_freq: u32) -> f32;

    /// Contribution of a term occurring `freq` times in a passage of
    /// `passage_length` bytes.
    fn tf(&self, freq: u32, passage_length: usize) -> f32;

    /// Multiplier applied to a passage starting at `passage_start`.
    fn norm(&self, passage_start: usize) -> f32;
}

/// BM25 parameters for [`Bm25PassageScorer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Term frequency saturation.
    pub k1: f32,
    /// Length normalization.
    pub b: f32,
    /// Average passage length in bytes.
    pub pivot: f32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            k1: 1.2,
            b: 0.75,
            pivot: 87.0,
        }
    }
}

/// The default BM25-family passage scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bm25PassageScorer {
    config: ScorerConfig,
}

impl Bm25PassageScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Bm25PassageScorer { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }
}

impl PassageScorer for Bm25PassageScorer {
    fn weight(&self, content_length: usize, term_freq: u32) -> f32 {
        let ScorerConfig { k1, pivot, .. } = self.config;
        let num_docs = 1.0 + content_length as f32 / pivot;
        let idf = (1.0 + (f64::from(num_docs) + 0.5) / (f64::from(term_freq) + 0.5)).ln();
        (k1 + 1.0) * idf as f32
    }

    fn tf(&self, freq: u32, passage_length: usize) -> f32 {
        let ScorerConfig { k1, b, pivot } = self.config;
        let norm = k1 * ((1.0 - b) + b * (passage_length as f32 / pivot));
        let freq = freq as f32;
        if freq + norm == 0.0 {
            return 0.0;
        }
        freq / (freq + norm)
    }

    fn norm(&self, passage_start: usize) -> f32 {
        1.0 + 1.0 / (f64::from(self.config.pivot) + passage_start as f64).ln() as f32
    }
}
