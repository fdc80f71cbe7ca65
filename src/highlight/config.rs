//! Highlighter configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GlaiveError, Result};
use crate::highlight::boundary::BoundaryKind;
use crate::highlight::formatter::FormatterConfig;
use crate::highlight::scorer::ScorerConfig;

/// Default number of characters of each field considered for highlighting.
pub const DEFAULT_MAX_LENGTH: usize = 10_000;

/// Configuration for [`PostingsHighlighter`](crate::highlight::PostingsHighlighter).
///
/// ```
/// use glaive::highlight::{BoundaryKind, HighlighterConfig};
///
/// let config = HighlighterConfig::default()
///     .with_max_length(500)
///     .with_boundary(BoundaryKind::Word)
///     .with_tags("<em>", "</em>");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Characters of each field to consider. Matches beyond are ignored.
    pub max_length: usize,

    /// How passages are delimited.
    pub boundary: BoundaryKind,

    /// Markup for the default formatter.
    pub formatter: FormatterConfig,

    /// Parameters for the default scorer.
    pub scorer: ScorerConfig,

    /// Joins the values of a multi-valued field. Must match the index's
    /// offset gap for the offsets to line up.
    pub multi_valued_separator: char,

    /// Return the leading passages of a document when nothing in it matched.
    pub fallback_passages: bool,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        HighlighterConfig {
            max_length: DEFAULT_MAX_LENGTH,
            boundary: BoundaryKind::default(),
            formatter: FormatterConfig::default(),
            scorer: ScorerConfig::default(),
            multi_valued_separator: ' ',
            fallback_passages: true,
        }
    }
}

impl HighlighterConfig {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryKind) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the tags placed around each match.
    pub fn with_tags<S: Into<String>, T: Into<String>>(mut self, pre_tag: S, post_tag: T) -> Self {
        self.formatter.pre_tag = pre_tag.into();
        self.formatter.post_tag = post_tag.into();
        self
    }

    pub fn with_ellipsis<S: Into<String>>(mut self, ellipsis: S) -> Self {
        self.formatter.ellipsis = ellipsis.into();
        self
    }

    pub fn with_escape(mut self, escape: bool) -> Self {
        self.formatter.escape = escape;
        self
    }

    pub fn with_scorer(mut self, scorer: ScorerConfig) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_multi_valued_separator(mut self, separator: char) -> Self {
        self.multi_valued_separator = separator;
        self
    }

    pub fn with_fallback_passages(mut self, fallback: bool) -> Self {
        self.fallback_passages = fallback;
        self
    }

    /// Check the configuration for values the highlighter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_length == usize::MAX {
            return Err(GlaiveError::invalid_argument(
                "max_length must be less than usize::MAX",
            ));
        }
        let ScorerConfig { k1, b, pivot } = self.scorer;
        if !(pivot.is_finite() && pivot > 0.0) {
            return Err(GlaiveError::invalid_argument(format!(
                "scorer pivot must be positive, got {pivot}"
            )));
        }
        if !(k1.is_finite() && k1 >= 0.0) {
            return Err(GlaiveError::invalid_argument(format!(
                "scorer k1 must be non-negative, got {k1}"
            )));
        }
        if !(0.0..=1.0).contains(&b) {
            return Err(GlaiveError::invalid_argument(format!(
                "scorer b must be within [0, 1], got {b}"
            )));
        }
        Ok(())
    }
}
