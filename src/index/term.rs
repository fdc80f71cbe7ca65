//! Field-qualified terms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A term: an indexed token text scoped to the field it was indexed in.
///
/// Terms order by field first and then by text, so all terms of one field
/// form a contiguous range of any ordered collection of terms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Term {
    field: String,
    text: String,
}

impl Term {
    /// Create a new term.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// The field this term belongs to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The token text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The smallest possible term of `field`, usable as the lower bound of a
    /// range scan over a sorted set of terms.
    pub fn field_start(field: &str) -> Self {
        Term::new(field, "")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}
