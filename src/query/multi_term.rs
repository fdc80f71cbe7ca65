//! Multi-term query support.
//!
//! Prefix and wildcard queries match a set of terms picked from the field's
//! term dictionary. They are rewritten into a disjunction of
//! [`TermQuery`](crate::query::term::TermQuery)s before searching or
//! highlighting, so the highlighter only ever sees concrete terms.

use log::{trace, warn};

use crate::error::Result;
use crate::index::IndexReader;
use crate::query::boolean::BooleanQuery;
use crate::query::query::Query;
use crate::query::term::TermQuery;

/// Maximum number of terms a multi-term query expands to by default.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1024;

/// Expand the terms of `field` accepted by `accept` into a disjunction.
///
/// Terms are taken in dictionary order; expansion stops after
/// `max_expansions` of them.
pub fn expand<F>(
    reader: &dyn IndexReader,
    field: &str,
    max_expansions: usize,
    description: &str,
    accept: F,
) -> Result<Box<dyn Query>>
where
    F: Fn(&str) -> bool,
{
    let mut rewritten = BooleanQuery::new();
    let mut expanded = 0usize;
    let mut truncated = false;

    for term in reader.terms(field)? {
        if !accept(&term) {
            continue;
        }
        if expanded == max_expansions {
            truncated = true;
            break;
        }
        trace!("{description} expands to {field}:{term}");
        rewritten.add_should(Box::new(TermQuery::new(field, term)));
        expanded += 1;
    }

    if truncated {
        warn!("{description} matched more than {max_expansions} terms, expansion truncated");
    }
    Ok(Box::new(rewritten))
}
