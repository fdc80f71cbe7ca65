//! Query model.
//!
//! Queries find matching documents for the searcher and, once rewritten,
//! report the concrete terms the highlighter marks up.

pub mod boolean;
pub mod multi_term;
pub mod parser;
pub mod phrase;
pub mod prefix;
#[allow(clippy::module_inception)]
pub mod query;
pub mod term;
pub mod wildcard;

pub use boolean::{BooleanClause, BooleanQuery, BooleanQueryBuilder, Occur};
pub use parser::QueryParser;
pub use phrase::PhraseQuery;
pub use prefix::PrefixQuery;
pub use query::Query;
pub use term::TermQuery;
pub use wildcard::WildcardQuery;
