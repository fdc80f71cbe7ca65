//! Token filter implementations for token transformation.
//!
//! Filters receive the stream produced by a tokenizer and return a new
//! stream. They may rewrite token text but must leave offsets untouched,
//! since highlighting depends on them.
//!
//! # Examples
//!
//! ```
//! use glaive::analysis::token_filter::Filter;
//! use glaive::analysis::token_filter::lowercase::LowercaseFilter;
//! use glaive::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "hello");
//! assert_eq!(filtered[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod lowercase;

pub use lowercase::LowercaseFilter;
