//! Analyzers combine a tokenizer with a chain of filters.
//!
//! - [`standard::StandardAnalyzer`] - `\w+` tokens, lowercased
//! - [`keyword::KeywordAnalyzer`] - the whole value as one token
//! - [`pipeline::PipelineAnalyzer`] - any tokenizer plus any filters
//!
//! # Examples
//!
//! ```
//! use glaive::analysis::analyzer::Analyzer;
//! use glaive::analysis::analyzer::standard::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::new().unwrap();
//! let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so analyzers can be shared by an index
/// writer and a query parser living on different threads.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod keyword;
pub mod pipeline;
pub mod standard;
