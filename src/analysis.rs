//! Text analysis module for Glaive.
//!
//! Analysis turns raw field text into a stream of [`Token`]s carrying the
//! byte offsets the highlighter later uses to mark matches. The pipeline is
//! tokenizer first, then token filters:
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Tokens (with offsets)
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::Analyzer;
pub use analyzer::keyword::KeywordAnalyzer;
pub use analyzer::pipeline::PipelineAnalyzer;
pub use analyzer::standard::StandardAnalyzer;
pub use token::{Token, TokenStream};
pub use token_filter::Filter;
pub use tokenizer::Tokenizer;
