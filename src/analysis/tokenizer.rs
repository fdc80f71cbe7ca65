//! Tokenizer implementations for text analysis.
//!
//! Tokenizers split input text into tokens and record each token's byte
//! offsets in the input.
//!
//! # Available Tokenizers
//!
//! - [`regex::RegexTokenizer`] - Custom regex-based tokenization (default `\w+`)
//! - [`unicode_word::UnicodeWordTokenizer`] - Uses Unicode word boundaries
//!
//! # Examples
//!
//! ```
//! use glaive::analysis::tokenizer::Tokenizer;
//! use glaive::analysis::tokenizer::regex::RegexTokenizer;
//!
//! let tokenizer = RegexTokenizer::new().unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so that one tokenizer can serve
/// concurrent indexing and highlighting calls.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod regex;
pub mod unicode_word;

pub use regex::RegexTokenizer;
pub use unicode_word::UnicodeWordTokenizer;
