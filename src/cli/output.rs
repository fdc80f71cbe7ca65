//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::cli::args::{GlaiveArgs, OutputFormat};
use crate::error::Result;
use crate::index::DocId;

/// Result structure for highlighting.
#[derive(Debug, Serialize, Deserialize)]
pub struct HighlightResults {
    pub query: String,
    pub total_hits: u64,
    pub documents_indexed: u64,
    pub duration_ms: u64,
    pub hits: Vec<HighlightHit>,
}

/// The snippets of one document, keyed by field.
#[derive(Debug, Serialize, Deserialize)]
pub struct HighlightHit {
    pub doc: DocId,
    pub highlights: BTreeMap<String, Option<String>>,
}

/// Result structure for text analysis.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub analyzer: String,
    pub tokens: Vec<Token>,
}

/// Results that know how to print themselves for a terminal.
pub trait HumanOutput {
    fn render_human(&self) -> String;
}

impl HumanOutput for HighlightResults {
    fn render_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Query: {}\n", self.query));
        out.push_str(&format!(
            "{} of {} documents matched ({} ms)\n",
            self.total_hits, self.documents_indexed, self.duration_ms
        ));
        for hit in &self.hits {
            out.push_str(&format!("\nDocument {}\n", hit.doc));
            for (field, snippet) in &hit.highlights {
                match snippet {
                    Some(snippet) => out.push_str(&format!("  {field}: {snippet}\n")),
                    None => out.push_str(&format!("  {field}: -\n")),
                }
            }
        }
        out
    }
}

impl HumanOutput for AnalysisResults {
    fn render_human(&self) -> String {
        let mut out = format!("Analyzer: {}\n", self.analyzer);
        for token in &self.tokens {
            out.push_str(&format!(
                "  {:>3}  [{:>4}, {:>4})  {}\n",
                token.position, token.start_offset, token.end_offset, token.text
            ));
        }
        out
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(result: &T, args: &GlaiveArgs) -> Result<()> {
    print!("{}", render(result, args)?);
    Ok(())
}

/// Render a result in the specified format.
pub fn render<T: Serialize + HumanOutput>(result: &T, args: &GlaiveArgs) -> Result<String> {
    match args.output_format {
        OutputFormat::Human => Ok(result.render_human()),
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            Ok(json + "\n")
        }
    }
}
