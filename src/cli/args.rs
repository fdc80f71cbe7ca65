//! Command line argument parsing for the Glaive CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::highlight::BoundaryKind;

/// Glaive - postings-based passage highlighting
#[derive(Parser, Debug, Clone)]
#[command(name = "glaive")]
#[command(about = "Highlight the best passages of documents matching a query")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct GlaiveArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl GlaiveArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index a JSONL file in memory, run a query and highlight the hits
    Highlight(HighlightArgs),

    /// Show the tokens an analyzer produces for a text
    Analyze(AnalyzeArgs),
}

/// Arguments for highlighting
#[derive(Parser, Debug, Clone)]
pub struct HighlightArgs {
    /// Document file, one JSON object per line
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Fields to highlight (comma-separated)
    #[arg(long = "field", value_delimiter = ',', default_value = "body")]
    pub fields: Vec<String>,

    /// Field searched by unqualified query terms (default: the first field)
    #[arg(long)]
    pub default_field: Option<String>,

    /// Maximum number of documents to highlight
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Maximum passages per field
    #[arg(short = 'n', long, default_value = "1")]
    pub max_passages: usize,

    /// How passages are delimited
    #[arg(short, long, default_value = "sentence")]
    pub boundary: BoundaryChoice,

    /// Characters of each field to consider
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Text inserted before each match
    #[arg(long)]
    pub pre_tag: Option<String>,

    /// Text inserted after each match
    #[arg(long)]
    pub post_tag: Option<String>,

    /// Text inserted between non-adjacent passages
    #[arg(long)]
    pub ellipsis: Option<String>,

    /// Escape the output for HTML
    #[arg(long)]
    pub escape: bool,

    /// Show nothing for documents in which no term matched
    #[arg(long)]
    pub no_fallback: bool,

    /// Highlighter configuration file (JSON); flags override its values
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Highlight fields in parallel
    #[arg(long)]
    pub parallel: bool,
}

impl HighlightArgs {
    /// The field unqualified query terms search in.
    pub fn effective_default_field(&self) -> &str {
        self.default_field
            .as_deref()
            .or_else(|| self.fields.first().map(String::as_str))
            .unwrap_or("body")
    }
}

/// Arguments for analyzing text
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Analyzer to use
    #[arg(short, long, default_value = "standard")]
    pub analyzer: AnalyzerChoice,
}

/// Boundary kinds selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryChoice {
    Sentence,
    Word,
    Line,
    Whole,
}

impl From<BoundaryChoice> for BoundaryKind {
    fn from(choice: BoundaryChoice) -> Self {
        match choice {
            BoundaryChoice::Sentence => BoundaryKind::Sentence,
            BoundaryChoice::Word => BoundaryKind::Word,
            BoundaryChoice::Line => BoundaryKind::Line,
            BoundaryChoice::Whole => BoundaryKind::Whole,
        }
    }
}

/// Analyzers selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerChoice {
    /// Unicode words, lowercased
    Standard,
    /// The whole text as one token
    Keyword,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_args() {
        let args = GlaiveArgs::try_parse_from([
            "glaive",
            "highlight",
            "docs.jsonl",
            "body:test",
            "--field",
            "body,title",
            "-n",
            "3",
            "--boundary",
            "word",
            "--escape",
        ])
        .unwrap();

        assert_eq!(args.verbosity(), 1);
        let Command::Highlight(highlight) = args.command else {
            panic!("Expected Highlight command");
        };
        assert_eq!(highlight.document_file, PathBuf::from("docs.jsonl"));
        assert_eq!(highlight.fields, vec!["body".to_string(), "title".to_string()]);
        assert_eq!(highlight.max_passages, 3);
        assert_eq!(highlight.boundary, BoundaryChoice::Word);
        assert!(highlight.escape);
        assert!(!highlight.no_fallback);
        assert_eq!(highlight.effective_default_field(), "body");
    }

    #[test]
    fn test_global_flags() {
        let args = GlaiveArgs::try_parse_from(["glaive", "-q", "-f", "json", "analyze", "Some text"]).unwrap();
        assert_eq!(args.verbosity(), 0);
        assert_eq!(args.output_format, OutputFormat::Json);
        let Command::Analyze(analyze) = args.command else {
            panic!("Expected Analyze command");
        };
        assert_eq!(analyze.analyzer, AnalyzerChoice::Standard);

        let args = GlaiveArgs::try_parse_from(["glaive", "-vvv", "analyze", "x"]).unwrap();
        assert_eq!(args.verbosity(), 3);
    }

    #[test]
    fn test_default_field_override() {
        let args = GlaiveArgs::try_parse_from([
            "glaive",
            "highlight",
            "docs.jsonl",
            "test",
            "--field",
            "title",
            "--default-field",
            "body",
        ])
        .unwrap();
        let Command::Highlight(highlight) = args.command else {
            panic!("Expected Highlight command");
        };
        assert_eq!(highlight.effective_default_field(), "body");
        assert_eq!(BoundaryKind::from(highlight.boundary), BoundaryKind::Sentence);
    }
}
