//! Command implementations for the Glaive CLI.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::analysis::{Analyzer, KeywordAnalyzer, StandardAnalyzer};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{GlaiveError, Result};
use crate::highlight::{HighlighterConfig, PostingsHighlighter};
use crate::index::{Document, IndexSearcher, MemoryIndexConfig, MemoryIndexWriter};
use crate::query::QueryParser;

/// Execute a CLI command.
pub fn execute_command(args: GlaiveArgs) -> Result<()> {
    match &args.command {
        Command::Highlight(highlight_args) => {
            let results = highlight_documents(highlight_args)?;
            output_result(&results, &args)
        }
        Command::Analyze(analyze_args) => {
            let results = analyze_text(analyze_args)?;
            output_result(&results, &args)
        }
    }
}

/// Index a JSONL document file, search it and highlight the hits.
pub fn highlight_documents(args: &HighlightArgs) -> Result<HighlightResults> {
    let start_time = Instant::now();

    let config = highlighter_config(args)?;
    let highlighter = PostingsHighlighter::new(config.clone())?;

    let docs = load_documents(&args.document_file)?;
    let index_config = MemoryIndexConfig {
        offset_gap: config.multi_valued_separator.len_utf8(),
        ..MemoryIndexConfig::default()
    };
    let mut writer = MemoryIndexWriter::new(index_config)?;
    for doc in &docs {
        writer.add_document(doc)?;
    }
    let documents_indexed = writer.num_docs();
    let searcher = IndexSearcher::new(Arc::new(writer.finish()));
    info!("indexed {} documents from {}", documents_indexed, args.document_file.display());

    let parser = QueryParser::standard()?.with_default_field(args.effective_default_field());
    let query = parser.parse(&args.query)?;
    let top_docs = searcher.search(query.as_ref(), args.limit)?;
    debug!("{} hits for {}", top_docs.total_hits, query.description());

    let doc_ids = top_docs.doc_ids();
    let mut hits = Vec::with_capacity(doc_ids.len());
    if !doc_ids.is_empty() {
        let fields: Vec<&str> = args.fields.iter().map(String::as_str).collect();
        let max_passages = vec![args.max_passages; fields.len()];
        let mut highlights = if args.parallel {
            highlighter.par_highlight_fields(&fields, query.as_ref(), &searcher, &doc_ids, &max_passages)?
        } else {
            highlighter.highlight_fields(&fields, query.as_ref(), &searcher, &doc_ids, &max_passages)?
        };

        for (i, &doc) in doc_ids.iter().enumerate() {
            let snippets: BTreeMap<String, Option<String>> = fields
                .iter()
                .map(|&field| {
                    let snippet = highlights
                        .get_mut(field)
                        .and_then(|column| column.get_mut(i))
                        .and_then(Option::take);
                    (field.to_string(), snippet)
                })
                .collect();
            hits.push(HighlightHit {
                doc,
                highlights: snippets,
            });
        }
    }

    Ok(HighlightResults {
        query: query.description(),
        total_hits: top_docs.total_hits,
        documents_indexed,
        duration_ms: start_time.elapsed().as_millis() as u64,
        hits,
    })
}

/// Run an analyzer over a text.
pub fn analyze_text(args: &AnalyzeArgs) -> Result<AnalysisResults> {
    let analyzer: Box<dyn Analyzer> = match args.analyzer {
        AnalyzerChoice::Standard => Box::new(StandardAnalyzer::new()?),
        AnalyzerChoice::Keyword => Box::new(KeywordAnalyzer::new()),
    };
    let tokens = analyzer.analyze(&args.text)?.collect();
    Ok(AnalysisResults {
        analyzer: analyzer.name().to_string(),
        tokens,
    })
}

/// Build the highlighter configuration from an optional file and the flags.
fn highlighter_config(args: &HighlightArgs) -> Result<HighlighterConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => HighlighterConfig::default().with_boundary(args.boundary.into()),
    };

    if args.config.is_some() && args.boundary != BoundaryChoice::Sentence {
        config = config.with_boundary(args.boundary.into());
    }
    if let Some(max_length) = args.max_length {
        config = config.with_max_length(max_length);
    }
    if let Some(pre_tag) = &args.pre_tag {
        config.formatter.pre_tag = pre_tag.clone();
    }
    if let Some(post_tag) = &args.post_tag {
        config.formatter.post_tag = post_tag.clone();
    }
    if let Some(ellipsis) = &args.ellipsis {
        config = config.with_ellipsis(ellipsis.as_str());
    }
    if args.escape {
        config = config.with_escape(true);
    }
    if args.no_fallback {
        config = config.with_fallback_passages(false);
    }
    Ok(config)
}

/// Read one JSON document per non-empty line.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut docs = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = Document::from_json_str(&line).map_err(|e| {
            GlaiveError::invalid_argument(format!(
                "{}:{}: {e}",
                path.display(),
                line_num + 1
            ))
        })?;
        docs.push(doc);
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    fn jsonl(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    fn highlight_args(argv: &[&str]) -> HighlightArgs {
        let args = GlaiveArgs::try_parse_from(argv).unwrap();
        match args.command {
            Command::Highlight(highlight) => highlight,
            other => panic!("Expected Highlight command, got {other:?}"),
        }
    }

    #[test]
    fn test_highlight_documents() {
        let file = jsonl(&[
            r#"{"body": "This is a test. Just a test highlighting from postings."}"#,
            "",
            r#"{"body": "Nothing relevant."}"#,
        ]);
        let path = file.path().to_str().unwrap();
        let args = highlight_args(&["glaive", "highlight", path, "highlighting"]);

        let results = highlight_documents(&args).unwrap();
        assert_eq!(results.documents_indexed, 2);
        assert_eq!(results.total_hits, 1);
        assert_eq!(results.query, "body:highlighting");
        assert_eq!(
            results.hits[0].highlights["body"].as_deref(),
            Some("Just a test <b>highlighting</b> from postings.")
        );
    }

    #[test]
    fn test_no_hits_gives_empty_results() {
        let file = jsonl(&[r#"{"body": "Nothing relevant."}"#]);
        let path = file.path().to_str().unwrap();
        let args = highlight_args(&["glaive", "highlight", path, "absent"]);
        let results = highlight_documents(&args).unwrap();
        assert_eq!(results.total_hits, 0);
        assert!(results.hits.is_empty());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut config = NamedTempFile::new().unwrap();
        write!(config, r#"{{"max_length": 5, "formatter": {{"pre_tag": "[", "post_tag": "]"}}}}"#).unwrap();
        let config_path = config.path().to_str().unwrap();
        let args = highlight_args(&[
            "glaive",
            "highlight",
            "unused.jsonl",
            "x",
            "--config",
            config_path,
            "--post-tag",
            "}",
            "--boundary",
            "line",
        ]);

        let config = highlighter_config(&args).unwrap();
        assert_eq!(config.max_length, 5);
        assert_eq!(config.formatter.pre_tag, "[");
        assert_eq!(config.formatter.post_tag, "}");
        assert_eq!(config.boundary, crate::highlight::BoundaryKind::Line);
    }

    #[test]
    fn test_bad_document_reports_line() {
        let file = jsonl(&[r#"{"body": "ok"}"#, "not json"]);
        let err = load_documents(file.path()).unwrap_err();
        assert!(err.to_string().contains(":2:"));
    }

    #[test]
    fn test_analyze_text() {
        let args = AnalyzeArgs {
            text: "Hello World".to_string(),
            analyzer: AnalyzerChoice::Standard,
        };
        let results = analyze_text(&args).unwrap();
        let texts: Vec<&str> = results.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "world"]);
        assert_eq!(results.tokens[1].start_offset, 6);
    }
}
