//! Structural checks on selected passages over generated documents.

use std::sync::Arc;

use glaive::error::Result;
use glaive::highlight::*;
use glaive::index::*;
use glaive::query::*;

const WORDS: [&str; 12] = [
    "search", "engine", "passage", "term", "offset", "query", "field", "score", "index", "token",
    "boundary", "snippet",
];

/// Deterministic capitalized sentences of varying length built from `WORDS`.
fn generate_documents(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let mut text = String::new();
            for sentence in 0..(2 + i % 5) {
                let len = 3 + (i * 3 + sentence * 5) % 9;
                let words: Vec<&str> = (0..len)
                    .map(|j| WORDS[(i * 7 + sentence * 11 + j * 13) % WORDS.len()])
                    .collect();
                let sentence_text = words.join(" ");
                // a lowercase start would not begin a new sentence
                let mut chars = sentence_text.chars();
                if let Some(first) = chars.next() {
                    text.extend(first.to_uppercase());
                    text.push_str(chars.as_str());
                }
                text.push_str(". ");
            }
            text
        })
        .collect()
}

fn searcher_for(bodies: &[String]) -> Result<IndexSearcher> {
    let docs: Vec<Document> = bodies
        .iter()
        .map(|body| Document::builder().add_text("body", body.as_str()).build())
        .collect();
    Ok(IndexSearcher::new(Arc::new(MemoryIndex::from_documents(&docs)?)))
}

fn query() -> BooleanQuery {
    BooleanQueryBuilder::new()
        .should(Box::new(TermQuery::new("body", "passage")))
        .should(Box::new(TermQuery::new("body", "offset")))
        .should(Box::new(TermQuery::new("body", "snippet")))
        .build()
}

#[test]
fn test_passages_are_sorted_disjoint_and_bounded() -> Result<()> {
    let bodies = generate_documents(40);
    let searcher = searcher_for(&bodies)?;
    let doc_ids: Vec<DocId> = (0..bodies.len() as DocId).collect();
    let highlighter = PostingsHighlighter::default();

    for max_passages in [1, 2, 3] {
        let result =
            highlighter.highlight_fields_as_passages(&["body"], &query(), &searcher, &doc_ids, &[max_passages])?;
        for (doc, entry) in result["body"].iter().enumerate() {
            let entry = entry.as_ref().expect("every document has text");
            assert_eq!(entry.doc, doc as DocId);
            assert!(!entry.passages.is_empty());
            assert!(entry.passages.len() <= max_passages);

            for pair in entry.passages.windows(2) {
                assert!(pair[0].end_offset() <= pair[1].start_offset());
            }
            for passage in &entry.passages {
                assert!(passage.start_offset() < passage.end_offset());
                assert!(passage.end_offset() <= entry.content.len());
                for m in passage.matches() {
                    assert!(passage.start_offset() <= m.start_offset);
                    assert!(m.end_offset <= passage.end_offset());
                    assert_eq!(entry.content[m.start_offset..m.end_offset].to_lowercase(), &*m.term);
                }
                for pair in passage.matches().windows(2) {
                    assert!(pair[0].start_offset <= pair[1].start_offset);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_stripping_tags_restores_passage_text() -> Result<()> {
    let bodies = generate_documents(25);
    let searcher = searcher_for(&bodies)?;
    let doc_ids: Vec<DocId> = (0..bodies.len() as DocId).collect();
    let highlighter = PostingsHighlighter::default();

    let passages = highlighter.highlight_fields_as_passages(&["body"], &query(), &searcher, &doc_ids, &[1])?;
    let snippets = highlighter.highlight_fields(&["body"], &query(), &searcher, &doc_ids, &[1])?;

    for (entry, snippet) in passages["body"].iter().zip(&snippets["body"]) {
        let entry = entry.as_ref().expect("passages");
        let snippet = snippet.as_deref().expect("snippet");
        let passage = &entry.passages[0];
        let stripped = snippet.replace("<b>", "").replace("</b>", "");
        assert_eq!(stripped, entry.content[passage.start_offset()..passage.end_offset()]);
        assert_eq!(snippet.matches("<b>").count(), passage.num_matches());
    }
    Ok(())
}

#[test]
fn test_scoring_is_repeatable() -> Result<()> {
    let bodies = generate_documents(30);
    let searcher = searcher_for(&bodies)?;
    let doc_ids: Vec<DocId> = (0..bodies.len() as DocId).rev().collect();
    let highlighter = PostingsHighlighter::default();

    let first = highlighter.highlight_fields_as_passages(&["body"], &query(), &searcher, &doc_ids, &[2])?;
    let second = highlighter.highlight_fields_as_passages(&["body"], &query(), &searcher, &doc_ids, &[2])?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_escaped_output_has_no_markup_characters() -> Result<()> {
    let bodies = vec!["Tom & Jerry <3 'cheese' \"now\" / done.".to_string()];
    let searcher = searcher_for(&bodies)?;
    let highlighter = PostingsHighlighter::new(HighlighterConfig::default().with_escape(true))?;

    let query = TermQuery::new("body", "jerry");
    let snippets = highlighter.highlight_fields(&["body"], &query, &searcher, &[0], &[1])?;
    let snippet = snippets["body"][0].as_deref().expect("snippet");

    assert!(snippet.starts_with("Tom&#32;&amp;&#32;<b>Jerry</b>&#32;&lt;3"));
    let text = snippet.replace("<b>", "").replace("</b>", "");
    for c in ['<', '>', '"', '\''] {
        assert!(!text.contains(c), "raw {c:?} in {text}");
    }
    for (i, _) in text.match_indices('&') {
        let entity_end = text[i..].find(';').expect("entity is terminated");
        assert!(text[i + 1..i + entity_end].chars().all(|c| c.is_ascii_alphanumeric() || c == '#'));
    }
    assert!(text.contains("cheese") && text.contains("now") && text.contains("done"));
    Ok(())
}
