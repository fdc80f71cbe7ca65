//! Query parser for converting string queries to structured query objects.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::standard::StandardAnalyzer;
use crate::error::{GlaiveError, Result};
use crate::query::boolean::{BooleanClause, BooleanQuery, Occur};
use crate::query::phrase::PhraseQuery;
use crate::query::prefix::PrefixQuery;
use crate::query::query::Query;
use crate::query::term::TermQuery;
use crate::query::wildcard::WildcardQuery;

/// A small query parser.
///
/// Supported syntax:
/// - Simple terms: `hello`
/// - Field-specific terms: `title:hello`
/// - Phrases: `"hello world"`, `body:"hello world"`
/// - Required and prohibited clauses: `+required -forbidden optional`
/// - `AND` / `OR` between clauses: `title:hello AND body:world`
/// - Groups: `(hello OR world)`, `body:(hello world)`
/// - Prefix and wildcard terms: `high*`, `te?t`
///
/// Plain terms and phrases go through the parser's analyzer, so they end up
/// in indexed form. Prefix and wildcard patterns are only lowercased.
pub struct QueryParser {
    default_field: Option<String>,
    analyzer: Arc<dyn Analyzer>,
}

impl QueryParser {
    /// Create a parser analyzing terms with `analyzer`.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        QueryParser {
            default_field: None,
            analyzer,
        }
    }

    /// Create a parser using the standard analyzer.
    pub fn standard() -> Result<Self> {
        Ok(Self::new(Arc::new(StandardAnalyzer::new()?)))
    }

    /// Set the default field to search in when no field is specified.
    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn default_field(&self) -> Option<&str> {
        self.default_field.as_deref()
    }

    /// Parse a query string into a Query object.
    pub fn parse(&self, query_str: &str) -> Result<Box<dyn Query>> {
        let mut parser = QueryStringParser {
            chars: query_str.trim().chars().peekable(),
            field: self.default_field.clone(),
            analyzer: self.analyzer.as_ref(),
        };
        let clauses = parser.parse_group(false)?;
        Ok(simplify(clauses))
    }
}

impl fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParser")
            .field("default_field", &self.default_field)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

fn tokens_query(field: &str, mut tokens: Vec<String>) -> Option<Box<dyn Query>> {
    match tokens.len() {
        0 => None,
        1 => {
            let text = tokens.pop()?;
            Some(Box::new(TermQuery::new(field, text)) as Box<dyn Query>)
        }
        _ => Some(Box::new(PhraseQuery::new(field, tokens)) as Box<dyn Query>),
    }
}

fn simplify(mut clauses: Vec<BooleanClause>) -> Box<dyn Query> {
    if clauses.len() == 1 && clauses[0].occur == Occur::Should {
        if let Some(clause) = clauses.pop() {
            return clause.query;
        }
    }
    let mut query = BooleanQuery::new();
    for clause in clauses {
        query.add_clause(clause);
    }
    Box::new(query)
}

struct QueryStringParser<'a> {
    chars: Peekable<Chars<'a>>,
    field: Option<String>,
    analyzer: &'a dyn Analyzer,
}

impl QueryStringParser<'_> {
    fn parse_group(&mut self, nested: bool) -> Result<Vec<BooleanClause>> {
        let mut clauses: Vec<BooleanClause> = Vec::new();
        let mut pending_and = false;

        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                None if nested => return Err(GlaiveError::parse("missing closing parenthesis")),
                None => break,
                Some(')') if nested => {
                    self.chars.next();
                    break;
                }
                Some(')') => return Err(GlaiveError::parse("unexpected ')'")),
                _ => {}
            }

            if self.consume_keyword("AND") {
                if let Some(last) = clauses.last_mut() {
                    if last.occur == Occur::Should {
                        last.occur = Occur::Must;
                    }
                }
                pending_and = true;
                continue;
            }
            if self.consume_keyword("OR") {
                continue;
            }

            let occur = match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    Occur::Must
                }
                Some('-') => {
                    self.chars.next();
                    Occur::MustNot
                }
                _ if pending_and => Occur::Must,
                _ => Occur::Should,
            };
            pending_and = false;

            if let Some(query) = self.parse_clause()? {
                clauses.push(BooleanClause::new(query, occur));
            }
        }

        Ok(clauses)
    }

    fn parse_clause(&mut self) -> Result<Option<Box<dyn Query>>> {
        match self.chars.peek() {
            Some('(') => {
                self.chars.next();
                let clauses = self.parse_group(true)?;
                return Ok((!clauses.is_empty()).then(|| simplify(clauses)));
            }
            Some('"') => {
                let field = self.require_field()?;
                return self.parse_phrase(&field);
            }
            _ => {}
        }

        let word = self.consume_word();
        if word.is_empty() {
            return Err(GlaiveError::parse("expected a term"));
        }

        let Some((field, text)) = word.split_once(':').filter(|(f, _)| !f.is_empty()) else {
            let field = self.require_field()?;
            return self.term_query(&field, &word);
        };
        let field = field.to_string();

        if !text.is_empty() {
            return self.term_query(&field, text);
        }
        match self.chars.peek() {
            Some('"') => self.parse_phrase(&field),
            Some('(') => {
                self.chars.next();
                let outer = self.field.replace(field);
                let clauses = self.parse_group(true);
                self.field = outer;
                let clauses = clauses?;
                Ok((!clauses.is_empty()).then(|| simplify(clauses)))
            }
            _ => Err(GlaiveError::parse(format!("missing term after '{field}:'"))),
        }
    }

    fn parse_phrase(&mut self, field: &str) -> Result<Option<Box<dyn Query>>> {
        // opening quote
        self.chars.next();

        let mut phrase = String::new();
        let mut closed = false;
        for ch in self.chars.by_ref() {
            if ch == '"' {
                closed = true;
                break;
            }
            phrase.push(ch);
        }
        if !closed {
            return Err(GlaiveError::parse("unterminated phrase"));
        }

        let tokens: Vec<String> = self.analyzer.analyze(&phrase)?.map(|t| t.text).collect();
        Ok(tokens_query(field, tokens))
    }

    fn term_query(&self, field: &str, text: &str) -> Result<Option<Box<dyn Query>>> {
        if text.contains(['*', '?']) {
            let pattern = text.to_lowercase();
            if let Some(prefix) = pattern.strip_suffix('*') {
                if !prefix.contains(['*', '?', '\\']) {
                    return Ok(Some(Box::new(PrefixQuery::new(field, prefix))));
                }
            }
            return Ok(Some(Box::new(WildcardQuery::new(field, pattern)?)));
        }

        let tokens: Vec<String> = self.analyzer.analyze(text)?.map(|t| t.text).collect();
        Ok(tokens_query(field, tokens))
    }

    fn require_field(&self) -> Result<String> {
        self.field.clone().ok_or_else(|| {
            GlaiveError::parse("No default field specified and no field prefix found")
        })
    }

    fn consume_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            let opens_field_body = (ch == '"' || ch == '(') && word.ends_with(':');
            if ch.is_whitespace() || ch == ')' || opens_field_body {
                break;
            }
            word.push(ch);
            self.chars.next();
        }
        word
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        let mut lookahead = self.chars.clone();
        for expected in keyword.chars() {
            if lookahead.next() != Some(expected) {
                return false;
            }
        }
        match lookahead.peek() {
            None => {}
            Some(c) if c.is_whitespace() => {}
            Some(_) => return false,
        }
        self.chars = lookahead;
        true
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }
}
