//! Loading the stored text of the fields being highlighted.

use crate::error::Result;
use crate::index::stored::{StoredFieldVisitor, VisitStatus};
use crate::index::{DocId, IndexReader};

/// Collects the requested stored fields of one document, joining multiple
/// values with a per-field separator and cutting each field off after
/// `max_length` characters.
#[derive(Debug)]
pub(crate) struct LimitedStoredFieldVisitor<'a> {
    // (name, position in the caller's field list), sorted by name
    sorted: Vec<(&'a str, usize)>,
    separators: &'a [char],
    max_length: usize,
    builders: Vec<String>,
    char_counts: Vec<usize>,
    seen: Vec<bool>,
    current: Option<usize>,
}

impl<'a> LimitedStoredFieldVisitor<'a> {
    pub(crate) fn new(fields: &'a [&'a str], separators: &'a [char], max_length: usize) -> Self {
        let mut sorted: Vec<(&str, usize)> = fields.iter().copied().zip(0..).collect();
        sorted.sort_unstable();
        LimitedStoredFieldVisitor {
            sorted,
            separators,
            max_length,
            builders: vec![String::new(); fields.len()],
            char_counts: vec![0; fields.len()],
            seen: vec![false; fields.len()],
            current: None,
        }
    }

    fn lookup(&self, field: &str) -> Option<usize> {
        self.sorted
            .binary_search_by(|(name, _)| (*name).cmp(field))
            .ok()
            .map(|i| self.sorted[i].1)
    }

    /// The collected text of every field, in the caller's order.
    pub(crate) fn into_values(self) -> Vec<String> {
        self.builders
    }
}

impl StoredFieldVisitor for LimitedStoredFieldVisitor<'_> {
    fn needs_field(&mut self, field: &str) -> VisitStatus {
        self.current = self.lookup(field);
        match self.current {
            None => VisitStatus::No,
            Some(i) if self.char_counts[i] >= self.max_length => {
                if self.builders.len() == 1 {
                    VisitStatus::Stop
                } else {
                    VisitStatus::No
                }
            }
            Some(_) => VisitStatus::Yes,
        }
    }

    fn string_field(&mut self, _field: &str, value: &str) {
        let Some(i) = self.current else {
            return;
        };
        let builder = &mut self.builders[i];
        let count = &mut self.char_counts[i];

        // every value after the first is preceded by a separator, empty ones included
        if std::mem::replace(&mut self.seen[i], true) && *count < self.max_length {
            builder.push(self.separators[i]);
            *count += 1;
        }
        let room = self.max_length.saturating_sub(*count);
        match value.char_indices().nth(room) {
            Some((cut, _)) => {
                builder.push_str(&value[..cut]);
                *count += room;
            }
            None => {
                builder.push_str(value);
                *count += value.chars().count();
            }
        }
    }
}

/// Load `fields` for every document of `docs`.
///
/// The result is indexed `[field][doc]`, following the order of both
/// arguments. A document without a field gets an empty string.
pub(crate) fn load_field_values(
    reader: &dyn IndexReader,
    fields: &[&str],
    separators: &[char],
    docs: &[DocId],
    max_length: usize,
) -> Result<Vec<Vec<String>>> {
    let mut contents = vec![Vec::with_capacity(docs.len()); fields.len()];
    for &doc in docs {
        let mut visitor = LimitedStoredFieldVisitor::new(fields, separators, max_length);
        reader.document(doc, &mut visitor)?;
        for (column, value) in contents.iter_mut().zip(visitor.into_values()) {
            column.push(value);
        }
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Document, MemoryIndex};

    fn visit(values: &[(&str, &str)], fields: &[&str], separators: &[char], max_length: usize) -> Vec<String> {
        let mut visitor = LimitedStoredFieldVisitor::new(fields, separators, max_length);
        for (name, value) in values {
            match visitor.needs_field(name) {
                VisitStatus::Yes => visitor.string_field(name, value),
                VisitStatus::No => {}
                VisitStatus::Stop => break,
            }
        }
        visitor.into_values()
    }

    #[test]
    fn test_joins_values_with_separator() {
        let values = [("title", "a b"), ("body", "first"), ("title", "c"), ("body", "second")];
        let out = visit(&values, &["title", "body"], &['|', ' '], 100);
        assert_eq!(out, vec!["a b|c".to_string(), "first second".to_string()]);
    }

    #[test]
    fn test_empty_values_keep_their_separators() {
        let values = [("body", ""), ("body", "fox"), ("body", ""), ("body", "end")];
        let out = visit(&values, &["body"], &[' '], 100);
        assert_eq!(out, vec![" fox  end".to_string()]);
    }

    #[test]
    fn test_truncates_in_characters() {
        let values = [("body", "h\u{e9}llo w\u{f6}rld")];
        let out = visit(&values, &["body"], &[' '], 4);
        assert_eq!(out, vec!["h\u{e9}ll".to_string()]);
    }

    #[test]
    fn test_separator_counts_toward_limit() {
        let values = [("body", "abc"), ("body", "defgh")];
        let out = visit(&values, &["body"], &[' '], 6);
        assert_eq!(out, vec!["abc de".to_string()]);
    }

    #[test]
    fn test_stops_when_single_field_is_full() {
        let mut visitor = LimitedStoredFieldVisitor::new(&["body"], &[' '], 3);
        assert_eq!(visitor.needs_field("body"), VisitStatus::Yes);
        visitor.string_field("body", "abcdef");
        assert_eq!(visitor.needs_field("body"), VisitStatus::Stop);
        assert_eq!(visitor.needs_field("other"), VisitStatus::No);
    }

    #[test]
    fn test_skips_full_field_among_several() {
        let mut visitor = LimitedStoredFieldVisitor::new(&["body", "title"], &[' ', ' '], 3);
        visitor.needs_field("body");
        visitor.string_field("body", "abcdef");
        assert_eq!(visitor.needs_field("body"), VisitStatus::No);
        assert_eq!(visitor.needs_field("title"), VisitStatus::Yes);
    }

    #[test]
    fn test_load_field_values() {
        let docs = vec![
            Document::builder().add_text("body", "one").add_text("title", "T1").build(),
            Document::builder().add_text("title", "T2").build(),
        ];
        let index = MemoryIndex::from_documents(&docs).unwrap();
        let contents = load_field_values(&index, &["body", "title"], &[' ', ' '], &[0, 1], 100).unwrap();
        assert_eq!(contents[0], vec!["one".to_string(), String::new()]);
        assert_eq!(contents[1], vec!["T1".to_string(), "T2".to_string()]);

        assert!(load_field_values(&index, &["body"], &[' '], &[7], 100).is_err());
    }
}
