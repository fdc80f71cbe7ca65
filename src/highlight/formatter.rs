//! Rendering passages into snippet text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::highlight::passage::Passage;

/// Turns the selected passages of one document into output text.
pub trait PassageFormatter: Send + Sync + fmt::Debug {
    /// Render `passages` (sorted, non-overlapping) taken from `content`.
    fn format(&self, passages: &[Passage], content: &str) -> String;
}

/// Markup settings for [`DefaultPassageFormatter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Text inserted before each match.
    pub pre_tag: String,
    /// Text inserted after each match.
    pub post_tag: String,
    /// Text inserted between passages that are not adjacent.
    pub ellipsis: String,
    /// Escape everything except ASCII letters and digits.
    pub escape: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        FormatterConfig {
            pre_tag: "<b>".to_string(),
            post_tag: "</b>".to_string(),
            ellipsis: "... ".to_string(),
            escape: false,
        }
    }
}

/// Wraps matches in tags and joins passages with an ellipsis.
///
/// ```
/// use glaive::highlight::formatter::{DefaultPassageFormatter, PassageFormatter};
///
/// let formatter = DefaultPassageFormatter::default();
/// assert_eq!(formatter.format(&[], "unused"), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultPassageFormatter {
    config: FormatterConfig,
}

impl DefaultPassageFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        DefaultPassageFormatter { config }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    fn append(&self, out: &mut String, content: &str, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let Some(text) = content.get(start..end) else {
            return;
        };
        if self.config.escape {
            escape_into(out, text);
        } else {
            out.push_str(text);
        }
    }
}

impl PassageFormatter for DefaultPassageFormatter {
    fn format(&self, passages: &[Passage], content: &str) -> String {
        let mut out = String::new();
        let mut pos = 0;

        for passage in passages {
            // no ellipsis before the first passage or between touching ones
            if passage.start_offset() > pos && pos > 0 {
                out.push_str(&self.config.ellipsis);
            }
            pos = passage.start_offset();

            for m in passage.matches() {
                let end = m.end_offset.min(passage.end_offset());
                if m.start_offset > pos {
                    self.append(&mut out, content, pos, m.start_offset);
                }
                // overlapping matches only mark their uncovered tail
                if end > pos {
                    out.push_str(&self.config.pre_tag);
                    self.append(&mut out, content, pos.max(m.start_offset), end);
                    out.push_str(&self.config.post_tag);
                    pos = end;
                }
            }

            self.append(&mut out, content, pos, passage.end_offset());
            pos = passage.end_offset();
        }

        out
    }
}

/// Append `text` with every character outside `[0-9A-Za-z]` replaced by a
/// character reference.
pub fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            c if c.is_ascii_alphanumeric() => out.push(c),
            c => {
                out.push_str("&#");
                out.push_str(&u32::from(c).to_string());
                out.push(';');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::highlight::passage::PassageScore;

    fn passage(start: usize, end: usize, matches: &[(usize, usize)]) -> Passage {
        let term: Arc<str> = Arc::from("t");
        let mut passage = Passage::new();
        passage.open(start, end);
        for &(s, e) in matches {
            passage.add_match(s, e, Arc::clone(&term));
        }
        passage.set_score(PassageScore::Scored(1.0));
        passage
    }

    #[test]
    fn test_tags_and_ellipsis() {
        let content = "This is a test. Just a test highlighting from postings. Feel free to test.";
        let formatter = DefaultPassageFormatter::default();

        let passages = vec![passage(0, 16, &[(10, 14)]), passage(56, 74, &[(69, 73)])];
        assert_eq!(
            formatter.format(&passages, content),
            "This is a <b>test</b>. ... Feel free to <b>test</b>."
        );

        let adjacent = vec![passage(0, 16, &[(10, 14)]), passage(16, 56, &[(23, 27)])];
        assert_eq!(
            formatter.format(&adjacent, content),
            "This is a <b>test</b>. Just a <b>test</b> highlighting from postings. "
        );
    }

    #[test]
    fn test_overlapping_matches() {
        let content = "abcdefgh";
        let formatter = DefaultPassageFormatter::default();
        let passages = vec![passage(0, 8, &[(1, 5), (3, 7)])];
        assert_eq!(formatter.format(&passages, content), "a<b>bcde</b><b>fg</b>h");
    }

    #[test]
    fn test_match_clamped_to_passage() {
        let content = "one two. three";
        let formatter = DefaultPassageFormatter::default();
        let passages = vec![passage(0, 9, &[(4, 12)])];
        assert_eq!(formatter.format(&passages, content), "one <b>two. </b>");
    }

    #[test]
    fn test_custom_tags() {
        let formatter = DefaultPassageFormatter::new(FormatterConfig {
            pre_tag: "[".to_string(),
            post_tag: "]".to_string(),
            ellipsis: " ~ ".to_string(),
            escape: false,
        });
        let content = "aa bb. cc dd. ee ff.";
        let passages = vec![passage(0, 7, &[(0, 2)]), passage(14, 20, &[(17, 19)])];
        assert_eq!(formatter.format(&passages, content), "[aa] bb.  ~ ee [ff].");
    }

    #[test]
    fn test_escaping() {
        let formatter = DefaultPassageFormatter::new(FormatterConfig {
            escape: true,
            ..FormatterConfig::default()
        });
        let content = "Just a test highlighting from <i>postings</i>. ";
        let passages = vec![passage(0, content.len(), &[(12, 24)])];
        assert_eq!(
            formatter.format(&passages, content),
            "Just&#32;a&#32;test&#32;<b>highlighting</b>&#32;from&#32;&lt;i&gt;postings&lt;&#x2F;i&gt;&#46;&#32;"
        );

        let mut out = String::new();
        escape_into(&mut out, "a\"b'c\\d\u{e9}");
        assert_eq!(out, "a&quot;b&#x27;c&#92;d&#233;");
    }

    #[test]
    fn test_fallback_passage_has_no_tags() {
        let formatter = DefaultPassageFormatter::default();
        let passages = vec![Passage::fallback(0, 3)];
        assert_eq!(formatter.format(&passages, "   "), "   ");
    }
}
