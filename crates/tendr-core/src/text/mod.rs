//! Text normalization and noise detection.

mod corruption;

pub use corruption::{CorruptionThresholds, is_binary_or_corrupted, is_corrupted_with};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t\u{00a0}\u{000b}\u{000c}]+").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref BRACKETED_MARKER: Regex = Regex::new(r"\[[^\]\n]*\]").unwrap();
}

/// Collapse whitespace runs to single spaces and blank-line runs to one
/// blank line. Line structure is otherwise preserved.
pub fn normalize_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<String> = unified
        .lines()
        .map(|line| HORIZONTAL_WS.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");
    BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
}

/// Number of characters left once `[page 3]`-style markers are removed.
pub fn meaningful_char_count(text: &str) -> usize {
    BRACKETED_MARKER
        .replace_all(text, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .count()
}

/// Two views of one document.
///
/// Row-oriented parsers need the original line breaks and column spacing;
/// label matchers work on the normalized view.
#[derive(Debug, Clone)]
pub struct TextView<'a> {
    raw: &'a str,
    normalized: String,
}

impl<'a> TextView<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            normalized: normalize_whitespace(raw),
        }
    }

    /// Original text with tabs and column spacing intact.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Whitespace-normalized text with line breaks kept.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        let text = "Tender   ID:\t\t2025_ABC_1\r\n\n\n\nOrganization:  Coal   India";
        assert_eq!(
            normalize_whitespace(text),
            "Tender ID: 2025_ABC_1\n\nOrganization: Coal India"
        );
    }

    #[test]
    fn test_normalize_keeps_single_line_breaks() {
        assert_eq!(normalize_whitespace("a\nb\n\nc"), "a\nb\n\nc");
    }

    #[test]
    fn test_meaningful_char_count_strips_markers() {
        assert_eq!(meaningful_char_count("[Page 1] [image]  ab c"), 3);
    }

    #[test]
    fn test_text_view_keeps_raw() {
        let view = TextView::new("1\tRoof Bolts\t20 Nos");
        assert_eq!(view.raw(), "1\tRoof Bolts\t20 Nos");
        assert_eq!(view.normalized(), "1 Roof Bolts 20 Nos");
    }
}
