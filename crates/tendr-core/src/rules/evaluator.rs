//! Ordered pattern lists evaluated first-match-wins.
//!
//! Each field is described by a [`FieldRule`]: patterns in priority order
//! (most specific label first), boilerplate prefixes to strip, keywords at
//! which a capture that ran into the next label is cut, and a validator
//! for field-specific post-processing.

use regex::Regex;
use tracing::trace;

use super::ExtractionMatch;
use crate::models::tender::Field;
use crate::text::is_binary_or_corrupted;

/// Outcome of field-specific validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Accept the (possibly rewritten) value; evaluation stops.
    Accept(String),
    /// Plausible, but keep looking for a better-shaped candidate.
    Weak(String),
    /// Not a value for this field.
    Reject,
}

/// Field-specific post-processing: `(cleaned candidate, full document)`.
pub type Validator = fn(&str, &str) -> Verdict;

fn accept_any(candidate: &str, _text: &str) -> Verdict {
    Verdict::Accept(candidate.to_string())
}

/// Declarative extraction rule for one field.
pub struct FieldRule {
    pub field: Field,
    patterns: Vec<Regex>,
    strip_prefixes: &'static [&'static str],
    stop_pattern: Option<Regex>,
    max_len: usize,
    validator: Validator,
}

impl FieldRule {
    /// Build a rule from patterns in priority order. Each pattern captures
    /// the value in group 1.
    pub fn new(field: Field, patterns: &[&str]) -> Self {
        Self {
            field,
            patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
            strip_prefixes: &[],
            stop_pattern: None,
            max_len: 200,
            validator: accept_any,
        }
    }

    /// Leading tokens that a neighbouring label may have bled into.
    pub fn strip(mut self, prefixes: &'static [&'static str]) -> Self {
        self.strip_prefixes = prefixes;
        self
    }

    /// Keywords (next-field labels) at which the capture is cut.
    pub fn stop_at(mut self, words: &[&str]) -> Self {
        if !words.is_empty() {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            self.stop_pattern = Some(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap());
        }
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Trim, strip bled-in prefixes and truncate at the next label.
    pub fn clean(&self, raw: &str) -> Option<String> {
        let mut value = raw.lines().next().unwrap_or("").trim();
        value = trim_edges(value);

        let mut stripped = true;
        while stripped {
            stripped = false;
            for prefix in self.strip_prefixes {
                if let Some(head) = value.get(..prefix.len()) {
                    let at_word_end = value[prefix.len()..]
                        .chars()
                        .next()
                        .is_none_or(|c| !c.is_alphanumeric());
                    if head.eq_ignore_ascii_case(prefix) && at_word_end {
                        value = trim_edges(&value[prefix.len()..]);
                        stripped = true;
                    }
                }
            }
        }

        if let Some(stop) = &self.stop_pattern {
            if let Some(m) = stop.find(value) {
                value = trim_edges(&value[..m.start()]);
            }
        }

        let value: String = value.chars().take(self.max_len).collect();
        let value = trim_edges(&value).to_string();
        if value.is_empty() { None } else { Some(value) }
    }

    /// Run the patterns in order; the first candidate that survives
    /// cleaning, corruption checks and validation wins. Weak candidates
    /// are only used when nothing is accepted.
    pub fn evaluate(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let mut weak: Option<ExtractionMatch<String>> = None;

        for (rank, pattern) in self.patterns.iter().enumerate() {
            for caps in pattern.captures_iter(text) {
                let Some(raw) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                let Some(cleaned) = self.clean(raw.as_str()) else {
                    continue;
                };
                if is_binary_or_corrupted(&cleaned) {
                    trace!("{:?}: rejected corrupted candidate {:?}", self.field, cleaned);
                    continue;
                }

                match (self.validator)(&cleaned, text) {
                    Verdict::Accept(value) => {
                        let confidence = (0.95 - 0.05 * rank as f32).max(0.5);
                        return Some(ExtractionMatch::new(value, confidence));
                    }
                    Verdict::Weak(value) => {
                        if weak.is_none() {
                            weak = Some(ExtractionMatch::new(value, 0.5));
                        }
                    }
                    Verdict::Reject => {
                        trace!("{:?}: validator rejected {:?}", self.field, cleaned);
                    }
                }
            }
        }

        weak
    }
}

fn trim_edges(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ';' | ',' | '|' | '-' | '='))
}
