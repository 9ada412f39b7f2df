//! Binary / OCR-garbage detection for candidate values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Letters followed by a long digit run, e.g. "bL13333333": a misread
    // table border or barcode rather than a real identifier.
    static ref OCR_MISREAD: Regex = Regex::new(r"(?i)^[a-z]{1,2}\d{6,}$").unwrap();
}

/// Separator punctuation that does not count towards the special ratio.
const SEPARATORS: &[char] = &['/', '\\', '-', '_', '.', ',', ':', '(', ')', '&', '₹'];

/// Ratios above which a candidate is treated as noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorruptionThresholds {
    pub min_len: usize,
    pub max_control_ratio: f32,
    pub max_special_ratio: f32,
}

impl CorruptionThresholds {
    /// Used for every extracted field value.
    pub const FIELD: Self = Self {
        min_len: 3,
        max_control_ratio: 0.10,
        max_special_ratio: 0.30,
    };

    /// Stricter limits for work-item descriptions.
    pub const WORK_ITEM: Self = Self {
        min_len: 3,
        max_control_ratio: 0.05,
        max_special_ratio: 0.20,
    };
}

impl Default for CorruptionThresholds {
    fn default() -> Self {
        Self::FIELD
    }
}

/// Whether a candidate value looks like binary data or OCR garbage.
pub fn is_binary_or_corrupted(candidate: &str) -> bool {
    is_corrupted_with(candidate, &CorruptionThresholds::FIELD)
}

pub fn is_corrupted_with(candidate: &str, thresholds: &CorruptionThresholds) -> bool {
    let trimmed = candidate.trim();
    let total = trimmed.chars().count();
    if total < thresholds.min_len {
        return true;
    }

    let control = trimmed.chars().filter(|c| is_control_byte(*c)).count();
    if control as f32 / total as f32 > thresholds.max_control_ratio {
        return true;
    }

    let special = trimmed.chars().filter(|c| is_special(*c)).count();
    if special as f32 / total as f32 > thresholds.max_special_ratio {
        return true;
    }

    total < 15 && OCR_MISREAD.is_match(trimmed)
}

fn is_control_byte(c: char) -> bool {
    matches!(c as u32, 0x00..=0x08 | 0x0E..=0x1F)
}

fn is_special(c: char) -> bool {
    !(c.is_alphanumeric() || c.is_whitespace() || SEPARATORS.contains(&c))
}
