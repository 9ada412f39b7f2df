//! Configuration structures for the analysis pipeline.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TendrError};

/// Main configuration for tendr.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TendrConfig {
    /// Single-document extraction configuration.
    pub extraction: ExtractionConfig,

    /// Multi-bid comparison configuration.
    pub comparison: ComparisonConfig,

    /// Hosted completion service configuration.
    pub completion: CompletionConfig,
}

/// Pattern-based extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Documents shorter than this are rejected as empty.
    pub min_text_length: usize,

    /// Maximum work items collected per document.
    pub max_work_items: usize,

    /// Maximum dates kept in the raw date list.
    pub max_dates: usize,

    /// Maximum attachment names kept.
    pub max_attachments: usize,

    /// Characters searched on each side of a date for role keywords.
    pub date_context_window: usize,

    /// Text length (after stripping bracketed markers) above which a
    /// document is considered to carry real text rather than a scan.
    pub scanned_text_threshold: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            max_work_items: 100,
            max_dates: 10,
            max_attachments: 10,
            date_context_window: 80,
            scanned_text_threshold: 100,
        }
    }
}

/// Cross-document comparison thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Prices closer than this percentage are flagged.
    pub price_tolerance_percent: f64,

    /// Word-set similarity above this is a red flag.
    pub similarity_red_flag_percent: f64,

    /// Word-set similarity above this is noted.
    pub similarity_note_percent: f64,

    /// More than this many identical dates is noted.
    pub shared_dates_threshold: usize,

    /// Minimum word length (in characters) counted for similarity.
    pub min_word_length: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            price_tolerance_percent: 1.0,
            similarity_red_flag_percent: 70.0,
            similarity_note_percent: 50.0,
            shared_dates_threshold: 2,
            min_word_length: 4,
        }
    }
}

/// Hosted completion service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Try the completion service before the fallback path.
    pub enabled: bool,

    /// Document text beyond this many characters is cut from prompts.
    pub max_prompt_chars: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_prompt_chars: 12_000,
        }
    }
}

impl TendrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the analyzer cannot work with.
    pub fn validate(&self) -> Result<()> {
        let comparison = &self.comparison;
        if comparison.similarity_note_percent > comparison.similarity_red_flag_percent {
            return Err(TendrError::Config(format!(
                "comparison.similarity_note_percent ({}) exceeds similarity_red_flag_percent ({})",
                comparison.similarity_note_percent, comparison.similarity_red_flag_percent
            )));
        }
        if !(0.0..=100.0).contains(&comparison.price_tolerance_percent) {
            return Err(TendrError::Config(format!(
                "comparison.price_tolerance_percent must be between 0 and 100, got {}",
                comparison.price_tolerance_percent
            )));
        }
        if self.extraction.max_dates == 0 {
            return Err(TendrError::Config("extraction.max_dates must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TendrConfig =
            serde_json::from_str(r#"{"extraction": {"max_work_items": 5}}"#).unwrap();
        assert_eq!(config.extraction.max_work_items, 5);
        assert_eq!(config.extraction.max_dates, 10);
        assert_eq!(config.comparison, ComparisonConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TendrConfig::default();
        config.comparison.price_tolerance_percent = 2.5;
        config.save(&path).unwrap();

        assert_eq!(TendrConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = TendrConfig::from_file(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(TendrError::Io(_))));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "{ not json").unwrap();
        assert!(matches!(TendrConfig::from_file(&garbled), Err(TendrError::Json(_))));

        let inverted = dir.path().join("inverted.json");
        std::fs::write(
            &inverted,
            r#"{"comparison": {"similarity_note_percent": 80.0, "similarity_red_flag_percent": 60.0}}"#,
        )
        .unwrap();
        assert!(matches!(TendrConfig::from_file(&inverted), Err(TendrError::Config(_))));
    }
}
