//! Multi-document comparison and compliance models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tender::AnalysisSource;

/// One bid (or tender copy) taking part in a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorDocument {
    /// Vendor label used in every finding.
    pub label: String,
    /// Normalized document text.
    pub text: String,
}

impl VendorDocument {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Category of a cross-document finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Noteworthy overlap, not conclusive on its own.
    Similarity,
    /// Strongly suggests collusion or non-compliance.
    RedFlag,
}

impl FindingKind {
    pub fn marker(&self) -> &'static str {
        match self {
            FindingKind::Similarity => "⚠️",
            FindingKind::RedFlag => "🚩",
        }
    }
}

/// A similarity or red flag citing the vendors involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonFinding {
    pub kind: FindingKind,
    pub description: String,
    pub vendors: Vec<String>,
}

impl ComparisonFinding {
    pub fn similarity(description: impl Into<String>, vendors: Vec<String>) -> Self {
        Self {
            kind: FindingKind::Similarity,
            description: description.into(),
            vendors,
        }
    }

    pub fn red_flag(description: impl Into<String>, vendors: Vec<String>) -> Self {
        Self {
            kind: FindingKind::RedFlag,
            description: description.into(),
            vendors,
        }
    }

    /// Sentence form used in the result lists.
    pub fn render(&self) -> String {
        format!("{} {}", self.kind.marker(), self.description)
    }
}

/// Result of comparing several bids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub vendor_scores: BTreeMap<String, u8>,
    pub similarities: Vec<String>,
    pub red_flags: Vec<String>,
    pub recommendation: String,
    #[serde(default)]
    pub source: AnalysisSource,
}

/// Mandatory clause coverage for a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub present_clauses: Vec<String>,
    pub missing_clauses: Vec<String>,
    /// Share of mandatory clauses present, 0-100.
    pub score: u8,
    pub compliant: bool,
    #[serde(default)]
    pub source: AnalysisSource,
}
