//! Core library for tender document analysis.
//!
//! This crate provides:
//! - Pattern-based field extraction for Indian procurement notices
//!   (identifiers, organization, financials, descriptive terms)
//! - Date collection and role assignment
//! - Bill-of-quantity work-item parsing
//! - Cross-bid similarity and red-flag detection
//! - Compliance scoring and an optional hosted completion path
//! - PDF text loading (feature `pdf`)

pub mod analysis;
pub mod completion;
pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod rules;
pub mod text;

pub use analysis::{Analyzer, TenderAnalyzer, analyze, compare_documents, extract};
pub use completion::{CompletionService, NoCompletion};
pub use error::{CompletionError, PdfError, Result, TendrError};
pub use models::comparison::{ComparisonResult, ComplianceReport, VendorDocument};
pub use models::config::TendrConfig;
pub use models::tender::{
    AnalysisSource, DateRole, DateSchedule, Document, ExtractionResult, Field, FieldExtraction,
    FieldValue, WorkItem,
};
pub use rules::Vocabulary;
pub use text::is_binary_or_corrupted;
