//! Rule-based field extractors for tender documents.

pub mod amounts;
pub mod dates;
pub mod details;
pub mod evaluator;
pub mod identifiers;
pub mod organization;
pub mod patterns;
pub mod vocabulary;
pub mod work_items;

pub use amounts::{PriceToken, extract_financials, find_price_tokens, parse_inr_amount};
pub use dates::{
    AssignmentTier, DateAssignment, DateCandidate, DateExtractor, assign_roles, collect_dates,
    extract_dates,
};
pub use details::extract_details;
pub use evaluator::{FieldRule, Verdict};
pub use identifiers::extract_identifiers;
pub use organization::extract_organization;
pub use vocabulary::Vocabulary;
pub use work_items::{WorkItemFilter, WorkItemParser};

/// A field value with the confidence of the pattern that produced it.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32) -> Self {
        Self { value, confidence }
    }
}
