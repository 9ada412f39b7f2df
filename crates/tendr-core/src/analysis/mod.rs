//! Document analysis: single-document extraction, bid comparison and
//! compliance validation.

mod analyzer;
pub mod compare;
pub mod compliance;
pub mod summary;

pub use analyzer::{Analyzer, TenderAnalyzer, analyze, extract};
pub use compare::compare_documents;
pub use compliance::{MANDATORY_CLAUSES, check_compliance};
pub use summary::{compliance_score, key_points};
