//! Mandatory clause coverage.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::comparison::ComplianceReport;
use crate::models::tender::AnalysisSource;

lazy_static! {
    /// Clauses every tender or bid is expected to carry, with the phrases
    /// that count as mentioning them.
    pub static ref MANDATORY_CLAUSES: Vec<(&'static str, Regex)> = vec![
        (
            "Performance Guarantee",
            Regex::new(r"(?i)\bperformance\s+(?:bank\s+)?(?:guarantee|security)|\bPBG\b").unwrap(),
        ),
        (
            "Payment Terms",
            Regex::new(r"(?i)\bpayment\s+(?:terms?|schedule|conditions?)\b|\bterms\s+of\s+payment\b").unwrap(),
        ),
        (
            "EMD",
            Regex::new(r"(?i)\bEMD\b|\bearnest\s+money\b|\bbid\s+security\b").unwrap(),
        ),
        (
            "Liquidated Damages",
            Regex::new(r"(?i)\bliquidated\s+damages?\b|\bLD\s+clause\b|\bpenalty\s+for\s+delay\b").unwrap(),
        ),
        (
            "Termination Clause",
            Regex::new(r"(?i)\btermination\b|\bterminate\s+the\s+contract\b").unwrap(),
        ),
    ];
}

/// Mandatory clauses mentioned in `text`, in list order.
pub fn present_clauses(text: &str) -> Vec<&'static str> {
    MANDATORY_CLAUSES
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(name, _)| *name)
        .collect()
}

/// Mandatory clauses not mentioned in `text`, in list order.
pub fn missing_clauses(text: &str) -> Vec<&'static str> {
    MANDATORY_CLAUSES
        .iter()
        .filter(|(_, pattern)| !pattern.is_match(text))
        .map(|(name, _)| *name)
        .collect()
}

/// Pattern-based clause report.
pub fn check_compliance(text: &str) -> ComplianceReport {
    let present = present_clauses(text);
    let missing = missing_clauses(text);
    let score = (present.len() * 100 / MANDATORY_CLAUSES.len()) as u8;

    ComplianceReport {
        present_clauses: present.iter().map(|c| c.to_string()).collect(),
        missing_clauses: missing.iter().map(|c| c.to_string()).collect(),
        score,
        compliant: missing.is_empty(),
        source: AnalysisSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_clauses_present() {
        let text = "Performance Bank Guarantee of 5%. Payment Terms: 90% on delivery. \
                    EMD Rs. 50,000. Liquidated Damages at 0.5% per week. \
                    Termination for default applies.";
        let report = check_compliance(text);
        assert!(report.compliant);
        assert_eq!(report.score, 100);
        assert!(report.missing_clauses.is_empty());
    }

    #[test]
    fn test_missing_clauses_reported_in_order() {
        let report = check_compliance("Earnest Money Deposit: Rs. 10,000. Payment schedule attached.");
        assert_eq!(report.present_clauses, vec!["Payment Terms", "EMD"]);
        assert_eq!(
            report.missing_clauses,
            vec!["Performance Guarantee", "Liquidated Damages", "Termination Clause"]
        );
        assert_eq!(report.score, 40);
        assert!(!report.compliant);
    }

    #[test]
    fn test_emd_needs_whole_word() {
        assert!(!present_clauses("EMDEN harbour works").contains(&"EMD"));
    }
}
