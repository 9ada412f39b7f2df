//! Issuing organization: name, department, ministry, location and address.

use lazy_static::lazy_static;
use tracing::debug;

use super::evaluator::{FieldRule, Verdict};
use super::patterns;
use crate::models::tender::{Field, FieldExtraction};

/// Labels that follow the organization on GeM and CPPP front pages.
const ORG_STOP_WORDS: &[&str] = &[
    "Pincode",
    "Pin Code",
    "Withdrawal",
    "Tender ID",
    "Tender Reference",
    "Tender Type",
    "Tender Category",
    "Department",
    "Ministry",
    "Office Name",
    "Address",
    "Location",
    "Enquiry",
    "Dated",
];

const DEPARTMENT_STOP_WORDS: &[&str] = &[
    "Pincode",
    "Pin Code",
    "Withdrawal",
    "Tender ID",
    "Tender Reference",
    "Tender Type",
    "Organisation",
    "Organization",
    "Office Name",
    "Address",
    "Location",
    "Dated",
];

const MINISTRY_STOP_WORDS: &[&str] = &[
    "Pincode",
    "Withdrawal",
    "Tender ID",
    "Department",
    "Organisation",
    "Organization",
    "Office Name",
    "Address",
    "Dated",
];

const ADDRESS_STOP_WORDS: &[&str] = &[
    "Phone", "Tel", "Telephone", "Fax", "Email", "E-mail", "Mobile", "Mob", "Contact", "Website",
];

lazy_static! {
    pub static ref ORGANIZATION_NAME: FieldRule = FieldRule::new(Field::OrganizationName, &[
        r"(?i)\borgani[sz]ation\s*(?:name|chain)?\s*[:\-]\s*([^\n]+)",
        r"(?i)\borgani[sz]ation\s+name[^:\n]{0,40}:\s*([^\n]+)",
        r"(?i)\bname\s+of\s+(?:the\s+)?(?:organi[sz]ation|company|employer|buyer)\s*[:\-]?\s*([^\n]+)",
        r"(?i)\b(?:buyer|purchaser|employer)\s*(?:name)?\s*[:\-]\s*([^\n]+)",
        r"\b([A-Z][A-Za-z&.' ]{2,80}?\b(?:Limited|Ltd\.?|Corporation|Board|Authority|Nigam))",
    ])
    .strip(&["Name", "of", "the"])
    .stop_at(ORG_STOP_WORDS)
    .max_len(120)
    .validate(validate_name);

    pub static ref DEPARTMENT_NAME: FieldRule = FieldRule::new(Field::DepartmentName, &[
        r"(?i)\bdepartment\s*(?:name)?\s*[:\-]\s*([^\n]+)",
        r"(?i)\bdeptt?\.?\s*[:\-]\s*([^\n]+)",
        r"(?i)\b(department\s+of\s+[A-Za-z&' ]{3,60})",
    ])
    .strip(&["Name"])
    .stop_at(DEPARTMENT_STOP_WORDS)
    .max_len(120)
    .validate(validate_name);

    pub static ref MINISTRY_NAME: FieldRule = FieldRule::new(Field::MinistryName, &[
        r"(?i)\bministry\s*(?:name)?\s*[:\-]\s*([^\n]+)",
        r"(?i)\bministry[^:\n]{0,40}:\s*([^\n]+)",
        r"(?i)\b(ministry\s+of\s+[A-Za-z&' ]{3,80})",
    ])
    .strip(&["Name"])
    .stop_at(MINISTRY_STOP_WORDS)
    .max_len(120)
    .validate(validate_name);

    pub static ref LOCATION: FieldRule = FieldRule::new(Field::Location, &[
        r"(?i)\b(?:work\s+|tender\s+)?location\s*[:\-]\s*([^\n]+)",
        r"(?i)\bplace\s+of\s+(?:work|delivery|supply|execution)\s*[:\-]?\s*([^\n]+)",
        r"(?i)\bsite\s*[:\-]\s*([^\n]+)",
    ])
    .stop_at(&["Pincode", "Pin Code", "Tender", "Period", "Value", "Dated"])
    .max_len(120)
    .validate(validate_name);

    pub static ref PINCODE: FieldRule = FieldRule::new(Field::Pincode, &[
        patterns::PINCODE.as_str(),
        r"(?i)\bpostal\s+code\s*[:\-]?\s*(\d{3}\s?\d{3})\b",
    ])
    .validate(validate_pincode);

    pub static ref OFFICE_ADDRESS: FieldRule = FieldRule::new(Field::OfficeAddress, &[
        r"(?i)\baddress\s+for\s+communication\s*[:\-]?\s*([^\n]+)",
        r"(?i)\b(?:office\s+)?address\s*(?:of\s+(?:the\s+)?office)?\s*[:\-]\s*([^\n]+)",
    ])
    .stop_at(ADDRESS_STOP_WORDS)
    .validate(validate_address);
}

/// Extract the organization field group.
pub fn extract_organization(text: &str) -> FieldExtraction {
    let mut fields = FieldExtraction::new();

    for rule in [
        &*ORGANIZATION_NAME,
        &*DEPARTMENT_NAME,
        &*MINISTRY_NAME,
        &*LOCATION,
        &*PINCODE,
        &*OFFICE_ADDRESS,
    ] {
        if let Some(found) = rule.evaluate(text) {
            debug!("{:?} = {:?}", rule.field, found.value);
            fields.insert_text(rule.field, found.value);
        }
    }

    fields
}

/// Names need at least three letters; a bare number is another field.
fn validate_name(candidate: &str, _text: &str) -> Verdict {
    let letters = candidate.chars().filter(|c| c.is_alphabetic()).count();
    if letters < 3 {
        Verdict::Reject
    } else {
        Verdict::Accept(candidate.trim_end_matches(['.', ',']).to_string())
    }
}

/// "E-mail Address:" labels an email, not a postal address.
fn validate_address(candidate: &str, text: &str) -> Verdict {
    if candidate.contains('@') {
        return Verdict::Reject;
    }
    validate_name(candidate, text)
}

/// Indian PIN codes: six digits, never starting with zero.
fn validate_pincode(candidate: &str, _text: &str) -> Verdict {
    let digits: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    let valid = digits.len() == 6
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    if valid {
        Verdict::Accept(digits)
    } else {
        Verdict::Reject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_stops_at_pincode() {
        let fields = extract_organization("Organisation Name: Central Coalfields Limited Pincode 834 001");
        assert_eq!(fields.text(Field::OrganizationName), Some("Central Coalfields Limited"));
        assert_eq!(fields.text(Field::Pincode), Some("834001"));
    }

    #[test]
    fn test_organization_stops_at_withdrawal_and_tender_id() {
        let text = "Organisation Chain: Coal India Limited||Northern Coalfields Limited Withdrawal Allowed Yes";
        assert_eq!(
            ORGANIZATION_NAME.evaluate(text).unwrap().value,
            "Coal India Limited||Northern Coalfields Limited"
        );
        let text = "Organization: Western Coalfields Ltd Tender ID 2025_WCL_1";
        assert_eq!(ORGANIZATION_NAME.evaluate(text).unwrap().value, "Western Coalfields Ltd");
    }

    #[test]
    fn test_bilingual_label() {
        let text = "Organisation Name/संगठन का नाम: Bharat Coking Coal Limited";
        assert_eq!(
            extract_organization(text).text(Field::OrganizationName),
            Some("Bharat Coking Coal Limited")
        );
    }

    #[test]
    fn test_company_suffix_fallback() {
        let text = "Tender notice\nMahanadi Coalfields Limited invites bids";
        assert_eq!(ORGANIZATION_NAME.evaluate(text).unwrap().value, "Mahanadi Coalfields Limited");
    }

    #[test]
    fn test_ministry_and_department() {
        let text = "Ministry/State Name: Ministry of Coal\nDepartment Name: Department of Coal";
        let fields = extract_organization(text);
        assert_eq!(fields.text(Field::MinistryName), Some("Ministry of Coal"));
        assert_eq!(fields.text(Field::DepartmentName), Some("Department of Coal"));
    }

    #[test]
    fn test_address_stops_at_contact() {
        let text = "Office Address: Darbhanga House, Ranchi Phone: 0651-2360123";
        assert_eq!(
            extract_organization(text).text(Field::OfficeAddress),
            Some("Darbhanga House, Ranchi")
        );
    }

    #[test]
    fn test_invalid_pincode_rejected() {
        assert!(PINCODE.evaluate("Pin: 012345").is_none());
    }
}
