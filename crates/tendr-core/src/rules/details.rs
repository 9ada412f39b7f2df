//! Descriptive tender fields: title, category, scope, eligibility,
//! contact, submission, evaluation and legal terms, policy flags,
//! certifications and attachments.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::evaluator::{FieldRule, Verdict};
use super::patterns::FILE_NAME;
use crate::models::config::ExtractionConfig;
use crate::models::tender::{Field, FieldExtraction, FieldValue};
use crate::text::is_binary_or_corrupted;

const MAX_CERTIFICATIONS: usize = 10;

const CONTACT_STOP_WORDS: &[&str] = &[
    "Phone", "Tel", "Telephone", "Email", "E-mail", "Mobile", "Mob", "Address", "Fax",
];

lazy_static! {
    pub static ref TITLE: FieldRule = FieldRule::new(Field::Title, &[
        r"(?i)\btitle\s*(?:of\s+(?:the\s+)?(?:work|tender))?\s*[:\-]\s*([^\n]+)",
        r"(?i)\bname\s+of\s+(?:the\s+)?work\s*[:\-]?\s*([^\n]+)",
        r"(?i)\bwork\s+description\s*[:\-]\s*([^\n]+)",
        r"(?i)\bsubject\s*[:\-]\s*([^\n]+)",
    ])
    .stop_at(&["Tender ID", "Tender Reference", "Enquiry No", "Dated", "Tender Category", "Location", "Pincode"])
    .validate(validate_title);

    pub static ref CATEGORY: FieldRule = FieldRule::new(Field::Category, &[
        r"(?i)\btender\s+category\s*[:\-]\s*([^\n]+)",
        r"(?i)\b(?:item|product)\s+category\s*[:\-]\s*([^\n]+)",
        r"(?i)\bcategory\s*[:\-]\s*([^\n]+)",
    ])
    .stop_at(&["Tender Type", "Form of Contract", "Sub Category", "Dated", "Location", "No. of Covers"])
    .max_len(80)
    .validate(validate_text);

    pub static ref TENDER_TYPE: FieldRule = FieldRule::new(Field::TenderType, &[
        r"(?i)\btender\s+type\s*[:\-]\s*([^\n]+)",
        r"(?i)\btype\s+of\s+tender\s*[:\-]?\s*([^\n]+)",
        r"(?i)\b((?:open|limited|single|global)\s+tender)\b",
    ])
    .stop_at(&["Form of Contract", "Tender Category", "No. of Covers", "Dated"])
    .max_len(60)
    .validate(validate_text);

    pub static ref SCOPE_OF_WORK: FieldRule = FieldRule::new(Field::ScopeOfWork, &[
        r"(?i)\bscope\s+of\s+(?:the\s+)?work\s*[:\-]?\s*([^\n]+)",
        r"(?i)\bbrief\s+description\s*(?:of\s+(?:the\s+)?work)?\s*[:\-]\s*([^\n]+)",
    ])
    .max_len(300)
    .validate(validate_long_text);

    pub static ref TECHNICAL_SPECIFICATIONS: FieldRule = FieldRule::new(Field::TechnicalSpecifications, &[
        r"(?i)\btechnical\s+specifications?\s*[:\-]\s*([^\n]+)",
        r"(?i)\bspecifications?\s*[:\-]\s*([^\n]+)",
    ])
    .max_len(300)
    .validate(validate_long_text);

    pub static ref ELIGIBILITY_CRITERIA: FieldRule = FieldRule::new(Field::EligibilityCriteria, &[
        r"(?i)\beligibility\s+criteria\s*[:\-]?\s*([^\n]+)",
        r"(?i)\bqualifying\s+(?:criteria|requirements?)\s*[:\-]?\s*([^\n]+)",
        r"(?i)\bpre-?qualification\s+criteria\s*[:\-]?\s*([^\n]+)",
    ])
    .max_len(300)
    .validate(validate_long_text);

    pub static ref EXPERIENCE_REQUIRED: FieldRule = FieldRule::new(Field::ExperienceRequired, &[
        r"(?i)\b(?:similar\s+work\s+)?experience\s*(?:required|criteria)?\s*[:\-]\s*([^\n]+)",
        r"(?i)\b(\d+\s*(?:years?|yrs?)\s+(?:of\s+)?(?:relevant\s+|similar\s+)?experience[^\n]{0,120})",
    ])
    .validate(validate_text);

    pub static ref CONTACT_PERSON: FieldRule = FieldRule::new(Field::ContactPerson, &[
        r"(?i)\bcontact\s+person\s*[:\-]\s*([^\n]+)",
        r"(?i)\b(?:tender\s+)?inviting\s+(?:authority|officer)\s*[:\-]\s*([^\n]+)",
        r"(?i)\bofficer\s+in\s+charge\s*[:\-]\s*([^\n]+)",
    ])
    .stop_at(CONTACT_STOP_WORDS)
    .max_len(100)
    .validate(validate_text);

    pub static ref CONTACT_EMAIL: FieldRule = FieldRule::new(Field::ContactEmail, &[
        r"(?i)\b(?:e-?mail|email\s+id)\s*(?:id)?\s*[:\-]?\s*([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})",
        r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})",
    ]);

    pub static ref CONTACT_PHONE: FieldRule = FieldRule::new(Field::ContactPhone, &[
        r"(?i)\b(?:phone|tel|telephone|mobile|mob|contact\s+no)\.?\s*(?:no\.?)?\s*[:\-]?\s*((?:\+91[\s\-]?)?(?:[6-9]\d{9}|0\d{2,4}[\s\-]\d{6,8}))\b",
        r"((?:\+91[\s\-]?)?\b(?:[6-9]\d{9}|0\d{2,4}[\s\-]\d{6,8}))\b",
    ]);

    pub static ref SUBMISSION_MODE: FieldRule = FieldRule::new(Field::SubmissionMode, &[
        r"(?i)\b(?:mode\s+of\s+submission|(?:bid\s+)?submission\s+mode)\s*[:\-]?\s*([^\n]+)",
        r"(?i)\b(online|offline)\s+(?:bid\s+)?submission\b",
    ])
    .stop_at(&["Dated", "Bid Opening", "Tender"])
    .max_len(60)
    .validate(validate_text);

    pub static ref BID_SYSTEM: FieldRule = FieldRule::new(Field::BidSystem, &[
        r"(?i)\bbid\s+system\s*[:\-]\s*([^\n]+)",
        r"(?i)\b((?:single|two|three)[\s\-](?:bid|packet|cover|envelope)(?:\s+system)?)\b",
    ])
    .max_len(60)
    .validate(validate_text);

    pub static ref PORTAL_URL: FieldRule = FieldRule::new(Field::PortalUrl, &[
        r"(?i)\b(https?://[^\s<>()]*(?:eprocure|gem\.gov|etender|tender|nic\.in)[^\s<>()]*)",
        r"(?i)\b(https?://[^\s<>()]+)",
        r"(?i)\b(www\.[a-z0-9.\-]+\.[a-z]{2,}(?:/[^\s<>()]*)?)",
    ])
    .validate(validate_url);

    pub static ref EVALUATION_METHOD: FieldRule = FieldRule::new(Field::EvaluationMethod, &[
        r"(?i)\bevaluation\s+(?:method|criteria|methodology)\s*[:\-]?\s*([^\n]+)",
        r"(?i)\b(L1\s+(?:basis|criteria)|(?:least|lowest)\s+cost(?:\s+basis)?|QCBS|quality\s+(?:and|&)\s+cost\s+based\s+selection|item[\s\-]?wise|total\s+value\s+wise)\b",
    ])
    .max_len(100)
    .validate(validate_text);

    pub static ref LIQUIDATED_DAMAGES: FieldRule = FieldRule::new(Field::LiquidatedDamages, &[
        r"(?i)\bliquidated\s+damages?\s*(?:\(LD\))?\s*[:\-]?\s*([^\n]+)",
        r"(?i)\bLD\s+(?:clause|charges?)\s*[:\-]?\s*([^\n]+)",
    ])
    .validate(validate_text);

    pub static ref JURISDICTION: FieldRule = FieldRule::new(Field::Jurisdiction, &[
        r"(?i)\bjurisdiction\s*(?:of)?\s*[:\-]\s*([^\n]+)",
        r"(?i)\bsubject\s+to\s+([A-Za-z ]{3,40}?)\s+jurisdiction\b",
        r"(?i)\bcourts?\s+(?:of|at|in)\s+([A-Za-z ]{3,40}?)\s+(?:shall|will|only|alone)\b",
    ])
    .max_len(80)
    .validate(validate_text);

    pub static ref ARBITRATION: FieldRule = FieldRule::new(Field::Arbitration, &[
        r"(?i)\barbitration\s*(?:clause)?\s*[:\-]\s*([^\n]+)",
        r"(?i)\b(arbitration\s+and\s+conciliation\s+act[^\n]{0,40})",
        r"(?i)\b((?:sole\s+)?arbitrator\b[^\n]{0,80})",
    ])
    .validate(validate_text);

    pub static ref CONTRACT_PERIOD: FieldRule = FieldRule::new(Field::ContractPeriod, &[
        r"(?i)\b(?:contract\s+period|period\s+of\s+contract|completion\s+period|period\s+of\s+completion|time\s+of\s+completion|duration\s+of\s+(?:the\s+)?(?:contract|work))\s*[:\-]?\s*([^\n]+)",
        r"(?i)\b(?:to\s+be\s+)?completed\s+within\s+([^\n]+)",
    ])
    .validate(validate_duration);

    pub static ref BID_VALIDITY: FieldRule = FieldRule::new(Field::BidValidity, &[
        r"(?i)\bbid\s+(?:offer\s+)?validity(?:\s+period)?\s*(?:\([^)\n]*\))?\s*[:\-]?\s*([^\n]+)",
        r"(?i)\bvalidity\s+of\s+(?:bid|offer|tender)s?\s*[:\-]?\s*([^\n]+)",
        r"(?i)\b(?:bid|offer)s?\s+shall\s+(?:remain\s+)?valid\s+for\s+([^\n]+)",
    ])
    .validate(validate_duration);

    static ref DURATION: Regex = Regex::new(
        r"(?i)\b\d+\s*(?:\(\w+\)\s*)?\(?(?:days?|weeks?|months?|years?|yrs?)\b\)?"
    ).unwrap();

    static ref CERTIFICATION: Regex = Regex::new(
        r"(?i)\b(ISO\s*[:\-]?\s*\d{3,5}(?::\d{4})?|BIS(?:\s+certif\w*)?|(?-i:IS)\s*[:\-]?\s*\d{2,5}(?::\d{4})?|NABL|ISI\s+mark(?:ed)?|CE\s+mark(?:ed|ing)?|OHSAS\s*\d{5}|BEE\s+star\s+rat\w*)\b"
    ).unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Policy flag name, detector; group 1 is the rest of the line.
    static ref POLICY_FLAGS: Vec<(&'static str, Regex)> = vec![
        ("MSE Purchase Preference", Regex::new(
            r"(?i)\b(?:MSE\s+purchase\s+preference|purchase\s+preference\s+(?:to|for)\s+(?:MSEs?|micro))\b([^\n]{0,60})"
        ).unwrap()),
        ("MSE Exemption", Regex::new(
            r"(?i)\bMSE\s+(?:exemption|relaxation)\b([^\n]{0,60})"
        ).unwrap()),
        ("Startup Exemption", Regex::new(
            r"(?i)\bstart-?up\s+(?:exemption|relaxation)\b([^\n]{0,60})"
        ).unwrap()),
        ("Make in India", Regex::new(
            r"(?i)\b(?:make\s+in\s+india|MII)\b(?:\s+purchase\s+preference)?([^\n]{0,60})"
        ).unwrap()),
        ("Reverse Auction", Regex::new(
            r"(?i)\breverse\s+auction\b([^\n]{0,60})"
        ).unwrap()),
        ("Integrity Pact", Regex::new(
            r"(?i)\bintegrity\s+pact\b([^\n]{0,60})"
        ).unwrap()),
    ];

    /// "Reverse Auction: No" and similar negated flags.
    static ref NEGATED: Regex = Regex::new(
        r"(?i)^[^:\n]{0,40}:\s*(?:no|not\s+applicable|n/?a)\b"
    ).unwrap();
}

/// Extract the descriptive field groups with default caps.
pub fn extract_details(text: &str) -> FieldExtraction {
    extract_details_with(text, &ExtractionConfig::default())
}

pub fn extract_details_with(text: &str, config: &ExtractionConfig) -> FieldExtraction {
    let mut fields = FieldExtraction::new();

    for rule in [
        &*TITLE,
        &*CATEGORY,
        &*TENDER_TYPE,
        &*SCOPE_OF_WORK,
        &*TECHNICAL_SPECIFICATIONS,
        &*ELIGIBILITY_CRITERIA,
        &*EXPERIENCE_REQUIRED,
        &*CONTRACT_PERIOD,
        &*BID_VALIDITY,
        &*SUBMISSION_MODE,
        &*BID_SYSTEM,
        &*PORTAL_URL,
        &*EVALUATION_METHOD,
        &*LIQUIDATED_DAMAGES,
        &*JURISDICTION,
        &*ARBITRATION,
        &*CONTACT_PERSON,
        &*CONTACT_EMAIL,
        &*CONTACT_PHONE,
    ] {
        if let Some(found) = rule.evaluate(text) {
            debug!("{:?} = {:?}", rule.field, found.value);
            fields.insert_text(rule.field, found.value);
        }
    }

    fields.insert(Field::Certifications, FieldValue::List(certifications(text)));
    fields.insert(Field::PolicyFlags, FieldValue::List(policy_flags(text)));
    fields.insert(
        Field::DocumentAttachments,
        FieldValue::List(attachments(text, config.max_attachments)),
    );

    fields
}

/// Certification and standards references, deduplicated case-insensitively.
pub fn certifications(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in CERTIFICATION.captures_iter(text) {
        let value = WHITESPACE.replace_all(caps[1].trim(), " ").to_string();
        if !found.iter().any(|f| f.eq_ignore_ascii_case(&value)) {
            found.push(value);
        }
        if found.len() >= MAX_CERTIFICATIONS {
            break;
        }
    }
    found
}

/// Procurement policies that the document declares as applicable.
pub fn policy_flags(text: &str) -> Vec<String> {
    POLICY_FLAGS
        .iter()
        .filter(|(_, pattern)| {
            pattern.captures_iter(text).any(|caps| {
                let tail = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                !NEGATED.is_match(tail)
            })
        })
        .map(|(name, _)| name.to_string())
        .collect()
}

/// File names mentioned in the document, in order, capped.
pub fn attachments(text: &str, max: usize) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in FILE_NAME.captures_iter(text) {
        let name = caps[1].to_string();
        if is_binary_or_corrupted(&name) || found.contains(&name) {
            continue;
        }
        found.push(name);
        if found.len() >= max {
            break;
        }
    }
    found
}

fn validate_text(candidate: &str, _text: &str) -> Verdict {
    let letters = candidate.chars().filter(|c| c.is_alphabetic()).count();
    if letters < 3 {
        Verdict::Reject
    } else {
        Verdict::Accept(candidate.trim_end_matches([',', ';']).to_string())
    }
}

fn validate_title(candidate: &str, text: &str) -> Verdict {
    let letters = candidate.chars().filter(|c| c.is_alphabetic()).count();
    if letters < 5 {
        return Verdict::Reject;
    }
    validate_text(candidate, text)
}

fn validate_long_text(candidate: &str, text: &str) -> Verdict {
    let letters = candidate.chars().filter(|c| c.is_alphabetic()).count();
    if letters < 10 {
        return Verdict::Reject;
    }
    validate_text(candidate, text)
}

/// Keep only the duration itself, e.g. "6 (Six) Months".
fn validate_duration(candidate: &str, _text: &str) -> Verdict {
    match DURATION.find(candidate) {
        Some(m) => Verdict::Accept(m.as_str().to_string()),
        None => Verdict::Reject,
    }
}

fn validate_url(candidate: &str, _text: &str) -> Verdict {
    let url = candidate.trim_end_matches(['.', ',', ';']);
    if url.len() < 8 {
        Verdict::Reject
    } else {
        Verdict::Accept(url.to_string())
    }
}
