//! Monetary fields and price tokens.
//!
//! Field values keep the amount as printed, including Lakh/Crore
//! magnitude words. [`parse_inr_amount`] converts a token to a
//! [`Decimal`] for numeric comparison only.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::evaluator::{FieldRule, Verdict};
use super::patterns::{CURRENCY_AMOUNT, GROUPED_NUMBER};
use crate::models::tender::{Field, FieldExtraction};

/// Amount with optional currency prefix or suffix, Indian grouping, a
/// trailing "/-" and a magnitude word. The tail rejects date fragments.
const AMOUNT_VALUE: &str = r"((?:₹|\bRs\.?|\bINR)\s*\d[\d,]*(?:\.\d+)?(?:\s*/-)?(?:\s*(?:Lakhs?|Lacs?|Crores?|Cr\b\.?))?|\d[\d,]*(?:\.\d+)?(?:\s*/-)?(?:\s*(?:₹|Rs\b\.?|INR\b))?(?:\s*(?:Lakhs?|Lacs?|Crores?|Cr\b\.?))?)\.?(?:[^\d./]|$)";

const PERCENT_VALUE: &str = r"(\d+(?:\.\d+)?\s*%(?:\s*of\s+[A-Za-z ]{3,40})?)";

const APPROXIMATE_VALUE_LABELS: &[&str] = &[
    r"approximate\s+value",
    r"approx\.?\s+value",
    r"estimated\s+(?:cost|value)",
    r"estimated\s+bid\s+value",
    r"value\s+of\s+(?:the\s+)?(?:work|tender|contract)",
    r"tender\s+value",
    r"put\s+to\s+tender\s+(?:value|cost)",
];

const EMD_LABELS: &[&str] = &[
    r"EMD\s*amount",
    r"earnest\s+money\s+deposit",
    r"earnest\s+money",
    r"EMD",
];

const TENDER_FEE_LABELS: &[&str] = &[
    r"tender\s+(?:fee|document\s+fee)",
    r"cost\s+of\s+(?:the\s+)?(?:tender\s+)?document",
    r"tender\s+cost",
];

const PERFORMANCE_SECURITY_LABELS: &[&str] = &[
    r"performance\s+security",
    r"performance\s+(?:bank\s+)?guarantee",
    r"PBG",
];

const TURNOVER_LABELS: &[&str] = &[
    r"minimum\s+(?:average\s+)?(?:annual\s+)?turnover",
    r"average\s+annual\s+turnover",
    r"annual\s+turnover",
];

lazy_static! {
    pub static ref APPROXIMATE_VALUE: FieldRule = amount_rule(Field::ApproximateValue, APPROXIMATE_VALUE_LABELS);
    pub static ref EMD_AMOUNT: FieldRule = amount_rule(Field::EmdAmount, EMD_LABELS);
    pub static ref TENDER_FEE: FieldRule = amount_rule(Field::TenderFee, TENDER_FEE_LABELS);
    pub static ref MINIMUM_TURNOVER: FieldRule = amount_rule(Field::MinimumTurnover, TURNOVER_LABELS);

    pub static ref PERFORMANCE_SECURITY: FieldRule = {
        let patterns: Vec<String> = PERFORMANCE_SECURITY_LABELS
            .iter()
            .map(|label| labeled(label, PERCENT_VALUE))
            .chain(PERFORMANCE_SECURITY_LABELS.iter().map(|label| labeled(label, AMOUNT_VALUE)))
            .collect();
        let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
        FieldRule::new(Field::PerformanceSecurity, &patterns)
            .max_len(60)
            .validate(validate_security)
    };

    static ref MAGNITUDE: Regex = Regex::new(r"(?i)\b(lakhs?|lacs?|crores?|cr)\b").unwrap();
    static ref MAGNITUDE_AFTER: Regex = Regex::new(r"(?i)^\s*(?:lakhs?|lacs?|crores?|cr)\b").unwrap();
    static ref NUMBER: Regex = Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap();
    static ref YEAR: Regex = Regex::new(r"^(?:19|20)\d{2}$").unwrap();
}

fn labeled(label: &str, value: &str) -> String {
    format!(r"(?i)\b(?:{})\b[^\n\d₹]{{0,40}}?{}", label, value)
}

fn amount_rule(field: Field, labels: &[&str]) -> FieldRule {
    let patterns: Vec<String> = labels.iter().map(|label| labeled(label, AMOUNT_VALUE)).collect();
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
    FieldRule::new(field, &patterns).max_len(60).validate(validate_amount)
}

/// A monetary token found anywhere in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceToken {
    /// Token as printed.
    pub raw: String,
    /// Value in rupees.
    pub value: Decimal,
}

/// Extract the financial field group.
pub fn extract_financials(text: &str) -> FieldExtraction {
    let mut fields = FieldExtraction::new();

    for rule in [
        &*APPROXIMATE_VALUE,
        &*EMD_AMOUNT,
        &*TENDER_FEE,
        &*PERFORMANCE_SECURITY,
        &*MINIMUM_TURNOVER,
    ] {
        if let Some(found) = rule.evaluate(text) {
            debug!("{:?} = {:?}", rule.field, found.value);
            fields.insert_text(rule.field, found.value);
        }
    }

    if CURRENCY_AMOUNT.is_match(text) {
        fields.insert_text(Field::Currency, "INR");
    }

    fields
}

/// Every currency-marked or digit-grouped amount in `text`, first
/// occurrence of each value kept.
pub fn find_price_tokens(text: &str) -> Vec<PriceToken> {
    let mut tokens: Vec<PriceToken> = Vec::new();

    for caps in CURRENCY_AMOUNT.captures_iter(text).chain(GROUPED_NUMBER.captures_iter(text)) {
        let Some(number) = caps.get(1) else {
            continue;
        };
        if continues_digit_run(&text[number.end()..]) {
            continue;
        }
        let mut raw = number.as_str().trim_end_matches(',').to_string();
        if let Some(magnitude) = MAGNITUDE_AFTER.find(&text[number.end()..]) {
            raw.push(' ');
            raw.push_str(magnitude.as_str().trim());
        }

        let Some(value) = parse_inr_amount(&raw) else {
            continue;
        };
        if value <= Decimal::ZERO || tokens.iter().any(|t| t.value == value) {
            continue;
        }
        tokens.push(PriceToken { raw, value });
    }

    tokens
}

/// Parse an Indian-format amount ("Rs. 24,95,000/-", "1.5 Crore") into
/// rupees.
pub fn parse_inr_amount(raw: &str) -> Option<Decimal> {
    let number = NUMBER.find(raw)?;
    let digits = number.as_str().replace(',', "");
    let mut value = Decimal::from_str(digits.trim_end_matches('.')).ok()?;

    if let Some(caps) = MAGNITUDE.captures(&raw[number.end()..]) {
        let word = caps[1].to_lowercase();
        let multiplier = if word.starts_with('l') { 100_000 } else { 10_000_000 };
        value *= Decimal::from(multiplier);
    }

    Some(value)
}

/// Whether the text right after a number keeps going as digits, as in
/// the "2025" tail of "12,05,2025".
pub(crate) fn continues_digit_run(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(',') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn validate_amount(candidate: &str, _text: &str) -> Verdict {
    let value = candidate.trim_end_matches('/').trim();
    let lower = value.to_lowercase();

    let has_currency = value.contains('₹') || lower.contains("rs") || lower.contains("inr");
    let has_magnitude = MAGNITUDE.is_match(value);
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();

    if has_currency || has_magnitude {
        return Verdict::Accept(value.to_string());
    }
    if digits < 3 || YEAR.is_match(value) {
        return Verdict::Reject;
    }
    Verdict::Accept(value.to_string())
}

fn validate_security(candidate: &str, text: &str) -> Verdict {
    if candidate.contains('%') {
        Verdict::Accept(candidate.to_string())
    } else {
        validate_amount(candidate, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTICE: &str = "Approximate Value of Work: Rs. 24,95,000/-\n\
        EMD Amount: Rs. 49,900/-\n\
        Tender Fee: Rs. 1,000\n\
        Performance Security: 5% of contract value\n\
        Minimum Average Annual Turnover: Rs. 15 Lakhs\n";

    #[test]
    fn test_extract_financials() {
        let fields = extract_financials(NOTICE);
        assert_eq!(fields.text(Field::ApproximateValue), Some("Rs. 24,95,000"));
        assert_eq!(fields.text(Field::EmdAmount), Some("Rs. 49,900"));
        assert_eq!(fields.text(Field::TenderFee), Some("Rs. 1,000"));
        assert_eq!(fields.text(Field::PerformanceSecurity), Some("5% of contract value"));
        assert_eq!(fields.text(Field::MinimumTurnover), Some("Rs. 15 Lakhs"));
        assert_eq!(fields.text(Field::Currency), Some("INR"));
    }

    #[test]
    fn test_magnitude_kept_verbatim() {
        let fields = extract_financials("Estimated Cost: 24.95 Lakhs");
        assert_eq!(fields.text(Field::ApproximateValue), Some("24.95 Lakhs"));
        assert_eq!(fields.text(Field::Currency), None);
    }

    #[test]
    fn test_date_is_not_an_amount() {
        let fields = extract_financials("EMD Date 12.05.2025");
        assert_eq!(fields.text(Field::EmdAmount), None);
    }

    #[test]
    fn test_parse_inr_amount() {
        assert_eq!(parse_inr_amount("Rs. 24,95,000/-"), Some(Decimal::from(2_495_000)));
        assert_eq!(parse_inr_amount("₹ 1.5 Crore"), Some(Decimal::from(15_000_000)));
        assert_eq!(parse_inr_amount("24.95 Lakhs"), Some(Decimal::from(2_495_000)));
        assert_eq!(parse_inr_amount("no digits"), None);
    }

    #[test]
    fn test_find_price_tokens() {
        let tokens = find_price_tokens("Quoted Rs. 24,95,000/- and 24,95,000 again, EMD ₹49,900");
        let values: Vec<Decimal> = tokens.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![Decimal::from(2_495_000), Decimal::from(49_900)]);
    }

    #[test]
    fn test_date_with_commas_is_not_a_price() {
        assert!(find_price_tokens("Revised schedule 12,05,2025 for opening").is_empty());
        let tokens = find_price_tokens("Offer 12,05,000 on 12,05,2025");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].raw, "12,05,000");
    }

    #[test]
    fn test_currency_suffix() {
        let fields = extract_financials("Approximate Value of Work: 24,95,000/- INR\n");
        assert_eq!(fields.text(Field::ApproximateValue), Some("24,95,000/- INR"));

        let tokens = find_price_tokens("Quoted 24,95,000/- INR only");
        assert_eq!(tokens[0].value, Decimal::from(2_495_000));
    }

    #[test]
    fn test_price_token_magnitude() {
        let tokens = find_price_tokens("Bid price Rs. 2.5 Crore only");
        assert_eq!(tokens[0].raw, "2.5 Crore");
        assert_eq!(tokens[0].value, Decimal::from(25_000_000));
    }
}
