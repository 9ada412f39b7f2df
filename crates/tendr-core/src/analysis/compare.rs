//! Cross-bid similarity and red-flag detection.
//!
//! Each document is reduced to surface features once; every unordered pair
//! is then compared feature by feature. Findings always name the vendors
//! and the values involved.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, info};

use super::compliance::{missing_clauses, present_clauses};
use crate::models::comparison::{ComparisonFinding, ComparisonResult, FindingKind, VendorDocument};
use crate::models::config::ComparisonConfig;
use crate::models::tender::AnalysisSource;
use crate::rules::amounts::{PriceToken, find_price_tokens};
use crate::rules::dates::collect_dates;
use crate::rules::patterns::{EMAIL, PHONE, STANDARD_CODE};
use crate::rules::vocabulary::Vocabulary;

const BASE_VENDOR_SCORE: i32 = 40;
const CLAUSE_POINTS: i32 = 10;
const RED_FLAG_PENALTY: i32 = 10;
const MAX_VENDOR_SCORE: i32 = 90;
const SHARED_STANDARDS_THRESHOLD: usize = 3;

lazy_static! {
    static ref ADDRESS: Regex = Regex::new(
        r"(?i)\baddress\s*(?:for\s+communication)?\s*[:\-]\s*([^\n]{10,120})"
    ).unwrap();

    static ref VENDOR_REFERENCE: Regex = Regex::new(
        r"(?i:\b(sub-?contractors?|consultants?|vendors?)\b)\s*(?i:name)?\s*[:\-]\s*([A-Z][A-Za-z&.' ]{2,80})"
    ).unwrap();
}

/// Surface features of one document.
#[derive(Debug, Clone)]
struct Features {
    label: String,
    prices: Vec<PriceToken>,
    emails: BTreeSet<String>,
    phones: BTreeSet<String>,
    addresses: BTreeSet<String>,
    dates: BTreeSet<String>,
    vendor_references: BTreeSet<String>,
    standards: BTreeSet<String>,
    typos: BTreeSet<String>,
    words: HashSet<String>,
    missing_clauses: Vec<&'static str>,
}

impl Features {
    fn extract(document: &VendorDocument, config: &ComparisonConfig, vocabulary: &Vocabulary) -> Self {
        let text = document.text.as_str();

        Self {
            label: document.label.clone(),
            prices: find_price_tokens(text),
            emails: EMAIL.find_iter(text).map(|m| m.as_str().to_string()).collect(),
            phones: PHONE.find_iter(text).map(|m| m.as_str().to_string()).collect(),
            addresses: ADDRESS
                .captures_iter(text)
                .map(|c| c[1].trim().to_lowercase())
                .collect(),
            dates: collect_dates(text).into_iter().map(|d| d.normalized).collect(),
            vendor_references: VENDOR_REFERENCE
                .captures_iter(text)
                .map(|c| format!("{} {}", reference_kind(&c[1]), c[2].trim()))
                .collect(),
            standards: STANDARD_CODE
                .captures_iter(text)
                .map(|c| format!("{} {}", &c[1], &c[2]))
                .collect(),
            typos: vocabulary.typos_in(text).into_iter().map(str::to_string).collect(),
            words: words(text, config.min_word_length),
            missing_clauses: missing_clauses(text),
        }
    }
}

fn reference_kind(label: &str) -> &'static str {
    let lower = label.to_lowercase();
    if lower.starts_with("sub") {
        "subcontractor"
    } else if lower.starts_with("consultant") {
        "consultant"
    } else {
        "vendor"
    }
}

/// Lowercased words of at least `min_len` characters.
fn words(text: &str, min_len: usize) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= min_len)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Jaccard similarity of two word sets, as a percentage.
pub fn jaccard_percent(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64 * 100.0
}

/// Findings accumulated without duplicates.
#[derive(Debug, Default)]
struct Findings {
    items: Vec<ComparisonFinding>,
}

impl Findings {
    fn push(&mut self, finding: ComparisonFinding) {
        if !self.items.iter().any(|f| f.kind == finding.kind && f.description == finding.description) {
            debug!("{}", finding.render());
            self.items.push(finding);
        }
    }

    fn rendered(&self, kind: FindingKind) -> Vec<String> {
        self.items
            .iter()
            .filter(|f| f.kind == kind)
            .map(ComparisonFinding::render)
            .collect()
    }

    fn red_flags_naming(&self, label: &str) -> usize {
        self.items
            .iter()
            .filter(|f| f.kind == FindingKind::RedFlag && f.vendors.iter().any(|v| v == label))
            .count()
    }
}

/// Compare bids pairwise and across the whole set.
pub fn compare_documents(
    documents: &[VendorDocument],
    config: &ComparisonConfig,
    vocabulary: &Vocabulary,
) -> ComparisonResult {
    info!("Comparing {} documents", documents.len());

    let features: Vec<Features> = documents
        .iter()
        .map(|d| Features::extract(d, config, vocabulary))
        .collect();

    let mut findings = Findings::default();
    for (i, a) in features.iter().enumerate() {
        for b in &features[i + 1..] {
            compare_pair(a, b, config, &mut findings);
        }
    }
    check_systemic_omissions(&features, &mut findings);

    let mut vendor_scores = BTreeMap::new();
    for document in documents {
        let present = present_clauses(&document.text).len() as i32;
        let flags = findings.red_flags_naming(&document.label) as i32;
        let score = (BASE_VENDOR_SCORE + CLAUSE_POINTS * present - RED_FLAG_PENALTY * flags)
            .clamp(0, MAX_VENDOR_SCORE);
        vendor_scores.insert(document.label.clone(), score as u8);
    }

    let red_flags = findings.rendered(FindingKind::RedFlag);
    let recommendation = recommend(documents, &vendor_scores, red_flags.len());

    info!(
        "Comparison finished: {} similarities, {} red flags",
        findings.rendered(FindingKind::Similarity).len(),
        red_flags.len()
    );

    ComparisonResult {
        vendor_scores,
        similarities: findings.rendered(FindingKind::Similarity),
        red_flags,
        recommendation,
        source: AnalysisSource::Fallback,
    }
}

fn compare_pair(a: &Features, b: &Features, config: &ComparisonConfig, findings: &mut Findings) {
    let pair = || vec![a.label.clone(), b.label.clone()];

    let tolerance = Decimal::from_f64(config.price_tolerance_percent).unwrap_or(Decimal::ONE);
    for pa in &a.prices {
        for pb in &b.prices {
            let largest = pa.value.max(pb.value);
            let difference = (pa.value - pb.value).abs();
            if difference * Decimal::ONE_HUNDRED < tolerance * largest {
                findings.push(ComparisonFinding::red_flag(
                    format!(
                        "Possible price collusion: {} quotes {} and {} quotes {} (within {}%)",
                        a.label, pa.raw, b.label, pb.raw, config.price_tolerance_percent
                    ),
                    pair(),
                ));
            }
        }
    }

    for email in a.emails.intersection(&b.emails) {
        findings.push(ComparisonFinding::red_flag(
            format!("{} and {} list the same email address {}", a.label, b.label, email),
            pair(),
        ));
    }
    for phone in a.phones.intersection(&b.phones) {
        findings.push(ComparisonFinding::red_flag(
            format!("{} and {} list the same phone number {}", a.label, b.label, phone),
            pair(),
        ));
    }
    for address in a.addresses.intersection(&b.addresses) {
        findings.push(ComparisonFinding::red_flag(
            format!("{} and {} give the same address \"{}\"", a.label, b.label, address),
            pair(),
        ));
    }

    let typos: Vec<&str> = a.typos.intersection(&b.typos).map(String::as_str).collect();
    if !typos.is_empty() {
        findings.push(ComparisonFinding::red_flag(
            format!(
                "{} and {} share the same misspellings: {}",
                a.label,
                b.label,
                typos.join(", ")
            ),
            pair(),
        ));
    }

    for reference in a.vendor_references.intersection(&b.vendor_references) {
        findings.push(ComparisonFinding::similarity(
            format!("{} and {} both name {}", a.label, b.label, reference),
            pair(),
        ));
    }

    let similarity = jaccard_percent(&a.words, &b.words);
    if similarity > config.similarity_red_flag_percent {
        findings.push(ComparisonFinding::red_flag(
            format!(
                "{} and {} are {:.1}% identical in wording",
                a.label, b.label, similarity
            ),
            pair(),
        ));
    } else if similarity >= config.similarity_note_percent {
        findings.push(ComparisonFinding::similarity(
            format!(
                "{} and {} share {:.1}% of their wording",
                a.label, b.label, similarity
            ),
            pair(),
        ));
    }

    let dates: Vec<&str> = a.dates.intersection(&b.dates).map(String::as_str).collect();
    if dates.len() > config.shared_dates_threshold {
        findings.push(ComparisonFinding::similarity(
            format!(
                "{} and {} share {} identical dates ({}), suggesting a common planning source",
                a.label,
                b.label,
                dates.len(),
                dates.join(", ")
            ),
            pair(),
        ));
    }

    let standards: Vec<&str> = a.standards.intersection(&b.standards).map(String::as_str).collect();
    if standards.len() >= SHARED_STANDARDS_THRESHOLD {
        findings.push(ComparisonFinding::similarity(
            format!(
                "{} and {} cite the same standards: {}",
                a.label,
                b.label,
                standards.join(", ")
            ),
            pair(),
        ));
    }
}

/// One finding when every document misses the same mandatory clauses.
fn check_systemic_omissions(features: &[Features], findings: &mut Findings) {
    let [first, rest @ ..] = features else {
        return;
    };
    if rest.is_empty() {
        return;
    }

    let common: Vec<&str> = first
        .missing_clauses
        .iter()
        .filter(|clause| rest.iter().all(|f| f.missing_clauses.contains(*clause)))
        .copied()
        .collect();

    if !common.is_empty() {
        findings.push(ComparisonFinding::red_flag(
            format!(
                "All {} bids omit the same mandatory clauses: {}",
                features.len(),
                common.join(", ")
            ),
            features.iter().map(|f| f.label.clone()).collect(),
        ));
    }
}

fn recommend(documents: &[VendorDocument], scores: &BTreeMap<String, u8>, red_flags: usize) -> String {
    let best = documents
        .iter()
        .filter_map(|d| scores.get(&d.label).map(|score| (d.label.as_str(), *score)))
        .fold(None, |best: Option<(&str, u8)>, (label, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((label, score)),
        });

    match best {
        None => "No documents to compare".to_string(),
        Some((label, score)) if red_flags == 0 => format!(
            "{} has the strongest bid (score {}); no collusion indicators were found",
            label, score
        ),
        Some((label, score)) => format!(
            "{} scores highest ({}), but {} red flag(s) require manual review before award",
            label, score, red_flags
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compare(documents: &[VendorDocument]) -> ComparisonResult {
        compare_documents(documents, &ComparisonConfig::default(), &Vocabulary::default())
    }

    #[test]
    fn test_identical_price_is_red_flag() {
        let documents = vec![
            VendorDocument::new("Alpha Traders", "Quoted price Rs. 24,95,000 for roof bolts"),
            VendorDocument::new("Beta Mining", "Our offer stands at Rs. 24,95,000 inclusive of GST"),
        ];
        let result = compare(&documents);
        let flag = result
            .red_flags
            .iter()
            .find(|f| f.contains("price collusion"))
            .unwrap();
        assert!(flag.contains("Alpha Traders"));
        assert!(flag.contains("Beta Mining"));
        assert!(flag.starts_with("🚩"));
    }

    #[test]
    fn test_prices_outside_tolerance_pass() {
        let documents = vec![
            VendorDocument::new("A", "Bid amount Rs. 10,00,000"),
            VendorDocument::new("B", "Bid amount Rs. 12,00,000"),
        ];
        assert!(!compare(&documents).red_flags.iter().any(|f| f.contains("price collusion")));
    }

    #[test]
    fn test_shared_email_and_typo() {
        let documents = vec![
            VendorDocument::new("A", "Contact sales@acme-infra.in for the reciept of goods"),
            VendorDocument::new("B", "Write to sales@acme-infra.in; reciept issued on request"),
        ];
        let result = compare(&documents);
        assert!(result.red_flags.iter().any(|f| f.contains("same email address sales@acme-infra.in")));
        assert!(result.red_flags.iter().any(|f| f.contains("misspellings: reciept")));
    }

    #[test]
    fn test_email_must_match_exactly() {
        let documents = vec![
            VendorDocument::new("A", "Contact sales@acme-infra.in"),
            VendorDocument::new("B", "Contact SALES@ACME-INFRA.IN"),
        ];
        assert!(!compare(&documents).red_flags.iter().any(|f| f.contains("email")));
    }

    #[test]
    fn test_shared_phone_and_address() {
        let documents = vec![
            VendorDocument::new(
                "Alpha",
                "Address: Plot 14, Industrial Area, Ranchi\nMob: 9876543210",
            ),
            VendorDocument::new(
                "Beta",
                "Registered Address - Plot 14, Industrial Area, Ranchi\nCall 9876543210 for site visits",
            ),
        ];
        let result = compare(&documents);

        let phone = result
            .red_flags
            .iter()
            .find(|f| f.contains("same phone number 9876543210"))
            .unwrap();
        assert!(phone.contains("Alpha") && phone.contains("Beta"));
        assert!(result
            .red_flags
            .iter()
            .any(|f| f.contains("same address \"plot 14, industrial area, ranchi\"")));
    }

    #[test]
    fn test_different_phones_pass() {
        let documents = vec![
            VendorDocument::new("A", "Mob: 9876543210"),
            VendorDocument::new("B", "Mob: 9876543211"),
        ];
        assert!(!compare(&documents).red_flags.iter().any(|f| f.contains("phone")));
    }

    #[test]
    fn test_jaccard_percent() {
        let a = words("roof bolts supply contract", 4);
        let b = words("roof bolts supply tender", 4);
        assert!((jaccard_percent(&a, &b) - 60.0).abs() < 1e-9);
        assert_eq!(jaccard_percent(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_word_similarity_levels() {
        let documents = vec![
            VendorDocument::new("A", "roof bolts supply contract"),
            VendorDocument::new("B", "roof bolts supply tender"),
        ];
        let result = compare(&documents);
        assert!(result.similarities.iter().any(|s| s.contains("60.0% of their wording")));

        let documents = vec![
            VendorDocument::new("A", "roof bolts supply contract"),
            VendorDocument::new("B", "roof bolts supply contract"),
        ];
        let result = compare(&documents);
        assert!(result.red_flags.iter().any(|f| f.contains("100.0% identical")));
    }

    #[test]
    fn test_shared_vendor_reference_is_similarity() {
        let documents = vec![
            VendorDocument::new("A", "Subcontractor: Ranchi Steel Works"),
            VendorDocument::new("B", "Sub-contractor - Ranchi Steel Works"),
        ];
        let result = compare(&documents);
        assert!(result
            .similarities
            .iter()
            .any(|s| s.contains("both name subcontractor Ranchi Steel Works")));
    }

    #[test]
    fn test_shared_dates_note() {
        let text = "Dates 01.04.2025, 15.04.2025 and 30.04.2025";
        let documents = vec![VendorDocument::new("A", text), VendorDocument::new("B", text)];
        let result = compare(&documents);
        assert!(result.similarities.iter().any(|s| s.contains("3 identical dates")));
    }

    #[test]
    fn test_systemic_omission() {
        let documents = vec![
            VendorDocument::new("A", "EMD paid. Payment terms 30 days."),
            VendorDocument::new("B", "EMD exempted under MSE policy."),
        ];
        let result = compare(&documents);
        let flag = result
            .red_flags
            .iter()
            .find(|f| f.starts_with("🚩 All 2 bids omit"))
            .unwrap();
        assert!(flag.contains("Performance Guarantee"));
        assert!(flag.contains("Termination Clause"));
        assert!(!flag.contains("EMD"));
    }

    #[test]
    fn test_vendor_scores_and_recommendation() {
        let documents = vec![
            VendorDocument::new(
                "Alpha",
                "Performance Guarantee 5%. Payment Terms net 30. EMD submitted. Liquidated Damages apply. Termination on default.",
            ),
            VendorDocument::new("Beta", "EMD submitted with cover letter"),
        ];
        let result = compare(&documents);
        assert_eq!(result.vendor_scores.get("Alpha"), Some(&90));
        assert_eq!(result.vendor_scores.get("Beta"), Some(&50));
        assert!(result.recommendation.starts_with("Alpha"));
    }

    #[test]
    fn test_single_document_has_no_findings() {
        let result = compare(&[VendorDocument::new("Solo", "EMD submitted")]);
        assert!(result.red_flags.is_empty());
        assert!(result.similarities.is_empty());
        assert_eq!(result.vendor_scores.len(), 1);
    }

    #[test]
    fn test_no_documents() {
        let result = compare(&[]);
        assert_eq!(result.recommendation, "No documents to compare");
    }
}
