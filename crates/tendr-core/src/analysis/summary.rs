//! Compliance score, key points and summary for a fallback extraction.

use crate::models::config::ExtractionConfig;
use crate::models::tender::{AnalysisSource, ExtractionResult, Field, FieldExtraction, FieldValue};
use crate::text::meaningful_char_count;

/// Key point of the result returned for empty input.
pub const EXTRACTION_FAILED: &str = "Document extraction failed";

/// Highest score the pattern-based path can award.
pub const FALLBACK_SCORE_CAP: u8 = 90;

const BASE_SCORE: u32 = 20;
const WORK_ITEM_POINTS: u32 = 2;
const WORK_ITEM_CAP: u32 = 20;
const KEY_POINT_TEXT_LEN: usize = 150;

/// Fixed points per field present.
const FIELD_POINTS: &[(Field, u32)] = &[
    (Field::EnquiryNumber, 20),
    (Field::TenderId, 15),
    (Field::ApproximateValue, 20),
    (Field::OrganizationName, 15),
    (Field::Title, 5),
];

const IDENTIFIER_FIELDS: &[Field] = &[
    Field::EnquiryNumber,
    Field::TenderId,
    Field::TenderReferenceNumber,
    Field::NitNumber,
    Field::BidNumber,
];

const ORGANIZATION_FIELDS: &[Field] = &[
    Field::OrganizationName,
    Field::DepartmentName,
    Field::MinistryName,
    Field::Location,
];

const FINANCIAL_FIELDS: &[Field] = &[
    Field::ApproximateValue,
    Field::EmdAmount,
    Field::TenderFee,
    Field::PerformanceSecurity,
    Field::MinimumTurnover,
];

/// Result for text too short to analyze.
pub fn empty_result() -> ExtractionResult {
    ExtractionResult {
        summary: "Cannot analyze empty document".to_string(),
        key_points: vec![EXTRACTION_FAILED.to_string()],
        extracted_data: FieldExtraction::new(),
        compliance_score: 0,
        missing_clauses: Vec::new(),
        risk_factors: Vec::new(),
        source: AnalysisSource::Fallback,
    }
}

/// Score an extraction: base 20 plus fixed points per field, capped at 90.
pub fn compliance_score(fields: &FieldExtraction) -> u8 {
    let mut score = BASE_SCORE;

    for (field, points) in FIELD_POINTS {
        if fields.contains(*field) {
            score += points;
        }
    }

    let items = fields.work_items().len() as u32;
    score += (items * WORK_ITEM_POINTS).min(WORK_ITEM_CAP);

    if fields.dates().is_some_and(|d| !d.all_dates.is_empty()) {
        score += 5;
    }

    score.min(FALLBACK_SCORE_CAP as u32) as u8
}

/// Key points in fixed priority order, one per extracted fact.
pub fn key_points(fields: &FieldExtraction) -> Vec<String> {
    let mut points = Vec::new();

    for field in IDENTIFIER_FIELDS.iter().chain(ORGANIZATION_FIELDS) {
        push_text(&mut points, fields, *field);
    }
    push_text(&mut points, fields, Field::Title);

    if let Some(schedule) = fields.dates() {
        for (role, date) in schedule.assigned() {
            points.push(format!("{}: {}", role.label(), date));
        }
    }
    push_text(&mut points, fields, Field::ContractPeriod);
    push_text(&mut points, fields, Field::BidValidity);

    for field in FINANCIAL_FIELDS {
        push_text(&mut points, fields, *field);
    }

    push_text(&mut points, fields, Field::Category);
    push_text(&mut points, fields, Field::TenderType);

    let items = fields.work_items();
    if !items.is_empty() {
        points.push(format!("{}: {} items identified", Field::WorkItems, items.len()));
    }

    push_text(&mut points, fields, Field::ScopeOfWork);
    push_text(&mut points, fields, Field::TechnicalSpecifications);
    push_text(&mut points, fields, Field::EligibilityCriteria);
    push_text(&mut points, fields, Field::ExperienceRequired);
    push_list(&mut points, fields, Field::Certifications);
    push_list(&mut points, fields, Field::PolicyFlags);

    if let Some(files) = fields.list(Field::DocumentAttachments) {
        points.push(format!("{}: {} documents", Field::DocumentAttachments, files.len()));
    }

    if let Some(FieldValue::Number(count)) = fields.get(Field::DateCount) {
        points.push(format!("{}: {}", Field::DateCount, count));
    }

    points
}

/// One-sentence description of the extraction.
pub fn summary(fields: &FieldExtraction) -> String {
    let subject = fields
        .text(Field::Title)
        .map(|t| shorten(t, 100))
        .unwrap_or_else(|| "Tender document".to_string());

    let mut summary = match fields.text(Field::OrganizationName) {
        Some(org) => format!("{} issued by {}", subject, org),
        None => subject,
    };

    if let Some(reference) = IDENTIFIER_FIELDS.iter().find_map(|f| fields.text(*f)) {
        summary.push_str(&format!(" (ref. {})", reference));
    }
    if let Some(value) = fields.text(Field::ApproximateValue) {
        summary.push_str(&format!(", approximate value {}", value));
    }

    summary.push_str(&format!(". {} fields extracted by pattern matching.", fields.len()));
    summary
}

/// Assemble the fallback result for an extraction.
///
/// An extraction with no fields still yields a usable result that tells
/// readable text apart from a likely scan.
pub fn summarize(fields: FieldExtraction, text: &str, config: &ExtractionConfig) -> ExtractionResult {
    let compliance_score = compliance_score(&fields);

    if fields.is_empty() {
        let characters = meaningful_char_count(text);
        let note = if characters > config.scanned_text_threshold {
            format!("Document contains {} characters of text but no recognizable tender fields", characters)
        } else {
            "Little text could be extracted; the document looks like a scanned or image-only PDF".to_string()
        };
        return ExtractionResult {
            summary: "Document uploaded; no tender fields could be extracted automatically".to_string(),
            key_points: vec!["Document uploaded".to_string(), note],
            extracted_data: fields,
            compliance_score,
            missing_clauses: Vec::new(),
            risk_factors: Vec::new(),
            source: AnalysisSource::Fallback,
        };
    }

    ExtractionResult {
        summary: summary(&fields),
        key_points: key_points(&fields),
        extracted_data: fields,
        compliance_score,
        missing_clauses: Vec::new(),
        risk_factors: Vec::new(),
        source: AnalysisSource::Fallback,
    }
}

fn push_text(points: &mut Vec<String>, fields: &FieldExtraction, field: Field) {
    if let Some(value) = fields.text(field) {
        points.push(format!("{}: {}", field, shorten(value, KEY_POINT_TEXT_LEN)));
    }
}

fn push_list(points: &mut Vec<String>, fields: &FieldExtraction, field: Field) {
    if let Some(values) = fields.list(field) {
        points.push(format!("{}: {}", field, values.join(", ")));
    }
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tender::{DateRole, DateSchedule, WorkItem};
    use pretty_assertions::assert_eq;

    fn item(serial: usize) -> WorkItem {
        WorkItem {
            serial_number: serial.to_string(),
            description: format!("Supply of roof bolts lot {}", serial),
            quantity: "10 Nos".to_string(),
            unit: String::new(),
            unit_price: None,
            total_price: None,
        }
    }

    #[test]
    fn test_base_score() {
        assert_eq!(compliance_score(&FieldExtraction::new()), 20);
    }

    #[test]
    fn test_enquiry_adds_twenty() {
        let mut fields = FieldExtraction::new();
        fields.insert_text(Field::EnquiryNumber, "EAPH250035");
        assert_eq!(compliance_score(&fields), 40);
    }

    #[test]
    fn test_work_item_points_capped() {
        let mut fields = FieldExtraction::new();
        fields.insert(Field::WorkItems, FieldValue::Items((1..=30).map(item).collect()));
        assert_eq!(compliance_score(&fields), 40);
    }

    #[test]
    fn test_score_capped_at_ninety() {
        let mut fields = FieldExtraction::new();
        for field in [
            Field::EnquiryNumber,
            Field::TenderId,
            Field::ApproximateValue,
            Field::OrganizationName,
            Field::Title,
        ] {
            fields.insert_text(field, "Coal India value");
        }
        fields.insert(Field::WorkItems, FieldValue::Items((1..=10).map(item).collect()));
        assert_eq!(compliance_score(&fields), 90);
    }

    #[test]
    fn test_key_point_order() {
        let mut fields = FieldExtraction::new();
        fields.insert_text(Field::ApproximateValue, "Rs. 24,95,000");
        fields.insert_text(Field::OrganizationName, "Northern Coalfields Limited");
        fields.insert_text(Field::EnquiryNumber, "EAPH250035");
        let mut schedule = DateSchedule::default();
        schedule.assign(DateRole::SubmissionDeadline, "20.05.2025");
        schedule.all_dates.push("20.05.2025".to_string());
        fields.insert(Field::Dates, FieldValue::Schedule(schedule));
        fields.insert(Field::DateCount, FieldValue::Number(1));

        assert_eq!(
            key_points(&fields),
            vec![
                "Enquiry Number: EAPH250035",
                "Organization: Northern Coalfields Limited",
                "Submission Deadline: 20.05.2025",
                "Approximate Value: Rs. 24,95,000",
                "Dates Found: 1",
            ]
        );
    }

    #[test]
    fn test_empty_extraction_notes_text() {
        let text = "a".repeat(150);
        let result = summarize(FieldExtraction::new(), &text, &ExtractionConfig::default());
        assert_eq!(result.key_points[0], "Document uploaded");
        assert!(result.key_points[1].contains("150 characters"));
    }

    #[test]
    fn test_empty_extraction_notes_scan() {
        let text = "[Page 1] [image] scanned";
        let result = summarize(FieldExtraction::new(), text, &ExtractionConfig::default());
        assert!(result.key_points[1].contains("scanned"));
    }

    #[test]
    fn test_summary_mentions_reference() {
        let mut fields = FieldExtraction::new();
        fields.insert_text(Field::Title, "Supply of Roof Bolts");
        fields.insert_text(Field::OrganizationName, "NCL");
        fields.insert_text(Field::TenderId, "2025_NCL_1");
        assert_eq!(
            summary(&fields),
            "Supply of Roof Bolts issued by NCL (ref. 2025_NCL_1). 3 fields extracted by pattern matching."
        );
    }

    #[test]
    fn test_empty_result() {
        let result = empty_result();
        assert_eq!(result.compliance_score, 0);
        assert_eq!(result.key_points, vec![EXTRACTION_FAILED]);
    }
}
