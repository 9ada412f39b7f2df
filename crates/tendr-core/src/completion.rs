//! Hosted completion service seam.
//!
//! The analyzer can hand a prompt to an external model and parse the JSON
//! it returns. Nothing here performs network I/O; implementors own
//! transport, credentials and timeouts. Every parse failure is reported as
//! [`CompletionError::MalformedResponse`] so the caller can fall back to
//! pattern extraction.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::CompletionError;
use crate::models::comparison::{ComparisonResult, ComplianceReport, VendorDocument};
use crate::models::tender::{
    AnalysisSource, DateSchedule, ExtractionResult, Field, FieldExtraction, FieldValue, WorkItem,
};
use crate::text::is_binary_or_corrupted;

/// A service that turns a prompt into a (JSON-shaped) completion.
pub trait CompletionService: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

impl<F> CompletionService for F
where
    F: Fn(&str) -> Result<String, CompletionError> + Send + Sync,
{
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self(prompt)
    }
}

/// The absent service: always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompletion;

impl CompletionService for NoCompletion {
    fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Unavailable)
    }
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a completion into a JSON object.
pub fn parse_object(response: &str) -> Result<Map<String, Value>, CompletionError> {
    let body = strip_code_fence(response);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CompletionError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CompletionError::MalformedResponse(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Prompt for single-document analysis.
pub fn extraction_prompt(doc_type: &str, text: &str, max_chars: usize) -> String {
    let keys: Vec<String> = Field::ALL.iter().map(Field::key).collect();
    format!(
        "Analyze this {doc_type} tender document. Respond with JSON only, using the keys \
         summary, keyPoints, extractedData, complianceScore (0-100), missingClauses, riskFactors.\n\
         extractedData may only use these keys: {keys}.\n\nDocument:\n{text}",
        keys = keys.join(", "),
        text = truncate(text, max_chars),
    )
}

/// Prompt for mandatory-clause validation.
pub fn compliance_prompt(doc_type: &str, text: &str, max_chars: usize) -> String {
    format!(
        "Check this {doc_type} document for the clauses Performance Guarantee, Payment Terms, \
         EMD, Liquidated Damages and Termination Clause. Respond with JSON only, using the keys \
         presentClauses, missingClauses, score (0-100), compliant.\n\nDocument:\n{text}",
        text = truncate(text, max_chars),
    )
}

/// Prompt for multi-bid comparison. The text budget is shared between bids.
pub fn comparison_prompt(documents: &[VendorDocument], max_chars: usize) -> String {
    let per_document = max_chars / documents.len().max(1);
    let mut prompt = String::from(
        "Compare these bids for collusion and compliance. Respond with JSON only, using the keys \
         vendorScores (vendor -> 0-100), similarities, redFlags, recommendation. Every finding \
         must name the vendors involved.\n",
    );
    for document in documents {
        prompt.push_str(&format!(
            "\n--- {} ---\n{}\n",
            document.label,
            truncate(&document.text, per_document)
        ));
    }
    prompt
}

/// Convert an analysis response into a result.
///
/// Keys outside the field vocabulary and corrupted values are dropped; the
/// score is clamped to 0-100.
pub fn parse_extraction(response: &str) -> Result<ExtractionResult, CompletionError> {
    let object = parse_object(response)?;

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CompletionError::MalformedResponse("missing summary".to_string()))?
        .to_string();

    let extracted_data = match object.get("extractedData") {
        Some(Value::Object(data)) => parse_fields(data),
        _ => FieldExtraction::new(),
    };

    Ok(ExtractionResult {
        summary,
        key_points: string_list(object.get("keyPoints")),
        extracted_data,
        compliance_score: clamp_score(object.get("complianceScore")),
        missing_clauses: string_list(object.get("missingClauses")),
        risk_factors: string_list(object.get("riskFactors")),
        source: AnalysisSource::Completion,
    })
}

pub fn parse_compliance(response: &str) -> Result<ComplianceReport, CompletionError> {
    let object = parse_object(response)?;
    if !object.contains_key("presentClauses") && !object.contains_key("missingClauses") {
        return Err(CompletionError::MalformedResponse(
            "missing clause lists".to_string(),
        ));
    }

    let missing_clauses = string_list(object.get("missingClauses"));
    let compliant = object
        .get("compliant")
        .and_then(Value::as_bool)
        .unwrap_or(missing_clauses.is_empty());

    Ok(ComplianceReport {
        present_clauses: string_list(object.get("presentClauses")),
        missing_clauses,
        score: clamp_score(object.get("score")),
        compliant,
        source: AnalysisSource::Completion,
    })
}

/// Convert a comparison response. Scores are kept only for known vendors.
pub fn parse_comparison(
    response: &str,
    documents: &[VendorDocument],
) -> Result<ComparisonResult, CompletionError> {
    let object = parse_object(response)?;

    let recommendation = object
        .get("recommendation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CompletionError::MalformedResponse("missing recommendation".to_string()))?
        .to_string();

    let mut vendor_scores = BTreeMap::new();
    if let Some(Value::Object(scores)) = object.get("vendorScores") {
        for document in documents {
            if let Some(score) = scores.get(&document.label) {
                vendor_scores.insert(document.label.clone(), clamp_score(Some(score)));
            }
        }
    }

    Ok(ComparisonResult {
        vendor_scores,
        similarities: string_list(object.get("similarities")),
        red_flags: string_list(object.get("redFlags")),
        recommendation,
        source: AnalysisSource::Completion,
    })
}

fn parse_fields(data: &Map<String, Value>) -> FieldExtraction {
    let mut fields = FieldExtraction::new();
    for (key, value) in data {
        let Some(field) = Field::from_key(key) else {
            continue;
        };
        if let Some(value) = field_value(field, value) {
            fields.insert(field, value);
        }
    }
    fields
}

fn field_value(field: Field, value: &Value) -> Option<FieldValue> {
    match field {
        Field::WorkItems => {
            let items: Vec<WorkItem> = serde_json::from_value(value.clone()).ok()?;
            Some(FieldValue::Items(
                items
                    .into_iter()
                    .filter(|item| !is_binary_or_corrupted(&item.description))
                    .collect(),
            ))
        }
        Field::Dates => {
            let mut schedule: DateSchedule = serde_json::from_value(value.clone()).ok()?;
            schedule.retain_dates(|date| !is_binary_or_corrupted(date));
            if schedule.all_dates.is_empty() {
                let assigned: Vec<String> = schedule
                    .assigned()
                    .into_iter()
                    .map(|(_, date)| date.to_string())
                    .collect();
                schedule.all_dates = assigned;
            }
            Some(FieldValue::Schedule(schedule))
        }
        Field::DateCount => value.as_u64().map(FieldValue::Number),
        _ => match value {
            Value::String(s) if !is_binary_or_corrupted(s) => Some(FieldValue::Text(s.trim().to_string())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            Value::Array(items) => Some(FieldValue::List(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !is_binary_or_corrupted(s))
                    .map(|s| s.trim().to_string())
                    .collect(),
            )),
            _ => None,
        },
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn clamp_score(value: Option<&Value>) -> u8 {
    let score = value.and_then(Value::as_f64).unwrap_or(0.0);
    score.round().clamp(0.0, 100.0) as u8
}
