//! Tender analyzer combining an optional completion service with the
//! pattern-based fallback.

use tracing::{debug, info, warn};

use super::compare::compare_documents;
use super::compliance::check_compliance;
use super::summary::{empty_result, summarize};
use crate::completion::{self, CompletionService};
use crate::error::{CompletionError, Result};
use crate::models::comparison::{ComparisonResult, ComplianceReport, VendorDocument};
use crate::models::config::TendrConfig;
use crate::models::tender::{Document, ExtractionResult, Field, FieldExtraction, FieldValue};
use crate::rules::amounts::extract_financials;
use crate::rules::dates::DateExtractor;
use crate::rules::details::extract_details_with;
use crate::rules::identifiers::extract_identifiers;
use crate::rules::organization::extract_organization;
use crate::rules::vocabulary::Vocabulary;
use crate::rules::work_items::WorkItemParser;
use crate::text::{TextView, is_binary_or_corrupted};

/// Trait for tender analysis.
pub trait Analyzer {
    /// Analyze one document. Never fails; degraded input yields a degraded
    /// result.
    fn analyze(&self, document: &Document) -> ExtractionResult;
}

/// Analyzer that asks a completion service first and falls back to
/// pattern extraction on any failure.
pub struct TenderAnalyzer {
    config: TendrConfig,
    vocabulary: Vocabulary,
    completion: Option<Box<dyn CompletionService>>,
}

impl Default for TenderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TenderAnalyzer {
    /// Pattern-only analyzer with default settings.
    pub fn new() -> Self {
        Self {
            config: TendrConfig::default(),
            vocabulary: Vocabulary::default(),
            completion: None,
        }
    }

    /// Attach a completion service and enable it.
    pub fn with_completion(mut self, service: Box<dyn CompletionService>) -> Self {
        self.completion = Some(service);
        self.config.completion.enabled = true;
        self
    }

    /// Replace the configuration. `completion.enabled = false` keeps an
    /// attached service from being called.
    pub fn with_config(mut self, config: TendrConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn config(&self) -> &TendrConfig {
        &self.config
    }

    fn service(&self) -> Option<&dyn CompletionService> {
        if self.config.completion.enabled {
            self.completion.as_deref()
        } else {
            None
        }
    }

    /// Run the pattern extractors over `text` and merge their field groups.
    pub fn extract(&self, text: &str) -> FieldExtraction {
        let extraction = &self.config.extraction;
        let view = TextView::new(text);
        let normalized = view.normalized();

        let mut fields = FieldExtraction::new();
        fields.merge(extract_identifiers(normalized));
        fields.merge(extract_organization(normalized));
        fields.merge(extract_financials(normalized));

        let schedule = DateExtractor::from_config(extraction).extract(normalized);
        let date_count = schedule.all_dates.len() as u64;
        if fields.insert(Field::Dates, FieldValue::Schedule(schedule)) {
            fields.insert(Field::DateCount, FieldValue::Number(date_count));
        }

        let items = WorkItemParser::new()
            .with_vocabulary(self.vocabulary.clone())
            .with_max_items(extraction.max_work_items)
            .parse(view.raw());
        fields.insert(Field::WorkItems, FieldValue::Items(items));

        fields.merge(extract_details_with(normalized, extraction));

        drop_corrupted(&mut fields);
        fields
    }

    /// Pattern-only analysis.
    pub fn fallback(&self, document: &Document) -> ExtractionResult {
        if is_too_short(&document.text, self.config.extraction.min_text_length) {
            return empty_result();
        }
        let fields = self.extract(&document.text);
        debug!("{} fields extracted", fields.len());
        summarize(fields, &document.text, &self.config.extraction)
    }

    /// Check the mandatory clauses of one document.
    pub fn validate_compliance(&self, document: &Document) -> ComplianceReport {
        if let Some(service) = self.service() {
            let prompt = completion::compliance_prompt(
                &document.doc_type,
                &document.text,
                self.config.completion.max_prompt_chars,
            );
            match complete_with(service, &prompt, completion::parse_compliance) {
                Ok(report) => return report,
                Err(e) => warn!("Completion failed, validating with patterns: {}", e),
            }
        }
        check_compliance(&document.text)
    }

    /// Compare several bids.
    pub fn compare(&self, documents: &[VendorDocument]) -> ComparisonResult {
        if let Some(service) = self.service() {
            let prompt = completion::comparison_prompt(documents, self.config.completion.max_prompt_chars);
            match complete_with(service, &prompt, |r| completion::parse_comparison(r, documents)) {
                Ok(result) => return result,
                Err(e) => warn!("Completion failed, comparing with patterns: {}", e),
            }
        }
        compare_documents(documents, &self.config.comparison, &self.vocabulary)
    }
}

impl Analyzer for TenderAnalyzer {
    fn analyze(&self, document: &Document) -> ExtractionResult {
        info!(
            "Analyzing {} document ({} chars)",
            document.doc_type,
            document.text.chars().count()
        );

        if is_too_short(&document.text, self.config.extraction.min_text_length) {
            warn!("Document text too short to analyze");
            return empty_result();
        }

        if let Some(service) = self.service() {
            let prompt = completion::extraction_prompt(
                &document.doc_type,
                &document.text,
                self.config.completion.max_prompt_chars,
            );
            match complete_with(service, &prompt, completion::parse_extraction) {
                Ok(mut result) => {
                    drop_corrupted(&mut result.extracted_data);
                    info!("Analysis complete via completion service");
                    return result;
                }
                Err(e) => warn!("Completion failed, using pattern extraction: {}", e),
            }
        }

        let result = self.fallback(document);
        info!(
            "Analysis complete: {} fields, score {}",
            result.extracted_data.len(),
            result.compliance_score
        );
        result
    }
}

/// Pattern-only extraction with default configuration and vocabulary.
pub fn extract(text: &str) -> FieldExtraction {
    TenderAnalyzer::new().extract(text)
}

/// Pattern-only analysis with default configuration and vocabulary.
pub fn analyze(document: &Document) -> ExtractionResult {
    TenderAnalyzer::new().analyze(document)
}

/// Send `prompt` and parse the answer.
fn complete_with<T>(
    service: &dyn CompletionService,
    prompt: &str,
    parse: impl FnOnce(&str) -> std::result::Result<T, CompletionError>,
) -> Result<T> {
    let response = service.complete(prompt)?;
    Ok(parse(&response)?)
}

fn is_too_short(text: &str, min_len: usize) -> bool {
    text.trim().chars().count() < min_len
}

fn drop_corrupted(fields: &mut FieldExtraction) {
    let clean = |field: &Field, value: &str| {
        let keep = !is_binary_or_corrupted(value);
        if !keep {
            debug!("dropping corrupted {:?} value {:?}", field, value);
        }
        keep
    };

    for (field, value) in fields.iter_mut() {
        match value {
            FieldValue::List(items) => items.retain(|item| clean(field, item.as_str())),
            FieldValue::Schedule(schedule) => schedule.retain_dates(|date| clean(field, date)),
            _ => {}
        }
    }

    fields.retain(|field, value| match value {
        FieldValue::Text(text) => clean(&field, text),
        _ => !value.is_empty(),
    });
}
