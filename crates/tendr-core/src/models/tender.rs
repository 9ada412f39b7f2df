//! Tender analysis data models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A document submitted for analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Text already extracted upstream (PDF text layer or OCR).
    pub text: String,

    /// Free-form document type label, used for logging and prompts only.
    pub doc_type: String,

    /// Size of the source file in bytes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl Document {
    pub fn new(text: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            doc_type: doc_type.into(),
            size_bytes: None,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }
}

/// Closed vocabulary of extractable field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    // Identifiers
    EnquiryNumber,
    TenderId,
    TenderReferenceNumber,
    NitNumber,
    BidNumber,

    // Organization
    OrganizationName,
    DepartmentName,
    MinistryName,
    Location,
    Pincode,
    OfficeAddress,

    // Metadata
    Title,
    Category,
    TenderType,

    // Timeline
    Dates,
    DateCount,
    ContractPeriod,
    BidValidity,

    // Financial
    ApproximateValue,
    EmdAmount,
    TenderFee,
    PerformanceSecurity,
    MinimumTurnover,
    Currency,

    // Scope
    WorkItems,
    ScopeOfWork,
    TechnicalSpecifications,

    // Eligibility
    EligibilityCriteria,
    ExperienceRequired,
    Certifications,
    PolicyFlags,

    // Submission & evaluation
    SubmissionMode,
    BidSystem,
    PortalUrl,
    EvaluationMethod,

    // Legal
    LiquidatedDamages,
    Jurisdiction,
    Arbitration,

    // Contact
    ContactPerson,
    ContactEmail,
    ContactPhone,

    // Attachments
    DocumentAttachments,
}

impl Field {
    /// Every field, in vocabulary order.
    pub const ALL: &'static [Field] = &[
        Field::EnquiryNumber,
        Field::TenderId,
        Field::TenderReferenceNumber,
        Field::NitNumber,
        Field::BidNumber,
        Field::OrganizationName,
        Field::DepartmentName,
        Field::MinistryName,
        Field::Location,
        Field::Pincode,
        Field::OfficeAddress,
        Field::Title,
        Field::Category,
        Field::TenderType,
        Field::Dates,
        Field::DateCount,
        Field::ContractPeriod,
        Field::BidValidity,
        Field::ApproximateValue,
        Field::EmdAmount,
        Field::TenderFee,
        Field::PerformanceSecurity,
        Field::MinimumTurnover,
        Field::Currency,
        Field::WorkItems,
        Field::ScopeOfWork,
        Field::TechnicalSpecifications,
        Field::EligibilityCriteria,
        Field::ExperienceRequired,
        Field::Certifications,
        Field::PolicyFlags,
        Field::SubmissionMode,
        Field::BidSystem,
        Field::PortalUrl,
        Field::EvaluationMethod,
        Field::LiquidatedDamages,
        Field::Jurisdiction,
        Field::Arbitration,
        Field::ContactPerson,
        Field::ContactEmail,
        Field::ContactPhone,
        Field::DocumentAttachments,
    ];

    /// Human-readable label used in key points.
    pub fn label(&self) -> &'static str {
        match self {
            Field::EnquiryNumber => "Enquiry Number",
            Field::TenderId => "Tender ID",
            Field::TenderReferenceNumber => "Tender Reference Number",
            Field::NitNumber => "NIT Number",
            Field::BidNumber => "Bid Number",
            Field::OrganizationName => "Organization",
            Field::DepartmentName => "Department",
            Field::MinistryName => "Ministry",
            Field::Location => "Location",
            Field::Pincode => "Pincode",
            Field::OfficeAddress => "Address",
            Field::Title => "Title",
            Field::Category => "Category",
            Field::TenderType => "Tender Type",
            Field::Dates => "Dates",
            Field::DateCount => "Dates Found",
            Field::ContractPeriod => "Contract Period",
            Field::BidValidity => "Bid Validity",
            Field::ApproximateValue => "Approximate Value",
            Field::EmdAmount => "EMD",
            Field::TenderFee => "Tender Fee",
            Field::PerformanceSecurity => "Performance Security",
            Field::MinimumTurnover => "Minimum Turnover",
            Field::Currency => "Currency",
            Field::WorkItems => "Work Items",
            Field::ScopeOfWork => "Scope of Work",
            Field::TechnicalSpecifications => "Technical Specifications",
            Field::EligibilityCriteria => "Eligibility",
            Field::ExperienceRequired => "Experience Required",
            Field::Certifications => "Certifications",
            Field::PolicyFlags => "Policy",
            Field::SubmissionMode => "Submission Mode",
            Field::BidSystem => "Bid System",
            Field::PortalUrl => "Portal",
            Field::EvaluationMethod => "Evaluation Method",
            Field::LiquidatedDamages => "Liquidated Damages",
            Field::Jurisdiction => "Jurisdiction",
            Field::Arbitration => "Arbitration",
            Field::ContactPerson => "Contact Person",
            Field::ContactEmail => "Contact Email",
            Field::ContactPhone => "Contact Phone",
            Field::DocumentAttachments => "Attachments",
        }
    }

    /// camelCase key as serialized.
    pub fn key(&self) -> String {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(key)) => key,
            _ => format!("{:?}", self),
        }
    }

    /// Parse a camelCase key as produced by serde.
    pub fn from_key(key: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(key.to_string())).ok()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value stored for an extracted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(u64),
    List(Vec<String>),
    Items(Vec<WorkItem>),
    Schedule(DateSchedule),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// All string content carried by the value, for validation.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            FieldValue::Text(s) => vec![s.as_str()],
            FieldValue::Number(_) => Vec::new(),
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
            FieldValue::Items(items) => items.iter().map(|i| i.description.as_str()).collect(),
            FieldValue::Schedule(schedule) => schedule.all_dates.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Items(items) => items.is_empty(),
            FieldValue::Schedule(schedule) => schedule.all_dates.is_empty(),
        }
    }
}

/// Extracted fields keyed by the closed vocabulary.
///
/// A key is present only when a non-empty value was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldExtraction {
    fields: BTreeMap<Field, FieldValue>,
}

impl FieldExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value unless the field is already set or the value is empty.
    /// Returns whether the value was stored.
    pub fn insert(&mut self, field: Field, value: FieldValue) -> bool {
        if value.is_empty() || self.fields.contains_key(&field) {
            return false;
        }
        self.fields.insert(field, value);
        true
    }

    pub fn insert_text(&mut self, field: Field, value: impl Into<String>) -> bool {
        self.insert(field, FieldValue::Text(value.into()))
    }

    /// Merge another extraction; existing fields win.
    pub fn merge(&mut self, other: FieldExtraction) {
        for (field, value) in other.fields {
            self.insert(field, value);
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn list(&self, field: Field) -> Option<&[String]> {
        self.get(field).and_then(FieldValue::as_list)
    }

    pub fn work_items(&self) -> &[WorkItem] {
        match self.get(Field::WorkItems) {
            Some(FieldValue::Items(items)) => items,
            _ => &[],
        }
    }

    pub fn dates(&self) -> Option<&DateSchedule> {
        match self.get(Field::Dates) {
            Some(FieldValue::Schedule(schedule)) => Some(schedule),
            _ => None,
        }
    }

    /// Keep only the fields for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(Field, &FieldValue) -> bool) {
        self.fields.retain(|field, value| keep(*field, value));
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Field, &mut FieldValue)> {
        self.fields.iter_mut()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &FieldValue)> {
        self.fields.iter()
    }
}

/// A bill-of-quantity line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Serial number as printed; the dedup key.
    pub serial_number: String,

    /// Item description, possibly joined from several lines.
    pub description: String,

    /// Quantity including its unit word, e.g. "20 Nos". Empty when the row
    /// was flushed before a quantity was seen.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quantity: String,

    /// Unit of measure column, e.g. "Per No.".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<String>,
}

/// Semantic role a date can play in a tender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateRole {
    EnquiryDate,
    TenderPublishDate,
    PreBidMeeting,
    BidOpeningDate,
    FinancialBidOpening,
    SubmissionDeadline,
    CorrigendumIssueDate,
    ContractStart,
    ContractEnd,
}

impl DateRole {
    /// Every role, in the order events happen in a tender.
    pub const TIMELINE: [DateRole; 9] = [
        DateRole::EnquiryDate,
        DateRole::TenderPublishDate,
        DateRole::CorrigendumIssueDate,
        DateRole::PreBidMeeting,
        DateRole::SubmissionDeadline,
        DateRole::BidOpeningDate,
        DateRole::FinancialBidOpening,
        DateRole::ContractStart,
        DateRole::ContractEnd,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DateRole::EnquiryDate => "Enquiry Date",
            DateRole::TenderPublishDate => "Published",
            DateRole::PreBidMeeting => "Pre-Bid Meeting",
            DateRole::BidOpeningDate => "Bid Opening",
            DateRole::FinancialBidOpening => "Financial Bid Opening",
            DateRole::SubmissionDeadline => "Submission Deadline",
            DateRole::CorrigendumIssueDate => "Corrigendum Issued",
            DateRole::ContractStart => "Contract Start",
            DateRole::ContractEnd => "Contract End",
        }
    }
}

/// Dates found in a document with their assigned roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enquiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tender_publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_bid_meeting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_opening_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_bid_opening: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrigendum_issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_end: Option<String>,

    /// Every normalized date in recency order. Dates holding a role are
    /// always listed; the rest are capped.
    #[serde(default)]
    pub all_dates: Vec<String>,
}

impl DateSchedule {
    fn slot(&mut self, role: DateRole) -> &mut Option<String> {
        match role {
            DateRole::EnquiryDate => &mut self.enquiry_date,
            DateRole::TenderPublishDate => &mut self.tender_publish_date,
            DateRole::PreBidMeeting => &mut self.pre_bid_meeting,
            DateRole::BidOpeningDate => &mut self.bid_opening_date,
            DateRole::FinancialBidOpening => &mut self.financial_bid_opening,
            DateRole::SubmissionDeadline => &mut self.submission_deadline,
            DateRole::CorrigendumIssueDate => &mut self.corrigendum_issue_date,
            DateRole::ContractStart => &mut self.contract_start,
            DateRole::ContractEnd => &mut self.contract_end,
        }
    }

    /// Fill a role slot; the first assignment wins.
    pub fn assign(&mut self, role: DateRole, date: impl Into<String>) -> bool {
        let slot = self.slot(role);
        if slot.is_some() {
            return false;
        }
        *slot = Some(date.into());
        true
    }

    pub fn get(&self, role: DateRole) -> Option<&str> {
        let value = match role {
            DateRole::EnquiryDate => &self.enquiry_date,
            DateRole::TenderPublishDate => &self.tender_publish_date,
            DateRole::PreBidMeeting => &self.pre_bid_meeting,
            DateRole::BidOpeningDate => &self.bid_opening_date,
            DateRole::FinancialBidOpening => &self.financial_bid_opening,
            DateRole::SubmissionDeadline => &self.submission_deadline,
            DateRole::CorrigendumIssueDate => &self.corrigendum_issue_date,
            DateRole::ContractStart => &self.contract_start,
            DateRole::ContractEnd => &self.contract_end,
        };
        value.as_deref()
    }

    /// Assigned roles in timeline order.
    pub fn assigned(&self) -> Vec<(DateRole, &str)> {
        DateRole::TIMELINE
            .into_iter()
            .filter_map(|role| self.get(role).map(|date| (role, date)))
            .collect()
    }

    /// Drop every date, in the role slots and the raw list, that fails
    /// `keep`.
    pub fn retain_dates(&mut self, mut keep: impl FnMut(&str) -> bool) {
        for role in DateRole::TIMELINE {
            let slot = self.slot(role);
            if slot.as_deref().is_some_and(|date| !keep(date)) {
                *slot = None;
            }
        }
        self.all_dates.retain(|date| keep(date));
    }
}

/// Result of analyzing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub extracted_data: FieldExtraction,
    /// 0-100; the pattern-based path never exceeds 90.
    pub compliance_score: u8,
    /// Populated by the completion path only.
    pub missing_clauses: Vec<String>,
    /// Populated by the completion path only.
    pub risk_factors: Vec<String>,
    /// Which path produced the result.
    #[serde(default)]
    pub source: AnalysisSource,
}

/// Origin of an analysis result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Hosted completion service.
    Completion,
    /// Regex-based fallback extraction.
    #[default]
    Fallback,
}
