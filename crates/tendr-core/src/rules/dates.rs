//! Date collection and role assignment.
//!
//! Three passes over the document:
//!
//! 1. **Collection**: every date-shaped token is parsed, normalized to
//!    `DD.MM.YYYY` and deduplicated. Fragments without a year and tokens
//!    mixing separators (`25-26/2025`) are dropped.
//! 2. **Ordering**: 2025 first, then 2024, then the remaining years
//!    newest first. Ties keep document order.
//! 3. **Assignment**: each date's surrounding text is matched against a
//!    keyword table in priority order. When no date matches any keyword,
//!    roles are guessed from position in the ordered list instead.
//!
//! Every role is filled at most once; the first date to claim it wins.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use super::amounts::continues_digit_run;
use super::patterns::{DATE_DMY, DATE_MONTH_NAME, DATE_YMD};
use crate::models::config::ExtractionConfig;
use crate::models::tender::{DateRole, DateSchedule};

lazy_static! {
    /// Role keywords in priority order; lower priority numbers win.
    static ref ROLE_KEYWORDS: Vec<(DateRole, u8, Regex)> = vec![
        (DateRole::EnquiryDate, 1, Regex::new(
            r"(?i)\benquiry\s*(?:date|dated)\b|\b(?:enquiry|enq)\.?\s*(?:no\b\.?|number\b)[^\n]*?\bdated?\b|\bdate\s+of\s+enquiry\b"
        ).unwrap()),
        (DateRole::SubmissionDeadline, 2, Regex::new(
            r"(?i)\bsubmission\s+(?:deadline|end\s+date|closing\s+date|date)\b|\blast\s+date\b|\bbid\s+submission\s+(?:end|closing|last)\s*date\b|\bdue\s+date\b|\bclosing\s+date\b|\bbid\s+end\s+date\b|\bdeadline\b"
        ).unwrap()),
        (DateRole::BidOpeningDate, 3, Regex::new(
            r"(?i)\b(?:technical\s+)?bid\s+opening\b|\bbid\s+open\s+date\b|\bopening\s+date\b|\bdate\s+of\s+opening\b|\btender\s+opening\b"
        ).unwrap()),
        (DateRole::PreBidMeeting, 4, Regex::new(
            r"(?i)\bpre[\s\-]*bid\b"
        ).unwrap()),
        (DateRole::FinancialBidOpening, 5, Regex::new(
            r"(?i)\b(?:financial|price|commercial)\s+bid\s+opening\b|\bopening\s+of\s+(?:financial|price|commercial)\s+bids?\b"
        ).unwrap()),
        (DateRole::TenderPublishDate, 6, Regex::new(
            r"(?i)\bpublish(?:ed|ing)?\s+(?:date|on)\b|\bdate\s+of\s+(?:publication|publishing|issue)\b|\bpublication\s+date\b|\bbid\s+start\s+date\b|\bissue\s+date\b|\bnit\s+date\b"
        ).unwrap()),
        (DateRole::ContractStart, 7, Regex::new(
            r"(?i)\b(?:contract|work)\s+(?:start|commencement)\s+date\b|\bdate\s+of\s+commencement\b|\bcommencement\s+date\b"
        ).unwrap()),
        (DateRole::ContractEnd, 7, Regex::new(
            r"(?i)\b(?:contract|work)\s+(?:end|completion|expiry)\s+date\b|\bdate\s+of\s+completion\b|\bcompletion\s+date\b"
        ).unwrap()),
        (DateRole::CorrigendumIssueDate, 8, Regex::new(
            r"(?i)\bcorrigendum\b|\baddendum\b|\bamendment\b"
        ).unwrap()),
    ];

    /// Names a financial bid opening; vetoes a plain bid-opening match.
    static ref FINANCIAL_OPENING: Regex = Regex::new(
        r"(?i)\b(?:financial|price|commercial)\s+bid"
    ).unwrap();
}

/// A distinct date found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCandidate {
    /// First occurrence as printed.
    pub raw_text: String,
    /// `DD.MM.YYYY`.
    pub normalized: String,
    pub date: NaiveDate,
    /// Byte spans of every occurrence, in document order.
    pub spans: Vec<(usize, usize)>,
}

/// Why a date received (or did not receive) its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentTier {
    /// A keyword of the given priority was found near the date.
    Keyword(u8),
    /// Guessed from the date's position in the ordered list.
    Positional,
    /// No role, or the matching role was already taken.
    Unassigned,
}

/// Role decision for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAssignment {
    pub candidate: DateCandidate,
    pub role: Option<DateRole>,
    pub tier: AssignmentTier,
}

/// Date extractor with configurable caps.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    max_dates: usize,
    context_window: usize,
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DateExtractor {
    pub fn new() -> Self {
        let config = ExtractionConfig::default();
        Self::from_config(&config)
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_dates: config.max_dates,
            context_window: config.date_context_window,
        }
    }

    /// Collect and order the dates in `text`.
    pub fn collect(&self, text: &str) -> Vec<DateCandidate> {
        collect_dates(text)
    }

    /// Assign roles to already collected dates.
    pub fn assign(&self, text: &str, dates: &[DateCandidate]) -> Vec<DateAssignment> {
        let spans: Vec<(usize, usize)> = {
            let mut all: Vec<(usize, usize)> = dates.iter().flat_map(|d| d.spans.iter().copied()).collect();
            all.sort_unstable();
            all
        };

        let mut schedule = DateSchedule::default();
        let mut assignments: Vec<DateAssignment> = Vec::with_capacity(dates.len());

        for candidate in dates {
            let keyword = candidate
                .spans
                .iter()
                .find_map(|span| self.keyword_role(text, *span, &spans));

            let (role, tier) = match keyword {
                Some((role, priority)) => {
                    if schedule.assign(role, candidate.normalized.clone()) {
                        (Some(role), AssignmentTier::Keyword(priority))
                    } else {
                        trace!("{} matches {:?} but the role is taken", candidate.normalized, role);
                        (None, AssignmentTier::Unassigned)
                    }
                }
                None => (None, AssignmentTier::Unassigned),
            };

            assignments.push(DateAssignment {
                candidate: candidate.clone(),
                role,
                tier,
            });
        }

        if assignments.iter().all(|a| a.role.is_none()) {
            debug!("no date keywords found, assigning roles by position");
            assign_by_position(&mut assignments);
        }

        assignments
    }

    /// Collect dates and build the role schedule. Roles are assigned over
    /// every date; only the unassigned part of the raw list is capped.
    pub fn extract(&self, text: &str) -> DateSchedule {
        let dates = self.collect(text);
        let assignments = self.assign(text, &dates);

        let assigned = assignments.iter().filter(|a| a.role.is_some()).count();
        let mut room = self.max_dates.saturating_sub(assigned);

        let mut schedule = DateSchedule::default();
        for assignment in &assignments {
            let normalized = &assignment.candidate.normalized;
            match assignment.role {
                Some(role) => {
                    schedule.assign(role, normalized.clone());
                }
                None if room > 0 => room -= 1,
                None => continue,
            }
            schedule.all_dates.push(normalized.clone());
        }

        debug!(
            "{} dates, {} roles assigned",
            schedule.all_dates.len(),
            schedule.assigned().len()
        );
        schedule
    }

    /// Search the text around one occurrence, nearest context first: same
    /// line before, same line after, then the wider window on each side.
    /// Windows stop at neighbouring date tokens and never reach into a
    /// line that holds another date.
    fn keyword_role(
        &self,
        text: &str,
        span: (usize, usize),
        all_spans: &[(usize, usize)],
    ) -> Option<(DateRole, u8)> {
        let (start, end) = span;

        let prev_end = all_spans
            .iter()
            .filter(|(_, e)| *e <= start)
            .map(|(_, e)| *e)
            .max();
        let next_start = all_spans
            .iter()
            .filter(|(s, _)| *s >= end)
            .map(|(s, _)| *s)
            .min();

        // Text on the line of a neighbouring date belongs to that date.
        let prev_end = prev_end.map_or(0, |e| text[e..start].find('\n').map_or(e, |i| e + i));
        let next_start = next_start.map_or(text.len(), |s| text[end..s].rfind('\n').map_or(s, |i| end + i));

        let window_start = floor_char_boundary(text, start.saturating_sub(self.context_window).max(prev_end));
        let window_end = ceil_char_boundary(text, (end + self.context_window).min(next_start));

        let before = &text[window_start..start];
        let after = &text[end..window_end];
        let before_line = before.rsplit('\n').next().unwrap_or("");
        let after_line = after.split('\n').next().unwrap_or("");

        [before_line, after_line, before, after]
            .into_iter()
            .find_map(match_role)
    }
}

/// Highest-priority role named in `context`.
fn match_role(context: &str) -> Option<(DateRole, u8)> {
    if context.trim().is_empty() {
        return None;
    }
    let financial = FINANCIAL_OPENING.is_match(context);

    ROLE_KEYWORDS
        .iter()
        .filter(|(role, _, _)| !(financial && *role == DateRole::BidOpeningDate))
        .find(|(_, _, pattern)| pattern.is_match(context))
        .map(|(role, priority, _)| (*role, *priority))
}

/// First date is the publish date, the last the submission deadline,
/// dates in the middle of the list the bid opening or pre-bid meeting.
fn assign_by_position(assignments: &mut [DateAssignment]) {
    let n = assignments.len();
    let mut schedule = DateSchedule::default();

    for i in 0..n {
        let role = if i == 0 {
            Some(DateRole::TenderPublishDate)
        } else if i == n - 1 {
            Some(DateRole::SubmissionDeadline)
        } else {
            let ratio = i as f64 / (n - 1) as f64;
            if (0.4..=0.6).contains(&ratio) {
                Some(DateRole::BidOpeningDate)
            } else if (0.2..=0.5).contains(&ratio) {
                Some(DateRole::PreBidMeeting)
            } else {
                None
            }
        };

        let assignment = &mut assignments[i];
        if let Some(role) = role {
            if schedule.assign(role, assignment.candidate.normalized.clone()) {
                assignment.role = Some(role);
                assignment.tier = AssignmentTier::Positional;
            }
        }
    }
}

/// Every distinct date in `text`, in recency order.
pub fn collect_dates(text: &str) -> Vec<DateCandidate> {
    let bias_to_2000s = text.contains("2025") || text.contains("2024");

    let mut found: Vec<(usize, usize, String, NaiveDate)> = Vec::new();

    for caps in DATE_DMY.captures_iter(text) {
        let whole = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
        let Some((start, end, raw)) = whole else {
            continue;
        };
        let (sep1, sep2) = (ocr_separator(&caps[2]), ocr_separator(&caps[4]));
        if sep1 != sep2 {
            trace!("rejecting mixed-separator token {:?}", raw);
            continue;
        }
        let comma = &caps[2] == "," || &caps[4] == ",";
        if is_grouped_amount(text, start, end, comma, (&caps[1], &caps[3], &caps[5])) {
            trace!("rejecting amount-shaped token {:?}", raw);
            continue;
        }
        let (Ok(day), Ok(month)) = (caps[1].parse::<u32>(), caps[3].parse::<u32>()) else {
            continue;
        };
        let Some(year) = expand_year(&caps[5], bias_to_2000s) else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            found.push((start, end, raw.to_string(), date));
        }
    }

    for caps in DATE_YMD.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let parsed = (
            caps[1].parse::<i32>(),
            caps[2].parse::<u32>(),
            caps[3].parse::<u32>(),
        );
        if let (Ok(year), Ok(month), Ok(day)) = parsed {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                found.push((whole.start(), whole.end(), whole.as_str().to_string(), date));
            }
        }
    }

    for caps in DATE_MONTH_NAME.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let (Ok(day), Some(month), Ok(year)) = (
            caps[1].parse::<u32>(),
            month_number(&caps[2]),
            caps[3].parse::<i32>(),
        ) else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            found.push((whole.start(), whole.end(), whole.as_str().to_string(), date));
        }
    }

    found.sort_by_key(|(start, _, _, _)| *start);

    let mut dates: Vec<DateCandidate> = Vec::new();
    for (start, end, raw, date) in found {
        let normalized = date.format("%d.%m.%Y").to_string();
        match dates.iter_mut().find(|d| d.normalized == normalized) {
            Some(existing) => existing.spans.push((start, end)),
            None => dates.push(DateCandidate {
                raw_text: raw,
                normalized,
                date,
                spans: vec![(start, end)],
            }),
        }
    }

    dates.sort_by_key(|d| recency_rank(d.date.year()));
    dates
}

/// Assign roles to dates with the default extractor.
pub fn assign_roles(text: &str, dates: &[DateCandidate]) -> Vec<DateAssignment> {
    DateExtractor::new().assign(text, dates)
}

/// Collect dates and build the role schedule with the default extractor.
pub fn extract_dates(text: &str) -> DateSchedule {
    DateExtractor::new().extract(text)
}

/// Digit groups that belong to an amount rather than a date: a currency
/// marker in front, more groups after, or comma-separated groups not
/// shaped `DD,MM,YYYY`.
fn is_grouped_amount(
    text: &str,
    start: usize,
    end: usize,
    comma: bool,
    (day, month, year): (&str, &str, &str),
) -> bool {
    if continues_digit_run(&text[end..]) {
        return true;
    }

    let before = &text[..start];
    if before.ends_with(',') && before[..before.len() - 1].ends_with(|c: char| c.is_ascii_digit()) {
        return true;
    }
    let lead = before.trim_end().trim_end_matches('.').to_lowercase();
    if lead.ends_with('₹') {
        return true;
    }
    for marker in ["rs", "inr"] {
        if let Some(head) = lead.strip_suffix(marker) {
            if !head.ends_with(|c: char| c.is_alphabetic()) {
                return true;
            }
        }
    }

    comma && (day.len() != 2 || month.len() != 2 || year.len() != 4)
}

fn recency_rank(year: i32) -> (u8, i32) {
    match year {
        2025 => (0, 0),
        2024 => (1, 0),
        _ => (2, -year),
    }
}

/// A comma standing in for a separator is a misread dot.
fn ocr_separator(sep: &str) -> &str {
    if sep == "," { "." } else { sep }
}

fn expand_year(raw: &str, bias_to_2000s: bool) -> Option<i32> {
    let value: i32 = raw.parse().ok()?;
    if raw.len() == 4 {
        return Some(value);
    }
    if bias_to_2000s || value <= 50 {
        Some(2000 + value)
    } else {
        Some(1900 + value)
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalized(dates: &[DateCandidate]) -> Vec<&str> {
        dates.iter().map(|d| d.normalized.as_str()).collect()
    }

    #[test]
    fn test_enquiry_date() {
        let schedule = extract_dates("Enquiry Number: EAPH250035 Dated: 12.05.2025");
        assert_eq!(schedule.enquiry_date.as_deref(), Some("12.05.2025"));
        assert_eq!(schedule.all_dates, vec!["12.05.2025"]);
        assert_eq!(schedule.assigned().len(), 1);
    }

    #[test]
    fn test_separators_and_ocr_comma() {
        let dates = collect_dates("From 01/04/2025 to 15-04-2025, revised 20,04.2025");
        assert_eq!(normalized(&dates), vec!["01.04.2025", "15.04.2025", "20.04.2025"]);
    }

    #[test]
    fn test_rejects_fragments() {
        assert!(collect_dates("Working days 25-26/2025 and 12.05 only").is_empty());
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(normalized(&collect_dates("Dated 05.06.99")), vec!["05.06.1999"]);
        assert_eq!(normalized(&collect_dates("Dated 05.06.20")), vec!["05.06.2020"]);
        assert_eq!(
            normalized(&collect_dates("Dated 05.06.99 for FY 2024")),
            vec!["05.06.2099"]
        );
    }

    #[test]
    fn test_recency_order_and_dedup() {
        let text = "01.01.2019 05.05.2024 03.03.2025 02.02.2021 05.05.2024 3 March 2025";
        let dates = collect_dates(text);
        assert_eq!(
            normalized(&dates),
            vec!["03.03.2025", "05.05.2024", "02.02.2021", "01.01.2019"]
        );
        assert_eq!(dates[0].spans.len(), 2);
        assert_eq!(dates[1].spans.len(), 2);
    }

    #[test]
    fn test_iso_and_month_names() {
        let dates = collect_dates("Start 2025-06-01, end 30th June, 2025");
        assert_eq!(normalized(&dates), vec!["01.06.2025", "30.06.2025"]);
    }

    #[test]
    fn test_single_submission_deadline() {
        let text = "Submission Deadline: 20.05.2025 17:00 hrs";
        let dates = collect_dates(text);
        let assignments = assign_roles(text, &dates);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].role, Some(DateRole::SubmissionDeadline));
        assert_eq!(assignments[0].tier, AssignmentTier::Keyword(2));

        let schedule = extract_dates(text);
        assert_eq!(schedule.assigned(), vec![(DateRole::SubmissionDeadline, "20.05.2025")]);
    }

    #[test]
    fn test_keyword_table() {
        let text = "Bid Start Date: 01.05.2025\n\
            Pre-Bid Meeting: 05.05.2025\n\
            Last Date of Submission: 20.05.2025\n\
            Technical Bid Opening: 21.05.2025\n\
            Financial Bid Opening Date: 28.05.2025\n\
            Corrigendum issued on 10.05.2025";
        let schedule = extract_dates(text);
        assert_eq!(schedule.tender_publish_date.as_deref(), Some("01.05.2025"));
        assert_eq!(schedule.pre_bid_meeting.as_deref(), Some("05.05.2025"));
        assert_eq!(schedule.submission_deadline.as_deref(), Some("20.05.2025"));
        assert_eq!(schedule.bid_opening_date.as_deref(), Some("21.05.2025"));
        assert_eq!(schedule.financial_bid_opening.as_deref(), Some("28.05.2025"));
        assert_eq!(schedule.corrigendum_issue_date.as_deref(), Some("10.05.2025"));
    }

    #[test]
    fn test_taken_role_leaves_date_unassigned() {
        let text = "Submission Deadline: 20.05.2025\nRevised Submission Deadline: 27.05.2025";
        let assignments = assign_roles(text, &collect_dates(text));
        assert_eq!(assignments[0].role, Some(DateRole::SubmissionDeadline));
        assert_eq!(assignments[1].role, None);
        assert_eq!(assignments[1].tier, AssignmentTier::Unassigned);
    }

    #[test]
    fn test_positional_fallback() {
        let text = "Schedule: 01.05.2025 then 10.05.2025 and 20.05.2025";
        let assignments = assign_roles(text, &collect_dates(text));
        let roles: Vec<Option<DateRole>> = assignments.iter().map(|a| a.role).collect();
        assert_eq!(
            roles,
            vec![
                Some(DateRole::TenderPublishDate),
                Some(DateRole::BidOpeningDate),
                Some(DateRole::SubmissionDeadline),
            ]
        );
        assert!(assignments.iter().all(|a| a.tier == AssignmentTier::Positional));
    }

    #[test]
    fn test_positional_pre_bid() {
        let text = "01.05.2025 ; 05.05.2025 ; 09.05.2025 ; 12.05.2025 ; 15.05.2025 ; 20.05.2025";
        let schedule = extract_dates(text);
        assert_eq!(schedule.tender_publish_date.as_deref(), Some("01.05.2025"));
        assert_eq!(schedule.pre_bid_meeting.as_deref(), Some("05.05.2025"));
        assert_eq!(schedule.bid_opening_date.as_deref(), Some("09.05.2025"));
        assert_eq!(schedule.submission_deadline.as_deref(), Some("20.05.2025"));
    }

    #[test]
    fn test_grouped_amounts_are_not_dates() {
        assert!(collect_dates("Approximate Value of Work: Rs. 1,10,25,000/-").is_empty());
        assert!(collect_dates("Turnover 12,10,25,000 and EMD 2,05,25").is_empty());
        assert!(collect_dates("Tender value ₹ 12.05.25 Lakhs").is_empty());
        assert_eq!(normalized(&collect_dates("Opening on 12,05,2025")), vec!["12.05.2025"]);
        assert_eq!(normalized(&collect_dates("11:00 hrs 12.05.2025")), vec!["12.05.2025"]);
    }

    #[test]
    fn test_label_after_many_dates_keeps_its_role() {
        let mut text: String = (1..=10).map(|d| format!("Milestone {:02}.04.2025\n", d)).collect();
        text.push_str("Financial Bid Opening: 28.05.2025\n");

        let schedule = extract_dates(&text);
        assert_eq!(schedule.financial_bid_opening.as_deref(), Some("28.05.2025"));
        assert!(schedule.all_dates.contains(&"28.05.2025".to_string()));
        assert_eq!(schedule.all_dates.len(), 10);
        assert_eq!(schedule.assigned().len(), 1);
    }

    #[test]
    fn test_next_line_label_belongs_to_next_date() {
        let text = "Meeting 02.05.2025\nSubmission Deadline: 20.05.2025";
        let schedule = extract_dates(text);
        assert_eq!(schedule.submission_deadline.as_deref(), Some("20.05.2025"));
        assert_eq!(schedule.assigned().len(), 1);
    }

    #[test]
    fn test_cap() {
        let text: String = (1..=20).map(|d| format!("{:02}.03.2025 ", d)).collect();
        let schedule = extract_dates(&text);
        assert_eq!(schedule.all_dates.len(), 10);
    }
}
