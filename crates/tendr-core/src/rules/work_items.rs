//! Bill-of-quantity parsing.
//!
//! Two strategies run over the line-preserving text:
//!
//! - **Delimited rows**: a line split on tabs, runs of spaces or pipes
//!   into `serial | description… | quantity | unit | [rate] | [amount]`.
//! - **Line accumulation**: a numbered line opens an item and following
//!   lines extend its description until a quantity is seen.
//!
//! Results are merged (delimited rows first) and deduplicated by serial
//! number. Every candidate passes [`WorkItemFilter`] first.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use super::patterns::{
    COLUMN_SPLIT, FILE_EXTENSION, ITEM_START, NUMERIC_CELL, QUANTITY, QUANTITY_CELL, UNIT_CELL,
};
use super::vocabulary::Vocabulary;
use crate::models::config::ExtractionConfig;
use crate::models::tender::WorkItem;
use crate::text::{CorruptionThresholds, is_corrupted_with};

lazy_static! {
    static ref SERIAL_CELL: Regex = Regex::new(r"^(\d{1,4})[.)]?$").unwrap();
    static ref BARE_NUMBER: Regex = Regex::new(r"(?i)^\d+(?:\.\d+)?\s*(?:kb|mb)?$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Boilerplate word families; a description hitting three of them is
    /// legal text, not work.
    static ref LEGAL_CATEGORIES: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:certificat\w*|complian\w*|conformity|undertaking|affidavit)\b").unwrap(),
        Regex::new(r"(?i)\b(?:buyers?|sellers?|bidders?|vendors?|oems?|consignees?)\b").unwrap(),
        Regex::new(r"(?i)\b(?:catalog(?:ue)?s?|bunch(?:ing|ed)?|reverse\s+auction|L1)\b").unwrap(),
        Regex::new(r"(?i)\b(?:shall|liable|penalt\w*|clauses?|herein|thereof)\b").unwrap(),
        Regex::new(r"(?i)\b(?:emd|earnest\s+money|bank\s+guarantee|mii|make\s+in\s+india|mse)\b").unwrap(),
    ];
}

const MIN_DESCRIPTION_CHARS: usize = 10;
const KEYWORDLESS_MAX_CHARS: usize = 100;
const LEGAL_CATEGORY_LIMIT: usize = 3;

/// Why a candidate description was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Corrupted,
    FileReference,
    DocumentListing,
    BareNumber,
    TooShort,
    Disclaimer,
    LegalBoilerplate,
    NoWorkKeyword,
}

/// Noise filter for work-item descriptions.
#[derive(Debug, Clone)]
pub struct WorkItemFilter {
    vocabulary: Vocabulary,
    thresholds: CorruptionThresholds,
}

impl Default for WorkItemFilter {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}

impl WorkItemFilter {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            thresholds: CorruptionThresholds::WORK_ITEM,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Run every check in order; the first failing check is returned.
    pub fn check(&self, description: &str) -> Result<(), Rejection> {
        let description = description.trim();

        if is_corrupted_with(description, &self.thresholds) {
            return Err(Rejection::Corrupted);
        }
        if FILE_EXTENSION.is_match(description) {
            return Err(Rejection::FileReference);
        }
        if self.vocabulary.listing_phrase_in(description).is_some() {
            return Err(Rejection::DocumentListing);
        }
        if BARE_NUMBER.is_match(description) {
            return Err(Rejection::BareNumber);
        }

        let length = description.chars().count();
        if length < MIN_DESCRIPTION_CHARS {
            return Err(Rejection::TooShort);
        }
        if self.vocabulary.disclaimer_in(description).is_some() {
            return Err(Rejection::Disclaimer);
        }

        let legal_hits = LEGAL_CATEGORIES
            .iter()
            .filter(|category| category.is_match(description))
            .count();
        if legal_hits >= LEGAL_CATEGORY_LIMIT {
            return Err(Rejection::LegalBoilerplate);
        }

        if length > KEYWORDLESS_MAX_CHARS && !self.vocabulary.has_work_keyword(description) {
            return Err(Rejection::NoWorkKeyword);
        }

        Ok(())
    }

    pub fn accepts(&self, description: &str) -> bool {
        match self.check(description) {
            Ok(()) => true,
            Err(reason) => {
                trace!("work item rejected ({:?}): {:?}", reason, description);
                false
            }
        }
    }
}

/// Item being accumulated across lines.
struct PendingItem {
    serial_number: String,
    description: String,
}

impl PendingItem {
    fn into_item(self, quantity: String, unit: String) -> WorkItem {
        WorkItem {
            serial_number: self.serial_number,
            description: collapse(&self.description),
            quantity,
            unit,
            unit_price: None,
            total_price: None,
        }
    }
}

/// Work-item table parser.
#[derive(Debug, Clone)]
pub struct WorkItemParser {
    filter: WorkItemFilter,
    max_items: usize,
}

impl Default for WorkItemParser {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkItemParser {
    pub fn new() -> Self {
        Self {
            filter: WorkItemFilter::default(),
            max_items: ExtractionConfig::default().max_work_items,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.filter = WorkItemFilter::new(vocabulary);
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Parse work items from line-preserving text.
    pub fn parse(&self, text: &str) -> Vec<WorkItem> {
        let delimited = self.parse_delimited(text);
        let accumulated = self.parse_lines(text);
        debug!(
            "work items: {} delimited rows, {} accumulated lines",
            delimited.len(),
            accumulated.len()
        );

        let mut items: Vec<WorkItem> = Vec::new();
        for item in delimited.into_iter().chain(accumulated) {
            if items.len() >= self.max_items {
                break;
            }
            if items.iter().any(|i| i.serial_number == item.serial_number) {
                continue;
            }
            items.push(item);
        }
        items
    }

    /// Rows whose cells are separated by tabs, space runs or pipes.
    pub fn parse_delimited(&self, text: &str) -> Vec<WorkItem> {
        let mut items: Vec<WorkItem> = Vec::new();

        for line in text.lines() {
            if items.len() >= self.max_items {
                break;
            }
            let Some(item) = parse_row(line) else {
                continue;
            };
            if !self.filter.accepts(&item.description) {
                continue;
            }
            if items.iter().any(|i| i.serial_number == item.serial_number) {
                continue;
            }
            items.push(item);
        }

        items
    }

    /// Numbered lines whose descriptions may wrap onto following lines.
    pub fn parse_lines(&self, text: &str) -> Vec<WorkItem> {
        let mut items: Vec<WorkItem> = Vec::new();
        let mut current: Option<PendingItem> = None;

        for line in text.lines() {
            if items.len() >= self.max_items {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if self.filter.vocabulary().disclaimer_in(line).is_some() {
                if let Some(pending) = current.take() {
                    self.push(&mut items, pending.into_item(String::new(), String::new()));
                }
                continue;
            }

            if let Some(caps) = ITEM_START.captures(line) {
                if let Some(pending) = current.take() {
                    self.push(&mut items, pending.into_item(String::new(), String::new()));
                }
                let pending = PendingItem {
                    serial_number: caps[1].to_string(),
                    description: String::new(),
                };
                current = self.absorb(pending, &caps[2], &mut items);
                continue;
            }

            if let Some(pending) = current.take() {
                current = self.absorb(pending, line, &mut items);
            }
        }

        if let Some(pending) = current.take() {
            self.push(&mut items, pending.into_item(String::new(), String::new()));
        }

        items
    }

    /// Add a line to the pending item. Completes the item when the line
    /// carries a quantity or a bare unit cell.
    fn absorb(
        &self,
        mut pending: PendingItem,
        line: &str,
        items: &mut Vec<WorkItem>,
    ) -> Option<PendingItem> {
        if let Some(quantity) = QUANTITY.find(line) {
            append(&mut pending.description, &line[..quantity.start()]);
            let rest = line[quantity.end()..].trim();
            let unit = if UNIT_CELL.is_match(rest) { rest.to_string() } else { String::new() };
            let quantity = collapse(quantity.as_str());
            self.push(items, pending.into_item(quantity, unit));
            return None;
        }

        if !pending.description.is_empty() && UNIT_CELL.is_match(line) {
            self.push(items, pending.into_item(String::new(), line.to_string()));
            return None;
        }

        append(&mut pending.description, line);
        Some(pending)
    }

    fn push(&self, items: &mut Vec<WorkItem>, item: WorkItem) {
        if !self.filter.accepts(&item.description) {
            return;
        }
        if items.iter().any(|i| i.serial_number == item.serial_number) {
            return;
        }
        items.push(item);
    }
}

/// `serial, description…, quantity[, unit][, rate][, amount]`.
fn parse_row(line: &str) -> Option<WorkItem> {
    let cells: Vec<&str> = COLUMN_SPLIT
        .split(line.trim())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if cells.len() < 3 {
        return None;
    }

    let serial = SERIAL_CELL.captures(cells[0])?.get(1)?.as_str().to_string();

    // Quantity either in one cell ("20 Nos") or as a number followed by a
    // unit cell ("20", "Nos").
    let (quantity_index, quantity, mut next) = (2..cells.len()).find_map(|i| {
        if QUANTITY_CELL.is_match(cells[i]) {
            Some((i, collapse(cells[i]), i + 1))
        } else if NUMERIC_CELL.is_match(cells[i])
            && cells.get(i + 1).is_some_and(|unit| UNIT_CELL.is_match(unit))
        {
            Some((i, format!("{} {}", cells[i], cells[i + 1]), i + 2))
        } else {
            None
        }
    })?;

    let description = collapse(&cells[1..quantity_index].join(" "));
    if description.is_empty() {
        return None;
    }

    let mut unit = String::new();
    if next > quantity_index + 1 {
        unit = cells[quantity_index + 1].to_string();
    } else if let Some(cell) = cells.get(next).filter(|c| UNIT_CELL.is_match(c)) {
        unit = cell.to_string();
        next += 1;
    }

    let mut prices = cells[next.min(cells.len())..]
        .iter()
        .filter(|c| NUMERIC_CELL.is_match(c))
        .map(|c| c.to_string());

    Some(WorkItem {
        serial_number: serial,
        description,
        quantity,
        unit,
        unit_price: prices.next(),
        total_price: prices.next(),
    })
}

fn append(description: &mut String, fragment: &str) {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return;
    }
    if !description.is_empty() {
        description.push(' ');
    }
    description.push_str(fragment);
}

fn collapse(value: &str) -> String {
    WHITESPACE.replace_all(value.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(serial: &str, description: &str, quantity: &str, unit: &str) -> WorkItem {
        WorkItem {
            serial_number: serial.to_string(),
            description: description.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
            unit_price: None,
            total_price: None,
        }
    }

    #[test]
    fn test_tab_delimited_row() {
        let items = WorkItemParser::new().parse("1\tRoof Bolts Grouting M20 x 1800M\t20 Nos\tPer No.");
        assert_eq!(items, vec![item("1", "Roof Bolts Grouting M20 x 1800M", "20 Nos", "Per No.")]);
    }

    #[test]
    fn test_pipe_row_with_prices() {
        let items = WorkItemParser::new()
            .parse("2 | Supply of TMT steel bars Fe500 | 12.5 MT | Per MT | 55,000 | 6,87,500");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, "12.5 MT");
        assert_eq!(items[0].unit, "Per MT");
        assert_eq!(items[0].unit_price.as_deref(), Some("55,000"));
        assert_eq!(items[0].total_price.as_deref(), Some("6,87,500"));
    }

    #[test]
    fn test_split_quantity_and_unit_cells() {
        let items = WorkItemParser::new().parse("3    Painting of steel structures    450    Sq.M");
        assert_eq!(items, vec![item("3", "Painting of steel structures", "450 Sq.M", "Sq.M")]);
    }

    #[test]
    fn test_approximate_quantities() {
        let text = "4\tSteel wire rope for haulage\tapprox. 300 Mtrs\tPer Mtr\n\
            5 | Conveyor belt splicing kit | 12 Sets approx. | Per Set | 4,500";
        let items = WorkItemParser::new().parse(text);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], item("4", "Steel wire rope for haulage", "approx. 300 Mtrs", "Per Mtr"));
        assert_eq!(items[1].quantity, "12 Sets approx.");
        assert_eq!(items[1].unit, "Per Set");
        assert_eq!(items[1].unit_price.as_deref(), Some("4,500"));
    }

    #[test]
    fn test_wrapped_description() {
        let text = "1. Excavation of earth in foundation trenches\n\
            including disposal of surplus soil within 50 m lead\n\
            350 Cu.M.";
        let items = WorkItemParser::new().parse(text);
        assert_eq!(
            items,
            vec![item(
                "1",
                "Excavation of earth in foundation trenches including disposal of surplus soil within 50 m lead",
                "350 Cu.M.",
                ""
            )]
        );
    }

    #[test]
    fn test_new_serial_flushes_incomplete_item() {
        let text = "1. Supply of spare parts for conveyor belts\n\
            2. Repair of pump motor at Piparwar site 3 Nos";
        let items = WorkItemParser::new().parse(text);
        assert_eq!(
            items,
            vec![
                item("1", "Supply of spare parts for conveyor belts", "", ""),
                item("2", "Repair of pump motor at Piparwar site", "3 Nos", ""),
            ]
        );
    }

    #[test]
    fn test_disclaimer_line_is_not_an_item() {
        let text = "1\tRoof Bolts Grouting M20 x 1800M\t20 Nos\tPer No.\n\
            Disclaimer / अस्वीकरण Thank You";
        let items = WorkItemParser::new().parse(text);
        assert_eq!(items.len(), 1);
        assert!(items.iter().all(|i| !i.description.contains("Disclaimer")));
    }

    #[test]
    fn test_duplicate_serial_keeps_first() {
        let text = "1\tRoof Bolts Grouting M20 x 1800M\t20 Nos\tPer No.\n\
            1\tCement bags OPC 43 grade\t10 Nos\tPer No.";
        let items = WorkItemParser::new().parse(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Roof Bolts Grouting M20 x 1800M");
    }

    #[test]
    fn test_cap() {
        let text: String = (1..=150)
            .map(|i| format!("{}\tSupply of steel pipe lot {}\t{} Nos\tPer No.\n", i, i, i))
            .collect();
        let items = WorkItemParser::new().parse(&text);
        assert_eq!(items.len(), 100);
        let parser = WorkItemParser::new().with_max_items(5);
        assert_eq!(parser.parse(&text).len(), 5);
    }

    #[test]
    fn test_filter_rejections() {
        let filter = WorkItemFilter::default();
        assert_eq!(filter.check("Tender_Document_Part1.pdf"), Err(Rejection::FileReference));
        assert_eq!(filter.check("Notice Inviting Tender for coal"), Err(Rejection::DocumentListing));
        assert_eq!(filter.check("12.5 MB"), Err(Rejection::BareNumber));
        assert_eq!(filter.check("Bolts"), Err(Rejection::TooShort));
        assert_eq!(filter.check("Thank you for visiting the portal"), Err(Rejection::Disclaimer));
        assert_eq!(
            filter.check("Bidder must submit certificate of conformity or penalty applies"),
            Err(Rejection::LegalBoilerplate)
        );
        assert_eq!(filter.check("Pipe #### fittings"), Err(Rejection::Corrupted));
        assert_eq!(filter.check("Roof Bolts Grouting M20 x 1800M"), Ok(()));
    }

    #[test]
    fn test_keywordless_long_text() {
        let text = "Lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor \
            incididunt ut labore et dolore magna aliqua ut enim ad minim veniam quis nostrud";
        assert_eq!(WorkItemFilter::default().check(text), Err(Rejection::NoWorkKeyword));

        let dredging = "Dredging of the approach channel to a depth of six metres below chart datum \
            together with disposal at the designated offshore dumping ground";
        let filter = WorkItemFilter::new(Vocabulary::empty().with_work_keywords(&["dredging"]));
        assert_eq!(filter.check(dredging), Ok(()));
    }
}
