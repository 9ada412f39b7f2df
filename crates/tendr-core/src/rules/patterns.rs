//! Common regex patterns for tender document extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Unit vocabulary accepted after a quantity.
pub const UNIT_WORDS: &str = r"(?:Nos?\b\.?|Numbers?\b|Cu\.?\s?M(?:tr)?s?\b\.?|Cum\b|Sq\.?\s?M(?:tr)?s?\b\.?|Tons?\b|Tonnes?\b|MT\b|Sets?\b|Mtrs?\b\.?|Meters?\b|Metres?\b|R\.?M\b\.?|KMs?\b|Kgs?\b|Ltrs?\b|Litres?\b|Each\b|Lots?\b|Pairs?\b|Pcs\b|Units?\b|LS\b|Job\b)";

lazy_static! {
    // Dates: day / month / 2- or 4-digit year, separators . / - (a comma
    // is an OCR-mangled dot).
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})\s?([./\-,])\s?(\d{1,2})\s?([./\-,])\s?(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?[\s\-]+(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?[\s\-,]+(\d{4})\b"
    ).unwrap();

    // Amounts
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"(?i)(?:₹|\bRs\.?|\bINR)\s*(\d[\d,]*(?:\.\d+)?)"
    ).unwrap();

    pub static ref GROUPED_NUMBER: Regex = Regex::new(
        r"\b(\d{1,3}(?:,\d{2,3})+(?:\.\d{1,2})?)\b(?:\s*/-)?"
    ).unwrap();

    // Contact
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    // Indian mobile numbers and STD landlines
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+91[\s\-]?)?\b(?:[6-9]\d{9}|0\d{2,4}[\s\-]\d{6,8})\b"
    ).unwrap();

    pub static ref PINCODE: Regex = Regex::new(
        r"(?i)\bpin\s*(?:code)?\s*[:.\-]?\s*(\d{3}\s?\d{3})\b"
    ).unwrap();

    // Attachments and file-listing noise
    pub static ref FILE_NAME: Regex = Regex::new(
        r"(?i)\b([\w][\w\-.()]{0,80}?\.(?:pdf|xlsx?|docx?|csv|zip|rar|jpe?g|png))\b"
    ).unwrap();

    pub static ref FILE_EXTENSION: Regex = Regex::new(
        r"(?i)\.(?:pdf|xlsx?|docx?|csv|zip|rar|jpe?g|png)\b"
    ).unwrap();

    // Standards compliance phrases
    pub static ref STANDARD_CODE: Regex = Regex::new(
        r"\b(ISO|IS|IEC|ASME|ANSI|IEEE)\s*[:\-]?\s*(\d{2,6}(?:[:\-/]\d{1,4})?)\b"
    ).unwrap();

    // Work items
    pub static ref QUANTITY: Regex = Regex::new(&format!(
        r"(?i)(?:approx\.?\s*)?\b\d[\d,]*(?:\.\d+)?\s*{}(?:\s*approx\.?)?",
        UNIT_WORDS
    )).unwrap();

    pub static ref QUANTITY_CELL: Regex = Regex::new(&format!(
        r"(?i)^(?:approx\.?\s*)?\d[\d,]*(?:\.\d+)?\s*{}(?:\s*approx\.?)?$",
        UNIT_WORDS
    )).unwrap();

    pub static ref UNIT_CELL: Regex = Regex::new(&format!(
        r"(?i)^(?:per\s+|each\s+)?{}$",
        UNIT_WORDS
    )).unwrap();

    pub static ref NUMERIC_CELL: Regex = Regex::new(
        r"^(?:₹|Rs\.?|INR)?\s*\d[\d,]*(?:\.\d+)?(?:\s*/-)?$"
    ).unwrap();

    pub static ref COLUMN_SPLIT: Regex = Regex::new(
        r"\t+|\s{2,}|\s*\|\s*"
    ).unwrap();

    pub static ref ITEM_START: Regex = Regex::new(
        r"^\s*(\d{1,4})[.)]?\s+(\S.{9,})$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_vocabulary() {
        assert!(QUANTITY_CELL.is_match("20 Nos"));
        assert!(QUANTITY_CELL.is_match("500 Cu.M."));
        assert!(QUANTITY_CELL.is_match("12.5 MT"));
        assert!(QUANTITY_CELL.is_match("approx. 300 Mtrs"));
        assert!(!QUANTITY_CELL.is_match("Roof Bolts"));
    }

    #[test]
    fn test_unit_cell() {
        assert!(UNIT_CELL.is_match("Per No."));
        assert!(UNIT_CELL.is_match("Nos"));
        assert!(!UNIT_CELL.is_match("Per No. of bolts supplied"));
    }

    #[test]
    fn test_currency_amount() {
        let caps = CURRENCY_AMOUNT.captures("EMD: Rs. 49,900/-").unwrap();
        assert_eq!(&caps[1], "49,900");
    }

    #[test]
    fn test_phone() {
        assert!(PHONE.is_match("Mob: 9876543210"));
        assert!(PHONE.is_match("Tel: 0651-2360123"));
    }
}
