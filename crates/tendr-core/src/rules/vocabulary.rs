//! Keyword vocabularies used by the noise filters and the comparison
//! detector. Held in a value so callers can substitute smaller lists.

/// Phrases marking legal boilerplate, disclaimers and ATC text rather than
/// bill-of-quantity lines. English, Devanagari and transliterated Hindi.
const DISCLAIMER_PHRASES: &[&str] = &[
    "disclaimer",
    "अस्वीकरण",
    "thank you",
    "धन्यवाद",
    "dhanyavaad",
    "dhanyawad",
    "terms and conditions",
    "terms & conditions",
    "general terms",
    "special terms",
    "additional terms",
    "buyer added",
    "bid specific",
    "atc document",
    "buyer specific atc",
    "नियम और शर्तें",
    "शर्तें",
    "niyam",
    "shartein",
    "sharten",
    "kripya",
    "कृपया",
    "dhyan den",
    "ध्यान दें",
    "kreta",
    "क्रेता",
    "vikreta",
    "विक्रेता",
    "बोली",
    "the bidder shall",
    "bidders shall",
    "seller shall",
    "the seller",
    "the buyer",
    "shall be liable",
    "shall not be",
    "force majeure",
    "arbitration",
    "jurisdiction",
    "indemnif",
    "gem portal",
    "gem availability",
    "gem marketplace",
    "government e marketplace",
    "government e-marketplace",
    "page no",
    "page of",
    "signature of",
    "digitally signed",
    "this is a system generated",
    "for any query",
    "helpdesk",
    "past performance",
    "bidder turnover",
    "oem turnover",
    "mse exemption",
    "startup exemption",
    "document required from seller",
    "evaluation method",
    "reverse auction",
    "purchase preference",
    "make in india",
];

/// Words that mark a line as describing real work or supply.
const WORK_KEYWORDS: &[&str] = &[
    "construction",
    "supply",
    "installation",
    "civil",
    "mechanical",
    "electrical",
    "equipment",
    "material",
    "repair",
    "maintenance",
    "fabrication",
    "excavation",
    "painting",
    "plumbing",
    "laying",
    "providing",
    "fixing",
    "erection",
    "commissioning",
    "transportation",
    "cement",
    "steel",
    "concrete",
    "pipe",
    "cable",
    "bolt",
    "grouting",
    "road",
    "building",
    "drilling",
    "pump",
    "motor",
    "machine",
    "spare",
    "service",
    "work",
];

/// Phrases of tender document listings (file indices, not work).
const DOCUMENT_LISTING_PHRASES: &[&str] = &[
    "notice inviting",
    "tender documents",
    "tender document",
    "nit document",
    "bid document",
    "corrigendum document",
    "download",
    "file size",
];

/// Misspellings that two independently written bids rarely share.
const COMMON_TYPOS: &[&str] = &[
    "recieve",
    "recieved",
    "seperate",
    "occured",
    "accomodate",
    "guarentee",
    "garantee",
    "maintainance",
    "maintenence",
    "commited",
    "untill",
    "acheive",
    "definately",
    "enviroment",
    "goverment",
    "neccessary",
    "sucessful",
    "responsiblity",
    "adress",
    "reciept",
    "tommorow",
    "wich",
    "existance",
    "independant",
    "occurence",
];

/// Injectable keyword lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub disclaimer_phrases: Vec<String>,
    pub work_keywords: Vec<String>,
    pub document_listing_phrases: Vec<String>,
    pub typos: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            disclaimer_phrases: to_owned(DISCLAIMER_PHRASES),
            work_keywords: to_owned(WORK_KEYWORDS),
            document_listing_phrases: to_owned(DOCUMENT_LISTING_PHRASES),
            typos: to_owned(COMMON_TYPOS),
        }
    }
}

impl Vocabulary {
    /// An empty vocabulary; combine with the `with_*` setters.
    pub fn empty() -> Self {
        Self {
            disclaimer_phrases: Vec::new(),
            work_keywords: Vec::new(),
            document_listing_phrases: Vec::new(),
            typos: Vec::new(),
        }
    }

    pub fn with_disclaimers(mut self, phrases: &[&str]) -> Self {
        self.disclaimer_phrases = to_owned(phrases);
        self
    }

    pub fn with_work_keywords(mut self, keywords: &[&str]) -> Self {
        self.work_keywords = to_owned(keywords);
        self
    }

    pub fn with_listing_phrases(mut self, phrases: &[&str]) -> Self {
        self.document_listing_phrases = to_owned(phrases);
        self
    }

    pub fn with_typos(mut self, typos: &[&str]) -> Self {
        self.typos = to_owned(typos);
        self
    }

    /// First disclaimer phrase contained in `text`.
    pub fn disclaimer_in(&self, text: &str) -> Option<&str> {
        find_phrase(&self.disclaimer_phrases, &text.to_lowercase())
    }

    pub fn listing_phrase_in(&self, text: &str) -> Option<&str> {
        find_phrase(&self.document_listing_phrases, &text.to_lowercase())
    }

    pub fn has_work_keyword(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.work_keywords
            .iter()
            .any(|k| lower.contains(k.to_lowercase().as_str()))
    }

    /// Typos occurring as whole words in `text`, in vocabulary order.
    pub fn typos_in(&self, text: &str) -> Vec<&str> {
        let words: std::collections::HashSet<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect();
        self.typos
            .iter()
            .filter(|t| words.contains(&t.to_lowercase()))
            .map(String::as_str)
            .collect()
    }
}

fn find_phrase<'a>(phrases: &'a [String], lower: &str) -> Option<&'a str> {
    phrases
        .iter()
        .find(|p| lower.contains(p.to_lowercase().as_str()))
        .map(String::as_str)
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
