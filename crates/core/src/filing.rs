use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilingError;

/// Identity of one document inside one filing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    /// Issuer identifier (CIK), without leading zeros stripped or added.
    pub cik: String,
    /// Accession number in dashed form (`0000320193-23-000106`).
    pub accession_number: String,
    /// Document file name inside the filing; `None` means the full `.txt` submission.
    pub document_name: Option<String>,
}

impl DocumentKey {
    /// Build a key. An 18-digit compact accession is rewritten to its dashed
    /// form so both spellings name the same document.
    pub fn new(
        cik: impl Into<String>,
        accession_number: impl Into<String>,
        document_name: Option<String>,
    ) -> Self {
        Self {
            cik: cik.into().trim().to_string(),
            accession_number: canonical_accession(accession_number.into().trim()),
            document_name: document_name
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }

    /// Accession number with dashes removed, as used in archive paths.
    pub fn accession_compact(&self) -> String {
        self.accession_number.replace('-', "")
    }

    /// Resolved document file name (`{accession}.txt` for the full submission).
    pub fn document_file(&self) -> String {
        match &self.document_name {
            Some(name) => name.clone(),
            None => format!("{}.txt", self.accession_number),
        }
    }
}

fn canonical_accession(accession: &str) -> String {
    if accession.len() == 18 && accession.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &accession[..10], &accession[10..12], &accession[12..])
    } else {
        accession.to_string()
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.cik, self.accession_number, self.document_file())
    }
}

/// Whether normalization ran the structural pass or fell back to
/// permissive tag stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Fidelity {
    #[default]
    Full,
    Degraded,
}

impl Fidelity {
    pub fn is_degraded(self) -> bool {
        self == Fidelity::Degraded
    }
}

// ── Section taxonomy ──────────────────────────────────────────

/// Closed set of annual-report items a section can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionType {
    #[serde(rename = "item_1")]
    Item1,
    #[serde(rename = "item_1a")]
    Item1A,
    #[serde(rename = "item_1b")]
    Item1B,
    #[serde(rename = "item_1c")]
    Item1C,
    #[serde(rename = "item_2")]
    Item2,
    #[serde(rename = "item_3")]
    Item3,
    #[serde(rename = "item_4")]
    Item4,
    #[serde(rename = "item_5")]
    Item5,
    #[serde(rename = "item_6")]
    Item6,
    #[serde(rename = "item_7")]
    Item7,
    #[serde(rename = "item_7a")]
    Item7A,
    #[serde(rename = "item_8")]
    Item8,
    #[serde(rename = "item_9")]
    Item9,
    #[serde(rename = "item_9a")]
    Item9A,
    #[serde(rename = "item_9b")]
    Item9B,
    #[serde(rename = "item_9c")]
    Item9C,
    #[serde(rename = "item_10")]
    Item10,
    #[serde(rename = "item_11")]
    Item11,
    #[serde(rename = "item_12")]
    Item12,
    #[serde(rename = "item_13")]
    Item13,
    #[serde(rename = "item_14")]
    Item14,
    #[serde(rename = "item_15")]
    Item15,
    #[serde(rename = "item_16")]
    Item16,
}

struct ItemInfo {
    id: &'static str,
    slug: &'static str,
    label: &'static str,
    title: &'static str,
    /// Lowercase phrases, one of which must follow the header.
    keywords: &'static [&'static str],
}

const fn item(
    id: &'static str,
    slug: &'static str,
    label: &'static str,
    title: &'static str,
    keywords: &'static [&'static str],
) -> ItemInfo {
    ItemInfo { id, slug, label, title, keywords }
}

impl SectionType {
    pub const ALL: [SectionType; 23] = [
        SectionType::Item1,
        SectionType::Item1A,
        SectionType::Item1B,
        SectionType::Item1C,
        SectionType::Item2,
        SectionType::Item3,
        SectionType::Item4,
        SectionType::Item5,
        SectionType::Item6,
        SectionType::Item7,
        SectionType::Item7A,
        SectionType::Item8,
        SectionType::Item9,
        SectionType::Item9A,
        SectionType::Item9B,
        SectionType::Item9C,
        SectionType::Item10,
        SectionType::Item11,
        SectionType::Item12,
        SectionType::Item13,
        SectionType::Item14,
        SectionType::Item15,
        SectionType::Item16,
    ];

    fn info(self) -> ItemInfo {
        match self {
            SectionType::Item1 => item("item_1", "business", "Item 1", "Business", &["business"]),
            SectionType::Item1A => item(
                "item_1a",
                "risk_factors",
                "Item 1A",
                "Risk Factors",
                &["risk factors"],
            ),
            SectionType::Item1B => item(
                "item_1b",
                "unresolved_staff_comments",
                "Item 1B",
                "Unresolved Staff Comments",
                &["unresolved staff"],
            ),
            SectionType::Item1C => item(
                "item_1c",
                "cybersecurity",
                "Item 1C",
                "Cybersecurity",
                &["cybersecurity"],
            ),
            SectionType::Item2 => {
                item("item_2", "properties", "Item 2", "Properties", &["properties"])
            }
            SectionType::Item3 => item(
                "item_3",
                "legal_proceedings",
                "Item 3",
                "Legal Proceedings",
                &["legal proceedings"],
            ),
            SectionType::Item4 => item(
                "item_4",
                "mine_safety_disclosures",
                "Item 4",
                "Mine Safety Disclosures",
                &["mine safety", "submission of matters", "reserved"],
            ),
            SectionType::Item5 => item(
                "item_5",
                "market_for_equity",
                "Item 5",
                "Market for Registrant's Common Equity, Related Stockholder Matters and Issuer Purchases of Equity Securities",
                &["market for"],
            ),
            SectionType::Item6 => item(
                "item_6",
                "selected_financial_data",
                "Item 6",
                "Selected Financial Data",
                &["selected financial", "reserved"],
            ),
            SectionType::Item7 => item(
                "item_7",
                "mda",
                "Item 7",
                "Management's Discussion and Analysis of Financial Condition and Results of Operations",
                &["management"],
            ),
            SectionType::Item7A => item(
                "item_7a",
                "market_risk",
                "Item 7A",
                "Quantitative and Qualitative Disclosures About Market Risk",
                &["quantitative and qualitative"],
            ),
            SectionType::Item8 => item(
                "item_8",
                "financial_statements",
                "Item 8",
                "Financial Statements and Supplementary Data",
                &["financial statements"],
            ),
            SectionType::Item9 => item(
                "item_9",
                "accountant_disagreements",
                "Item 9",
                "Changes in and Disagreements with Accountants on Accounting and Financial Disclosure",
                &["disagreements"],
            ),
            SectionType::Item9A => item(
                "item_9a",
                "controls_and_procedures",
                "Item 9A",
                "Controls and Procedures",
                &["controls and procedures"],
            ),
            SectionType::Item9B => item(
                "item_9b",
                "other_information",
                "Item 9B",
                "Other Information",
                &["other information"],
            ),
            SectionType::Item9C => item(
                "item_9c",
                "foreign_jurisdiction_inspections",
                "Item 9C",
                "Disclosure Regarding Foreign Jurisdictions that Prevent Inspections",
                &["foreign jurisdiction"],
            ),
            SectionType::Item10 => item(
                "item_10",
                "directors_and_governance",
                "Item 10",
                "Directors, Executive Officers and Corporate Governance",
                &["directors"],
            ),
            SectionType::Item11 => item(
                "item_11",
                "executive_compensation",
                "Item 11",
                "Executive Compensation",
                &["executive compensation"],
            ),
            SectionType::Item12 => item(
                "item_12",
                "security_ownership",
                "Item 12",
                "Security Ownership of Certain Beneficial Owners and Management and Related Stockholder Matters",
                &["security ownership"],
            ),
            SectionType::Item13 => item(
                "item_13",
                "related_transactions",
                "Item 13",
                "Certain Relationships and Related Transactions, and Director Independence",
                &["certain relationships"],
            ),
            SectionType::Item14 => item(
                "item_14",
                "accountant_fees",
                "Item 14",
                "Principal Accountant Fees and Services",
                &["principal account"],
            ),
            SectionType::Item15 => item(
                "item_15",
                "exhibits",
                "Item 15",
                "Exhibits and Financial Statement Schedules",
                &["exhibits"],
            ),
            SectionType::Item16 => item(
                "item_16",
                "form_summary",
                "Item 16",
                "Form 10-K Summary",
                &["summary"],
            ),
        }
    }

    /// Wire identifier, e.g. `item_1a`.
    pub fn as_str(self) -> &'static str {
        self.info().id
    }

    /// Descriptive tag, e.g. `risk_factors`.
    pub fn slug(self) -> &'static str {
        self.info().slug
    }

    pub fn title(self) -> &'static str {
        self.info().title
    }

    /// Canonical heading, e.g. `Item 1A. Risk Factors`.
    pub fn display_name(self) -> String {
        let info = self.info();
        format!("{}. {}", info.label, info.title)
    }

    pub fn keywords(self) -> &'static [&'static str] {
        self.info().keywords
    }

    /// Position in filing order; items appear in a report in this order.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Resolve a header label such as `1`, `1a`, `7A`.
    pub fn from_item_label(number: u32, letter: Option<char>) -> Option<Self> {
        let letter = letter.map(|c| c.to_ascii_lowercase());
        let t = match (number, letter) {
            (1, None) => SectionType::Item1,
            (1, Some('a')) => SectionType::Item1A,
            (1, Some('b')) => SectionType::Item1B,
            (1, Some('c')) => SectionType::Item1C,
            (2, None) => SectionType::Item2,
            (3, None) => SectionType::Item3,
            (4, None) => SectionType::Item4,
            (5, None) => SectionType::Item5,
            (6, None) => SectionType::Item6,
            (7, None) => SectionType::Item7,
            (7, Some('a')) => SectionType::Item7A,
            (8, None) => SectionType::Item8,
            (9, None) => SectionType::Item9,
            (9, Some('a')) => SectionType::Item9A,
            (9, Some('b')) => SectionType::Item9B,
            (9, Some('c')) => SectionType::Item9C,
            (10, None) => SectionType::Item10,
            (11, None) => SectionType::Item11,
            (12, None) => SectionType::Item12,
            (13, None) => SectionType::Item13,
            (14, None) => SectionType::Item14,
            (15, None) => SectionType::Item15,
            (16, None) => SectionType::Item16,
            _ => return None,
        };
        Some(t)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = FilingError;

    /// Accepts the wire id (`item_1a`), the slug (`risk_factors`), or a bare label (`1a`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        let bare = needle.strip_prefix("item_").unwrap_or(&needle);
        SectionType::ALL
            .into_iter()
            .find(|t| {
                t.as_str() == needle
                    || t.slug() == needle
                    || t.as_str().trim_start_matches("item_") == bare
            })
            .ok_or_else(|| FilingError::NotFound(format!("unknown section type '{s}'")))
    }
}
