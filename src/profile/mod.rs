//! Declarative extraction profiles.
//!
//! A profile describes one supplier's document layout: where data starts,
//! which columns matter, how section headings are recognized, and which
//! pattern rules derive typed fields from free text. Profiles are values
//! supplied by the caller per source; the engine owns no source-specific
//! code paths, only the interpretation of these rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ooxml::worksheet::SheetSelector;
use crate::sheet::{CellValue, RawRow};

pub mod sources;

/// Per-source configuration for turning a converted table into records.
#[derive(Debug, Clone)]
pub struct ExtractionProfile {
    /// Display name of the source, used in logs only.
    pub name: String,
    /// 1-based document row where data may begin; earlier rows are
    /// headers/preamble and are never considered.
    pub start_row: u32,
    /// Which worksheet to scan when the input is a workbook.
    pub sheet: SheetSelector,
    pub columns: ColumnBindings,
    /// Section-heading recognition; `None` for flat lists.
    pub section: Option<SectionRule>,
    pub acceptance: RowAcceptance,
    pub rules: FieldRules,
    pub brand: BrandRule,
    pub full_name: FullNameStyle,
    /// When set, a row with a known capacity but no recognizable start
    /// current gets `capacity * factor` as its start current. Off unless
    /// the source explicitly calls for it.
    pub derive_current_factor: Option<u32>,
}

impl ExtractionProfile {
    /// A permissive baseline: data from row 1, description in column A,
    /// default heuristics. Useful as a starting point for custom sources.
    pub fn generic(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start_row: 1,
            sheet: SheetSelector::First,
            columns: ColumnBindings::default(),
            section: None,
            acceptance: RowAcceptance::CategoryPrefix,
            rules: FieldRules::default(),
            brand: BrandRule::FirstToken,
            full_name: FullNameStyle::Description,
            derive_current_factor: None,
        }
    }
}

/// 1-based column bindings (A = 1).
#[derive(Debug, Clone)]
pub struct ColumnBindings {
    /// Column that is empty on section-heading rows but filled on data
    /// rows; `None` when the layout has no such discriminator.
    pub identifier: Option<u32>,
    /// Column holding the free-text product description.
    pub description: u32,
    /// Column holding the price; `None` when prices are inline in the
    /// description line.
    pub price: Option<u32>,
    /// Column holding the capacity, for layouts that break it out instead
    /// of embedding it in the description.
    pub capacity: Option<u32>,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self {
            identifier: None,
            description: 1,
            price: None,
            capacity: None,
        }
    }
}

/// What a recognized section heading contributes to the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionCapture {
    /// The whole heading cell text (e.g. `"AGM BATTERIES ASIA L+"`).
    CellText,
    /// Only the keyword that matched (e.g. a brand name).
    MatchedKeyword,
}

/// Recognition rule for section-heading rows.
#[derive(Debug, Clone)]
pub struct SectionRule {
    /// Column whose text is examined for keywords.
    pub label_column: u32,
    /// Case-insensitive substrings that mark a heading row.
    pub keywords: Vec<String>,
    pub capture: SectionCapture,
    /// Rows containing any of these markers end the product section
    /// entirely; later rows are ignored.
    pub end_markers: Vec<String>,
}

impl SectionRule {
    /// Check a row for a section heading, returning the new label.
    ///
    /// A heading row has an empty identifier column (when one is bound)
    /// and a label cell containing a recognized keyword.
    pub fn match_header(&self, row: &RawRow, columns: &ColumnBindings) -> Option<String> {
        if let Some(id_col) = columns.identifier
            && row.value(id_col).is_some_and(|v| !v.is_empty())
        {
            return None;
        }
        let label = row.text(self.label_column)?;
        let upper = label.to_uppercase();
        for keyword in &self.keywords {
            if upper.contains(&keyword.to_uppercase()) {
                let captured = match self.capture {
                    SectionCapture::CellText => label.to_string(),
                    SectionCapture::MatchedKeyword => keyword.clone(),
                };
                return Some(captured);
            }
        }
        None
    }

    /// Whether any cell of the row carries a section-end marker.
    pub fn is_end_marker(&self, row: &RawRow) -> bool {
        if self.end_markers.is_empty() {
            return false;
        }
        row.cells().iter().any(|cell| {
            cell.value
                .as_text()
                .is_some_and(|text| self.end_markers.iter().any(|m| text.contains(m.as_str())))
        })
    }
}

/// Row-acceptance condition: which rows qualify as data rows at all.
#[derive(Debug, Clone)]
pub enum RowAcceptance {
    /// The description must start with one of the recognized category
    /// prefixes (`FieldRules::category_prefixes`).
    CategoryPrefix,
    /// The description must match a model pattern, and every bound
    /// capacity/price column must hold a value.
    ModelPattern(Regex),
    /// The price cell must hold a number; heading and commentary rows
    /// have text there and are skipped.
    NumericPrice,
    /// The line must carry at least this many numeric tokens, one of
    /// which clears `FieldRules::inline_price_min`. For single-column
    /// text sources.
    InlineNumbers { min_numbers: usize },
}

/// How the record's brand is derived.
#[derive(Debug, Clone)]
pub enum BrandRule {
    /// First whitespace token of the stripped description.
    FirstToken,
    /// Regex over the active section heading, with a fixed fallback.
    FromSection {
        pattern: Option<Regex>,
        default: String,
    },
    /// Known brand list: the active section heading wins, then a known
    /// brand mentioned in the line, then the line's first token.
    KnownList(Vec<String>),
}

/// How the record's full name is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullNameStyle {
    /// The trimmed description itself.
    Description,
    /// `"{brand} {model} {capacity}Ah {polarity}"`, for layouts where the
    /// description is a bare model code.
    Composed,
    /// `"{brand} {name}"`, for line-oriented sources.
    BrandName,
}

/// Tunable pattern rules for field derivation.
///
/// These are configuration, not logic: the defaults reflect the corpus of
/// supplier descriptions seen so far, and a source with unusual notation
/// overrides the relevant list instead of forking extraction code.
#[derive(Debug, Clone)]
pub struct FieldRules {
    /// Category prefixes stripped from the description before the
    /// brand/name split ("Акумулятор VARTA ..." → brand VARTA).
    pub category_prefixes: Vec<String>,
    /// Token-level patterns whose first capture is the capacity value.
    pub capacity_patterns: Vec<Regex>,
    /// Unit suffixes for the split-token form ("60" "Ah").
    pub capacity_unit_suffixes: Vec<String>,
    /// Token-level patterns whose first capture is the start current.
    pub current_patterns: Vec<Regex>,
    /// Unit suffixes for the split-token form ("540" "EN").
    pub current_unit_suffixes: Vec<String>,
    /// Bare-ampere fallback ("540A"); only accepted when the value
    /// differs from the capacity already consumed.
    pub bare_ampere: Option<Regex>,
    /// Tokens marking left polarity; absence means the R+ default.
    pub left_polarity_tokens: Vec<String>,
    /// Minimum value for an inline number to count as a price.
    pub inline_price_min: Option<f64>,
}

static CAPACITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // 60Ah, 60 Ah, 60Аг, 60Ач, and the mixed-script 60Аh suppliers
        // manage to type.
        Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:ah|аh|аг|ач)").expect("capacity pattern"),
    ]
});

static CURRENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(\d+)\s*en").expect("current EN pattern"),
        Regex::new(r"(?i)(\d+)\s*cca").expect("current CCA pattern"),
    ]
});

static BARE_AMPERE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)[aа]$").expect("bare ampere pattern"));

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            category_prefixes: vec!["Акумулятор".to_string(), "Battery".to_string()],
            capacity_patterns: CAPACITY_PATTERNS.clone(),
            capacity_unit_suffixes: vec![
                "ah".to_string(),
                "аh".to_string(),
                "аг".to_string(),
                "ач".to_string(),
            ],
            current_patterns: CURRENT_PATTERNS.clone(),
            current_unit_suffixes: vec!["en".to_string(), "cca".to_string()],
            bare_ampere: Some(BARE_AMPERE.clone()),
            left_polarity_tokens: vec!["L+".to_string(), "(+/-)".to_string()],
            inline_price_min: None,
        }
    }
}

/// Scan-local state carrying the current section heading forward.
///
/// Created at scan start, updated row by row, discarded at scan end.
/// Never persisted: section inheritance is why row processing is strictly
/// sequential within one document.
#[derive(Debug, Default)]
pub struct SectionContext {
    label: Option<String>,
    ended: bool,
}

impl SectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current section heading, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// A heading row redefines the context for all subsequent rows.
    pub fn set_label(&mut self, label: String) {
        log::debug!("section context now '{label}'");
        self.label = Some(label);
    }

    /// An end marker closes the product section; later rows are ignored.
    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

/// Extract a cell's numeric content, accepting numeric text.
///
/// Used where a layout promises a number (capacity/price columns) but the
/// producer stored it as a string cell.
pub fn cell_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(v) => Some(*v),
        CellValue::Text(s) => fast_float2::parse(s.trim().replace(',', ".")).ok(),
        CellValue::Empty => None,
    }
}
