//! Normalized records and the row emitter.
//!
//! The emitter is a pure function of its three inputs (the row, the
//! active section context, and the profile), so any row can be unit
//! tested deterministically. A row either yields exactly one complete
//! record or nothing; partial records are never emitted.

use serde::{Deserialize, Serialize};

use crate::extract;
use crate::profile::{
    self, BrandRule, ExtractionProfile, FullNameStyle, RowAcceptance, SectionContext,
};
use crate::sheet::{CellValue, RawRow};

/// Battery production region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    #[serde(rename = "EUROPE")]
    Europe,
    #[serde(rename = "ASIA")]
    Asia,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Europe => write!(f, "EUROPE"),
            Region::Asia => write!(f, "ASIA"),
        }
    }
}

/// Terminal polarity, right-positive being the regional default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    #[default]
    #[serde(rename = "R+")]
    Right,
    #[serde(rename = "L+")]
    Left,
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::Right => write!(f, "R+"),
            Polarity::Left => write!(f, "L+"),
        }
    }
}

/// Electrolyte chemistry; plain lead-acid unless a token says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Chemistry {
    #[default]
    #[serde(rename = "LAB")]
    Lab,
    #[serde(rename = "AGM")]
    Agm,
    #[serde(rename = "GEL")]
    Gel,
    #[serde(rename = "EFB")]
    Efb,
}

impl std::fmt::Display for Chemistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Chemistry::Lab => "LAB",
            Chemistry::Agm => "AGM",
            Chemistry::Gel => "GEL",
            Chemistry::Efb => "EFB",
        };
        write!(f, "{label}")
    }
}

/// One normalized product record, the canonical shape consumed by the
/// persistence layer (which upserts by `full_name`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub brand: String,
    pub name: String,
    pub full_name: String,
    pub capacity: Option<f64>,
    pub price: f64,
    pub start_current: Option<i64>,
    pub region: Region,
    pub polarity: Polarity,
    pub chemistry: Chemistry,
}

/// Classify polarity from row text first, then the section heading.
fn classify_polarity(texts: &[&str], left_tokens: &[String]) -> Polarity {
    for text in texts {
        let upper = text.to_uppercase();
        if left_tokens.iter().any(|t| upper.contains(&t.to_uppercase())) {
            return Polarity::Left;
        }
    }
    Polarity::Right
}

/// Classify chemistry by fixed priority: AGM, then GEL, then EFB.
fn classify_chemistry(texts: &[&str]) -> Chemistry {
    for text in texts {
        let upper = text.to_uppercase();
        if upper.contains("AGM") {
            return Chemistry::Agm;
        }
        if upper.contains("GEL") {
            return Chemistry::Gel;
        }
        if upper.contains("EFB") {
            return Chemistry::Efb;
        }
    }
    Chemistry::Lab
}

fn classify_region(texts: &[&str]) -> Region {
    for text in texts {
        if text.to_uppercase().contains("ASIA") {
            return Region::Asia;
        }
    }
    Region::Europe
}

/// Produce zero or one record from a data row.
///
/// Pure function of its three inputs; all field failures degrade to the
/// documented defaults, and rows that fail the acceptance condition or
/// the brand/full-name invariant are dropped silently.
pub fn emit_record(
    row: &RawRow,
    context: &SectionContext,
    profile: &ExtractionProfile,
) -> Option<NormalizedRecord> {
    let columns = &profile.columns;
    let rules = &profile.rules;

    let description = row.text(columns.description)?;

    // Row acceptance.
    match &profile.acceptance {
        RowAcceptance::CategoryPrefix => {
            if !rules
                .category_prefixes
                .iter()
                .any(|p| description.starts_with(p.as_str()))
            {
                log::debug!("row {}: no category prefix, skipped", row.index);
                return None;
            }
        },
        RowAcceptance::ModelPattern(pattern) => {
            if !pattern.is_match(description) {
                return None;
            }
            for required in [columns.capacity, columns.price].into_iter().flatten() {
                if row.value(required).is_none_or(CellValue::is_empty) {
                    log::debug!("row {}: required column {required} empty", row.index);
                    return None;
                }
            }
        },
        RowAcceptance::NumericPrice => {
            let price_column = columns.price?;
            profile::cell_number(row.value(price_column)?)?;
        },
        RowAcceptance::InlineNumbers { min_numbers } => {
            let words = extract::tokenize(description);
            if extract::numeric_token_count(&words) < *min_numbers {
                return None;
            }
        },
    }

    let stripped = extract::strip_category_prefix(description, &rules.category_prefixes);
    let words = extract::tokenize(stripped);
    if words.is_empty() {
        return None;
    }

    // Price: bound column first, inline threshold scan otherwise.
    let price = match columns.price {
        Some(column) => match row.value(column) {
            Some(CellValue::Number(v)) => *v,
            Some(CellValue::Text(s)) => extract::parse_price(s),
            _ => 0.0,
        },
        None => {
            let min = rules.inline_price_min?;
            extract::inline_price(&words, min)?
        },
    };

    // Capacity: a dedicated column wins over description tokens.
    let (capacity, capacity_token) = match columns.capacity {
        Some(column) => {
            let value = row.value(column).and_then(profile::cell_number);
            (value, None)
        },
        None => match extract::find_capacity(&words, rules) {
            Some(m) => (Some(m.value), Some(m.token)),
            None => (None, None),
        },
    };

    let section = context.label();
    let classify_texts: Vec<&str> = std::iter::once(description).chain(section).collect();

    let brand = match &profile.brand {
        BrandRule::FirstToken => words.first().copied().unwrap_or_default().to_string(),
        BrandRule::FromSection { pattern, default } => section
            .and_then(|heading| {
                pattern
                    .as_ref()?
                    .captures(&heading.to_uppercase())
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
            })
            .unwrap_or_else(|| default.clone()),
        BrandRule::KnownList(known) => section
            .map(str::to_string)
            .or_else(|| {
                let upper = stripped.to_uppercase();
                known
                    .iter()
                    .find(|brand| upper.contains(brand.as_str()))
                    .cloned()
            })
            .unwrap_or_else(|| words[0].to_string()),
    };

    let name = match profile.full_name {
        // Bare-model layouts: the description is the model is the name.
        FullNameStyle::Composed => stripped.to_string(),
        FullNameStyle::BrandName => words[0].to_string(),
        FullNameStyle::Description => extract::brand_and_name(&words, capacity_token).1,
    };

    let polarity = classify_polarity(&classify_texts, &rules.left_polarity_tokens);
    let chemistry = classify_chemistry(&classify_texts);
    let region = classify_region(&classify_texts);

    let mut start_current = extract::find_start_current(&words, capacity, rules);
    if start_current.is_none()
        && let Some(heading) = section
    {
        start_current = extract::section_current(heading);
    }
    if start_current.is_none()
        && let (Some(factor), Some(cap)) = (profile.derive_current_factor, capacity)
    {
        let derived = (cap * f64::from(factor)) as i64;
        log::debug!(
            "row {}: start current derived from capacity ({derived})",
            row.index
        );
        start_current = Some(derived);
    }

    let full_name = match profile.full_name {
        FullNameStyle::Description => description.trim().to_string(),
        FullNameStyle::Composed => {
            let cap_text = capacity
                .map(|c| CellValue::Number(c).display_text())
                .unwrap_or_default();
            format!("{brand} {stripped} {cap_text}Ah {polarity}")
        },
        FullNameStyle::BrandName => format!("{brand} {name}"),
    };

    if brand.trim().is_empty() || full_name.trim().is_empty() {
        log::debug!("row {}: empty brand or full name, dropped", row.index);
        return None;
    }

    Some(NormalizedRecord {
        brand,
        name,
        full_name,
        capacity,
        price,
        start_current,
        region,
        polarity,
        chemistry,
    })
}
