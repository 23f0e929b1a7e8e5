//! Built-in extraction profiles for the known suppliers.
//!
//! One closed enumeration maps a source identifier to its profile value.
//! Adding a supplier means adding a variant and a profile constructor
//! here; nothing in the engine dispatches on source names.

use regex::Regex;

use crate::ooxml::worksheet::SheetSelector;
use crate::profile::{
    BrandRule, ColumnBindings, ExtractionProfile, FieldRules, FullNameStyle, RowAcceptance,
    SectionCapture, SectionRule,
};

/// Battery brands that appear as section headings in line-oriented lists.
const KNOWN_BRANDS: &[&str] = &[
    "VARTA", "BOSCH", "EXIDE", "FIAMM", "CENTRA", "BANNER", "WESTA", "ISTA", "MUTLU", "TOPLA",
    "OPTIMA",
];

/// Known price-list sources with built-in profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Avto Apteka: `.xlsx`, descriptions prefixed with "Акумулятор",
    /// price in hryvnia text.
    AvtoApteka,
    /// FOP Ruslan: `.xls`, battery section terminated by a category
    /// marker row, numeric wholesale price column.
    FopRuslan,
    /// A-Mega Auto: `.xlsx`, grouped under "BATTERIES ..." headings that
    /// carry chemistry/region/polarity for the rows below.
    AMegaAuto,
    /// Avto Alians: legacy `.doc`, plain lines grouped under brand
    /// headings, several prices per line.
    AvtoAlians,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::AvtoApteka,
        Source::FopRuslan,
        Source::AMegaAuto,
        Source::AvtoAlians,
    ];

    /// Supplier display name, as the upstream system labels uploads.
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::AvtoApteka => "Авто Аптека",
            Source::FopRuslan => "ФОП Руслан",
            Source::AMegaAuto => "А-мегаАвто",
            Source::AvtoAlians => "АвтоАльянс",
        }
    }

    /// Look a source up by display name or identifier, case-insensitively.
    pub fn from_name(name: &str) -> Option<Source> {
        let normalized = name.trim().to_lowercase();
        Source::ALL.into_iter().find(|source| {
            source.display_name().to_lowercase() == normalized
                || source.identifier() == normalized
        })
    }

    /// Stable ASCII identifier for configs and logs.
    pub fn identifier(&self) -> &'static str {
        match self {
            Source::AvtoApteka => "avto-apteka",
            Source::FopRuslan => "fop-ruslan",
            Source::AMegaAuto => "a-mega-auto",
            Source::AvtoAlians => "avto-alians",
        }
    }

    /// Build the extraction profile for this source.
    pub fn profile(&self) -> ExtractionProfile {
        match self {
            Source::AvtoApteka => avto_apteka(),
            Source::FopRuslan => fop_ruslan(),
            Source::AMegaAuto => a_mega_auto(),
            Source::AvtoAlians => avto_alians(),
        }
    }
}

fn avto_apteka() -> ExtractionProfile {
    ExtractionProfile {
        name: Source::AvtoApteka.display_name().to_string(),
        start_row: 11,
        sheet: SheetSelector::First,
        columns: ColumnBindings {
            identifier: None,
            description: 2, // B
            price: Some(3), // C
            capacity: None,
        },
        section: None,
        acceptance: RowAcceptance::CategoryPrefix,
        rules: FieldRules::default(),
        brand: BrandRule::FirstToken,
        full_name: FullNameStyle::Description,
        derive_current_factor: None,
    }
}

fn fop_ruslan() -> ExtractionProfile {
    ExtractionProfile {
        name: Source::FopRuslan.display_name().to_string(),
        start_row: 8,
        sheet: SheetSelector::First,
        columns: ColumnBindings {
            identifier: None,
            description: 2, // B
            price: Some(4), // D
            capacity: None,
        },
        // Batteries run from the top of the sheet; the next product
        // category closes the section.
        section: Some(SectionRule {
            label_column: 2,
            keywords: vec![],
            capture: SectionCapture::CellText,
            end_markers: vec!["02. Автономні джерела живлення".to_string()],
        }),
        acceptance: RowAcceptance::NumericPrice,
        rules: FieldRules::default(),
        brand: BrandRule::FirstToken,
        full_name: FullNameStyle::Description,
        derive_current_factor: None,
    }
}

fn a_mega_auto() -> ExtractionProfile {
    ExtractionProfile {
        name: Source::AMegaAuto.display_name().to_string(),
        start_row: 8,
        sheet: SheetSelector::First,
        columns: ColumnBindings {
            identifier: Some(1), // A, empty on heading rows
            description: 2,      // B, bare model code
            price: Some(6),      // F, wholesale
            capacity: Some(4),   // D
        },
        section: Some(SectionRule {
            label_column: 2,
            keywords: vec!["BATTERIES".to_string()],
            capture: SectionCapture::CellText,
            end_markers: vec![],
        }),
        acceptance: RowAcceptance::ModelPattern(
            Regex::new(r"\d+[A-Z]+\d+").expect("model pattern"),
        ),
        rules: FieldRules::default(),
        brand: BrandRule::FromSection {
            pattern: Some(Regex::new(r"(HIGH\s+\w+|A-MEGA)").expect("brand pattern")),
            default: "A-MEGA".to_string(),
        },
        full_name: FullNameStyle::Composed,
        derive_current_factor: Some(5),
    }
}

fn avto_alians() -> ExtractionProfile {
    let mut rules = FieldRules::default();
    rules.inline_price_min = Some(100.0);
    // Lines write capacity as a bare "60А"/"60A" as often as "60Ah".
    rules.capacity_patterns.push(
        Regex::new(r"(?i)^[^\d]*(\d+)\s*[aа]h?$").expect("alians capacity pattern"),
    );

    ExtractionProfile {
        name: Source::AvtoAlians.display_name().to_string(),
        start_row: 1,
        sheet: SheetSelector::First,
        columns: ColumnBindings {
            identifier: None,
            description: 1,
            price: None, // prices are inline in the line
            capacity: None,
        },
        section: Some(SectionRule {
            label_column: 1,
            keywords: KNOWN_BRANDS.iter().map(|b| b.to_string()).collect(),
            capture: SectionCapture::MatchedKeyword,
            end_markers: vec![],
        }),
        acceptance: RowAcceptance::InlineNumbers { min_numbers: 3 },
        rules,
        brand: BrandRule::KnownList(KNOWN_BRANDS.iter().map(|b| b.to_string()).collect()),
        full_name: FullNameStyle::BrandName,
        derive_current_factor: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_display_name_and_identifier() {
        assert_eq!(Source::from_name("Авто Аптека"), Some(Source::AvtoApteka));
        assert_eq!(Source::from_name("fop-ruslan"), Some(Source::FopRuslan));
        assert_eq!(Source::from_name("А-МЕГААВТО"), Some(Source::AMegaAuto));
        assert_eq!(Source::from_name("unknown supplier"), None);
    }

    #[test]
    fn every_source_builds_a_profile() {
        for source in Source::ALL {
            let profile = source.profile();
            assert_eq!(profile.name, source.display_name());
            assert!(profile.columns.description >= 1);
        }
    }

    #[test]
    fn a_mega_profile_allows_derived_current() {
        let profile = Source::AMegaAuto.profile();
        assert_eq!(profile.derive_current_factor, Some(5));
        assert!(profile.section.is_some());
    }
}
