//! Heuristic field extraction from free-text product descriptions.
//!
//! Supplier price lists describe a battery in one concatenated string,
//! mixing Ukrainian and English notation: `"Акумулятор BOSCH S5 012 60Ah
//! 540A R+ AGM"`. Each field has an ordered list of pattern rules,
//! evaluated first-match-wins over the whitespace tokens of the
//! description; a field with no matching rule takes its documented
//! default. The pattern tables live in [`FieldRules`](crate::profile::FieldRules)
//! and are tunable per source.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::profile::FieldRules;

pub mod record;

/// A matched capacity: the value and which token carried it, so the same
/// number is never reused as a start current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityMatch {
    pub value: f64,
    pub token: usize,
}

/// Strip a recognized category prefix ("Акумулятор", "Battery") and
/// surrounding whitespace.
pub fn strip_category_prefix<'a>(text: &'a str, prefixes: &[String]) -> &'a str {
    let trimmed = text.trim();
    for prefix in prefixes {
        if let Some(rest) = trimmed.strip_prefix(prefix.as_str()) {
            return rest.trim();
        }
    }
    trimmed
}

/// Split a description into whitespace tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Find the capacity among the tokens.
///
/// Two passes: a compact form where digits and unit share one token
/// ("60Ah", "60Аг"), then a split form where a bare number is followed by
/// a unit token ("60" "Ah").
pub fn find_capacity(words: &[&str], rules: &FieldRules) -> Option<CapacityMatch> {
    for (index, word) in words.iter().enumerate() {
        for pattern in &rules.capacity_patterns {
            if let Some(captures) = pattern.captures(word)
                && let Some(value) = captures.get(1).and_then(|m| parse_number(m.as_str()))
            {
                return Some(CapacityMatch {
                    value,
                    token: index,
                });
            }
        }
    }

    for (index, word) in words.iter().enumerate() {
        if index + 1 >= words.len() {
            break;
        }
        if let Some(value) = parse_number(word) {
            let next = words[index + 1].to_lowercase();
            if rules
                .capacity_unit_suffixes
                .iter()
                .any(|suffix| next.starts_with(suffix.as_str()))
            {
                return Some(CapacityMatch {
                    value,
                    token: index,
                });
            }
        }
    }

    None
}

/// Find the start current among the tokens.
///
/// `EN`/`CCA`-marked numbers win; after that, a bare-ampere token
/// ("540A") is accepted only when its value differs from the capacity:
/// the capacity's own `"60Ah"` also ends in an ampere letter and must not
/// be consumed twice.
pub fn find_start_current(
    words: &[&str],
    capacity: Option<f64>,
    rules: &FieldRules,
) -> Option<i64> {
    for word in words {
        for pattern in &rules.current_patterns {
            if let Some(captures) = pattern.captures(word)
                && let Some(value) = captures.get(1).and_then(|m| parse_number(m.as_str()))
            {
                return Some(value as i64);
            }
        }
    }

    for (index, word) in words.iter().enumerate() {
        if index + 1 >= words.len() {
            break;
        }
        if let Some(value) = parse_number(word) {
            let next = words[index + 1].to_lowercase();
            if rules
                .current_unit_suffixes
                .iter()
                .any(|suffix| next.starts_with(suffix.as_str()))
            {
                return Some(value as i64);
            }
        }
    }

    if let Some(pattern) = &rules.bare_ampere {
        for word in words {
            if let Some(captures) = pattern.captures(word)
                && let Some(value) = captures.get(1).and_then(|m| parse_number(m.as_str()))
            {
                let same_as_capacity =
                    capacity.is_some_and(|cap| (cap as i64) == (value as i64));
                if !same_as_capacity {
                    return Some(value as i64);
                }
            }
        }
    }

    None
}

/// Ampere figure inside a section heading ("... 540 A ..."), used when a
/// data row itself carries no current token.
pub fn section_current(heading: &str) -> Option<i64> {
    static SECTION_AMPERE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\d+)\s*[AaАа]\b").expect("section ampere pattern"));
    SECTION_AMPERE
        .captures(heading)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_number(m.as_str()))
        .map(|v| v as i64)
}

/// Split tokens into brand and name around the capacity token.
///
/// The first token is the brand; tokens strictly between it and the
/// capacity form the name. An empty span falls back to the brand itself.
pub fn brand_and_name(words: &[&str], capacity_token: Option<usize>) -> (String, String) {
    let brand = words.first().copied().unwrap_or_default().to_string();
    let name = match capacity_token {
        Some(token) if token > 1 => words[1..token].join(" "),
        _ => String::new(),
    };
    let name = if name.trim().is_empty() {
        brand.clone()
    } else {
        name
    };
    (brand, name)
}

/// Numbers embedded in a line that clear the price threshold; the lowest
/// one is the wholesale price.
///
/// Only bare numeric tokens qualify: `"540А"` is an ampere figure, not a
/// price, and unit-suffixed tokens are left to the capacity/current rules.
pub fn inline_price(words: &[&str], min: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for word in words {
        if let Some(value) = parse_number(word)
            && value > min
        {
            best = Some(match best {
                Some(current) => current.min(value),
                None => value,
            });
        }
    }
    best
}

/// Count tokens that read as plain numbers.
pub fn numeric_token_count(words: &[&str]) -> usize {
    words.iter().filter(|w| parse_number(w).is_some()).count()
}

/// Normalize and parse a price string.
///
/// Strips currency suffixes and thousands separators, converts the
/// decimal comma, and yields `0` for anything that still fails to parse;
/// a row is never aborted over an unreadable price.
pub fn parse_price(text: &str) -> f64 {
    let mut cleaned = text.trim().to_lowercase();
    for suffix in ["грн.", "грн", "uah", "₴"] {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            cleaned = stripped.trim_end().to_string();
            break;
        }
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\'')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match parse_number(&cleaned) {
        Some(value) => value,
        None => {
            log::debug!("price '{text}' did not parse, defaulting to 0");
            0.0
        },
    }
}

/// Strict full-token number parse with decimal-comma tolerance.
///
/// `"inf"`/`"nan"` spellings are rejected: a price or capacity is always
/// a finite figure.
pub fn parse_number(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    fast_float2::parse::<f64, _>(normalized.as_bytes())
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FieldRules {
        FieldRules::default()
    }

    #[test]
    fn capacity_compact_forms() {
        let words = tokenize("BOSCH S5 012 60Ah 540A R+ AGM");
        let m = find_capacity(&words, &rules()).unwrap();
        assert_eq!(m.value, 60.0);
        assert_eq!(m.token, 3);

        for text in ["VARTA 60Аг", "VARTA 60Ач", "VARTA 60аh", "VARTA 60AH"] {
            let words = tokenize(text);
            assert_eq!(
                find_capacity(&words, &rules()).map(|m| m.value),
                Some(60.0),
                "failed on {text}"
            );
        }
    }

    #[test]
    fn capacity_split_form() {
        let words = tokenize("ISTA Standard 77 Ah 720 EN");
        let m = find_capacity(&words, &rules()).unwrap();
        assert_eq!(m.value, 77.0);
        assert_eq!(m.token, 2);
    }

    #[test]
    fn capacity_absent_stays_unset() {
        let words = tokenize("VARTA Blue Dynamic");
        assert_eq!(find_capacity(&words, &rules()), None);
    }

    #[test]
    fn current_en_and_cca() {
        let words = tokenize("ISTA 77Ah 720EN");
        assert_eq!(find_start_current(&words, Some(77.0), &rules()), Some(720));

        let words = tokenize("OPTIMA RedTop 50Ah 815 CCA");
        assert_eq!(find_start_current(&words, Some(50.0), &rules()), Some(815));
    }

    #[test]
    fn bare_ampere_skips_the_capacity_number() {
        let words = tokenize("BOSCH S5 012 60Ah 540A R+ AGM");
        assert_eq!(find_start_current(&words, Some(60.0), &rules()), Some(540));

        // Only the capacity's own number is present: no current.
        let words = tokenize("WESTA 6CT-60 60Ah");
        assert_eq!(find_start_current(&words, Some(60.0), &rules()), None);
    }

    #[test]
    fn section_heading_current() {
        assert_eq!(section_current("HIGH ENERGY BATTERIES 540 A L+"), Some(540));
        assert_eq!(section_current("AGM BATTERIES ASIA"), None);
    }

    #[test]
    fn brand_name_split() {
        let words = tokenize("BOSCH S5 012 60Ah 540A R+ AGM");
        let (brand, name) = brand_and_name(&words, Some(3));
        assert_eq!(brand, "BOSCH");
        assert_eq!(name, "S5 012");
    }

    #[test]
    fn empty_name_span_falls_back_to_brand() {
        let words = tokenize("TOPLA 60Ah");
        let (brand, name) = brand_and_name(&words, Some(1));
        assert_eq!(brand, "TOPLA");
        assert_eq!(name, "TOPLA");

        let (brand, name) = brand_and_name(&tokenize("TOPLA Energy"), None);
        assert_eq!(brand, "TOPLA");
        assert_eq!(name, "TOPLA");
    }

    #[test]
    fn category_prefix_stripping() {
        let prefixes = rules().category_prefixes;
        assert_eq!(
            strip_category_prefix("Акумулятор VARTA Blue 60Ah", &prefixes),
            "VARTA Blue 60Ah"
        );
        assert_eq!(
            strip_category_prefix("  VARTA Blue 60Ah ", &prefixes),
            "VARTA Blue 60Ah"
        );
    }

    #[test]
    fn price_normalization() {
        assert_eq!(parse_price("1 234,50 грн"), 1234.50);
        assert_eq!(parse_price("4500"), 4500.0);
        assert_eq!(parse_price("4 500,00"), 4500.0);
        assert_eq!(parse_price("3480 грн."), 3480.0);
        assert_eq!(parse_price("n/a"), 0.0);
        assert_eq!(parse_price(""), 0.0);
    }

    #[test]
    fn inline_price_takes_the_lowest_qualifying_number() {
        let words = tokenize("6CT-60 540А 2770 2850 2900");
        assert_eq!(inline_price(&words, 100.0), Some(2770.0));
        assert_eq!(numeric_token_count(&words), 3);

        let words = tokenize("no numbers here");
        assert_eq!(inline_price(&words, 100.0), None);
    }
}
