//! Text-to-value converters for listing fields.
//!
//! Every function here is total: unrecognised input yields `0`, which callers
//! read as "unknown".

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static PRICE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d,]+").unwrap());

static BEDROOMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:bedroom|bed|bd|br)s?").unwrap());

static BATHROOMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:bathroom|bath|ba)s?").unwrap());

static AREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*)\s*(?:sq\.?\s*ft|sqft|square\s*feet|sf)").unwrap()
});

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());

/// `"$1,234,000"` -> `1234000`
pub fn parse_price(text: &str) -> u64 {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    PRICE_DIGITS
        .find(&kept)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}

/// `"4 bd, 3 ba"` -> `4`
pub fn parse_bedrooms(text: &str) -> u32 {
    BEDROOMS
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

/// `"2.5 baths"` -> `2.5`
pub fn parse_bathrooms(text: &str) -> f64 {
    BATHROOMS
        .captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// `"2,100 sqft"` -> `2100`
pub fn parse_area(text: &str) -> u32 {
    AREA.captures(text)
        .and_then(|c| c[1].replace(',', "").parse().ok())
        .unwrap_or(0)
}

/// Coerce a loosely typed JSON value into a number.
///
/// Numbers pass through, numeric-looking strings (`"3"`, `"2,100"`, `"2.5 ba"`)
/// are read from their first numeric run, anything else is `0.0`.
pub fn number_like(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => LEADING_NUMBER
            .find(s)
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok()),
        _ => None,
    };

    parsed.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

/// Prices in embedded payloads are either numbers or display strings.
pub fn price_like(value: &Value) -> u64 {
    match value {
        Value::String(s) => parse_price(s),
        other => {
            let n = number_like(other);
            if n >= 1.0 && n < u64::MAX as f64 {
                n.round() as u64
            } else {
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SUMMARY: &str = "4 bd, 3 ba, 2,100 sqft";

    #[test]
    fn price_examples() {
        assert_eq!(parse_price("$1,234,000"), 1_234_000);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("Price upon request"), 0);
        assert_eq!(parse_price("$450,000+"), 450_000);
    }

    #[test]
    fn price_overflow_is_zero() {
        assert_eq!(parse_price("99999999999999999999999999"), 0);
    }

    #[test]
    fn summary_fields() {
        assert_eq!(parse_bedrooms(SUMMARY), 4);
        assert_eq!(parse_bathrooms(SUMMARY), 3.0);
        assert_eq!(parse_area(SUMMARY), 2100);
    }

    #[test]
    fn unit_variants() {
        assert_eq!(parse_bedrooms("3 Bedrooms"), 3);
        assert_eq!(parse_bedrooms("2BR condo"), 2);
        assert_eq!(parse_bathrooms("2.5 baths"), 2.5);
        assert_eq!(parse_bathrooms("1 Bathroom"), 1.0);
        assert_eq!(parse_area("1,850 square feet"), 1850);
        assert_eq!(parse_area("900 sq. ft"), 900);
        assert_eq!(parse_area("1200 SF"), 1200);
    }

    #[test]
    fn concatenated_card_text() {
        let text = "4bds3ba2,100sqft";
        assert_eq!(parse_bedrooms(text), 4);
        assert_eq!(parse_bathrooms(text), 3.0);
        assert_eq!(parse_area(text), 2100);
    }

    #[test]
    fn unrecognised_input_is_zero() {
        for text in ["", "studio", "--", "bd ba sqft", "\u{1F3E0}"] {
            assert_eq!(parse_bedrooms(text), 0);
            assert_eq!(parse_bathrooms(text), 0.0);
            assert_eq!(parse_area(text), 0);
        }
        assert_eq!(parse_bedrooms("99999999999 bd"), 0);
    }

    #[test]
    fn json_coercion() {
        assert_eq!(number_like(&json!(3)), 3.0);
        assert_eq!(number_like(&json!("2.5")), 2.5);
        assert_eq!(number_like(&json!("2,100")), 2100.0);
        assert_eq!(number_like(&json!(null)), 0.0);
        assert_eq!(number_like(&json!({"value": 3})), 0.0);
        assert_eq!(number_like(&json!(-2)), 0.0);

        assert_eq!(price_like(&json!(450000)), 450_000);
        assert_eq!(price_like(&json!("$450,000")), 450_000);
        assert_eq!(price_like(&json!(true)), 0);
    }
}
