use super::markup::{sold_date_in, CardScan};
use super::normalize::{parse_area, parse_bathrooms, parse_bedrooms, parse_price};
use super::{element_text, ExtractionStrategy};
use crate::models::{Candidate, ListingStatus};
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

static DOLLAR_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*\d[\d,]*").unwrap());

/// "123 Main St, Austin, TX 78701" (unit and zip optional)
static STREET_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,6}\s+[A-Za-z0-9.'#\- ]+?,\s*[A-Za-z.'\- ]+,\s*[A-Z]{2}(?:\s+\d{5}(?:-\d{4})?)?\b")
        .unwrap()
});

const CARD_SELECTORS: &[&str] = &[
    r#"[itemtype*="SingleFamilyResidence"]"#,
    r#"[itemtype*="Residence"]"#,
    r#"[class~="listing"]"#,
    r#"[class~="property"]"#,
    r#"[class~="home-card"]"#,
    r#"[class*="result-card"]"#,
    "article",
    "li",
];

const PRICE_SELECTORS: &[&str] = &[r#"[itemprop="price"]"#, r#"[class*="price"]"#, r#"[class*="Price"]"#];

const ADDRESS_SELECTORS: &[&str] = &[
    r#"[itemprop="streetAddress"]"#,
    "address",
    r#"[class*="address"]"#,
    r#"[class*="Address"]"#,
    r#"[class*="addr"]"#,
];

const DETAILS_SELECTORS: &[&str] = &[r#"[class*="detail"]"#, r#"[class*="facts"]"#, r#"[class*="stats"]"#];

/// Last resort: broad containers, with regexes over the card text when the
/// selectors come up empty
pub struct PlainTextStrategy {
    scan: CardScan,
}

impl PlainTextStrategy {
    pub fn new() -> Self {
        Self {
            scan: CardScan::new(
                CARD_SELECTORS,
                PRICE_SELECTORS,
                ADDRESS_SELECTORS,
                DETAILS_SELECTORS,
                true,
            ),
        }
    }
}

impl Default for PlainTextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn attempt(&self, document: &Html, status: ListingStatus) -> Vec<Candidate> {
        self.scan
            .cards(document)
            .into_iter()
            .map(|card| {
                let text = element_text(card);

                let price = match self.scan.price(card) {
                    0 => DOLLAR_AMOUNT
                        .find(&text)
                        .map(|m| parse_price(m.as_str()))
                        .unwrap_or(0),
                    p => p,
                };

                let address = self
                    .scan
                    .address(card)
                    .filter(|a| !a.is_empty())
                    .or_else(|| STREET_ADDRESS.find(&text).map(|m| m.as_str().trim().to_string()));

                // Fall back to the whole card when no details block exists
                let details = self.scan.details(card).unwrap_or_else(|| text.clone());

                Candidate {
                    address,
                    bedrooms: parse_bedrooms(&details),
                    bathrooms: parse_bathrooms(&details),
                    area_sqft: parse_area(&details),
                    price,
                    listing_url: self.scan.link(card),
                    sold_date: match status {
                        ListingStatus::Sold => sold_date_in(&text),
                        ListingStatus::Active => None,
                    },
                }
            })
            .collect()
    }
}
