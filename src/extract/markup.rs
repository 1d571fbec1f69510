use super::normalize::{parse_area, parse_bathrooms, parse_bedrooms, parse_price};
use super::{compile_selectors, element_text, ExtractionStrategy};
use crate::models::{Candidate, ListingStatus, ADDRESS_UNAVAILABLE};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static SOLD_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsold\s*(?:on\s*)?(\d{1,2}/\d{1,2}/\d{2,4})").unwrap()
});

const CARD_SELECTORS: &[&str] = &[
    r#"article[data-test="property-card"]"#,
    ".property-card-data",
    ".list-card-info",
    r#"[data-test="property-card"]"#,
    ".PropertyCard",
    ".result-list-container article",
];

const PRICE_SELECTORS: &[&str] = &[
    r#"[data-test="property-card-price"]"#,
    r#"[class*="StyledPriceLine"]"#,
    ".list-card-price",
    ".price",
];

const ADDRESS_SELECTORS: &[&str] = &[
    r#"[data-test="property-card-addr"]"#,
    r#"[class*="StyledAddress"]"#,
    ".list-card-addr",
    ".address",
];

const DETAILS_SELECTORS: &[&str] = &[
    r#"[data-test="property-card-details"]"#,
    r#"[class*="StyledPropertyDetails"]"#,
    ".list-card-details",
    ".property-details",
];

/// Ordered selector lists for one flavour of card scan
pub(crate) struct CardScan {
    cards: Vec<Selector>,
    price: Vec<Selector>,
    address: Vec<Selector>,
    details: Vec<Selector>,
    link: Selector,
    /// Only keep the innermost matches of a card selector
    innermost: bool,
}

impl CardScan {
    pub(crate) fn new(
        cards: &[&str],
        price: &[&str],
        address: &[&str],
        details: &[&str],
        innermost: bool,
    ) -> Self {
        Self {
            cards: compile_selectors(cards),
            price: compile_selectors(price),
            address: compile_selectors(address),
            details: compile_selectors(details),
            link: Selector::parse("a[href]").expect("static selector"),
            innermost,
        }
    }

    /// Cards for the first card selector that matches anything.
    pub(crate) fn cards<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        for selector in &self.cards {
            let mut cards: Vec<ElementRef<'a>> = document.select(selector).collect();
            if cards.is_empty() {
                continue;
            }

            if self.innermost {
                cards.retain(|card| card.select(selector).next().is_none());
            }

            debug!("Found {} cards using {:?}", cards.len(), selector);
            return cards;
        }
        Vec::new()
    }

    /// First price selector that yields a positive price
    pub(crate) fn price(&self, card: ElementRef<'_>) -> u64 {
        self.price
            .iter()
            .filter_map(|s| card.select(s).next())
            .map(|el| parse_price(&element_text(el)))
            .find(|p| *p > 0)
            .unwrap_or(0)
    }

    /// Text of the first address selector present
    pub(crate) fn address(&self, card: ElementRef<'_>) -> Option<String> {
        first_text(card, &self.address)
    }

    /// Text of the first details selector present
    pub(crate) fn details(&self, card: ElementRef<'_>) -> Option<String> {
        first_text(card, &self.details)
    }

    /// First href on the card that points at a web page
    pub(crate) fn link(&self, card: ElementRef<'_>) -> Option<String> {
        let own = (card.value().name() == "a")
            .then(|| card.value().attr("href"))
            .flatten();
        own.into_iter()
            .chain(card.select(&self.link).filter_map(|a| a.value().attr("href")))
            .map(str::trim)
            .find(|href| is_web_href(href))
            .map(str::to_string)
    }
}

/// Relative paths, or absolute http(s) links. Fragments and
/// `javascript:`/`mailto:`/`tel:` style links are not.
fn is_web_href(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }
    match Url::parse(href) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => true,
    }
}

fn first_text(card: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|s| card.select(s).next())
        .map(element_text)
}

/// "Sold 05/12/2024" style annotations on sold cards
pub(crate) fn sold_date_in(text: &str) -> Option<String> {
    SOLD_DATE.captures(text).map(|c| c[1].to_string())
}

/// Scans listing cards with the most specific selectors known
pub struct StructuredMarkupStrategy {
    scan: CardScan,
}

impl StructuredMarkupStrategy {
    pub fn new() -> Self {
        Self {
            scan: CardScan::new(
                CARD_SELECTORS,
                PRICE_SELECTORS,
                ADDRESS_SELECTORS,
                DETAILS_SELECTORS,
                false,
            ),
        }
    }
}

impl Default for StructuredMarkupStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for StructuredMarkupStrategy {
    fn name(&self) -> &'static str {
        "structured-markup"
    }

    fn attempt(&self, document: &Html, status: ListingStatus) -> Vec<Candidate> {
        self.scan
            .cards(document)
            .into_iter()
            .map(|card| {
                let details = self.scan.details(card).unwrap_or_default();
                let sold_date = match status {
                    ListingStatus::Sold => sold_date_in(&element_text(card)),
                    ListingStatus::Active => None,
                };

                Candidate {
                    address: Some(
                        self.scan
                            .address(card)
                            .unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string()),
                    ),
                    bedrooms: parse_bedrooms(&details),
                    bathrooms: parse_bathrooms(&details),
                    area_sqft: parse_area(&details),
                    price: self.scan.price(card),
                    listing_url: self.scan.link(card),
                    sold_date,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(html: &str, status: ListingStatus) -> Vec<Candidate> {
        StructuredMarkupStrategy::new().attempt(&Html::parse_document(html), status)
    }

    #[test]
    fn reads_current_card_layout() {
        let html = r#"<html><body><div id="grid">
            <article data-test="property-card">
              <a href="/homedetails/4512-Duval-St-Austin-TX-78751/29324861_zpid/">
                <address data-test="property-card-addr">4512 Duval St, Austin, TX 78751</address>
              </a>
              <span data-test="property-card-price">$489,000</span>
              <ul data-test="property-card-details">
                <li><b>3</b> <abbr>bds</abbr></li>
                <li><b>2</b> <abbr>ba</abbr></li>
                <li><b>1,642</b> <abbr>sqft</abbr></li>
              </ul>
            </article>
            <article data-test="property-card">
              <a href="https://www.zillow.com/homedetails/2_zpid/">link</a>
              <address data-test="property-card-addr">77 Lamar Blvd, Austin, TX 78704</address>
              <span data-test="property-card-price">$375,000</span>
              <ul data-test="property-card-details"><li>Studio</li></ul>
            </article>
            </div></body></html>"#;

        let candidates = attempt(html, ListingStatus::Active);
        assert_eq!(candidates.len(), 2);

        let first = &candidates[0];
        assert_eq!(first.address.as_deref(), Some("4512 Duval St, Austin, TX 78751"));
        assert_eq!(first.price, 489_000);
        assert_eq!(first.bedrooms, 3);
        assert_eq!(first.bathrooms, 2.0);
        assert_eq!(first.area_sqft, 1642);
        assert_eq!(
            first.listing_url.as_deref(),
            Some("/homedetails/4512-Duval-St-Austin-TX-78751/29324861_zpid/")
        );

        let second = &candidates[1];
        assert_eq!(second.price, 375_000);
        assert_eq!(second.bedrooms, 0);
        assert_eq!(second.area_sqft, 0);
    }

    #[test]
    fn first_matching_card_selector_wins() {
        // Both layouts present: only article cards are considered.
        let html = r#"<html><body>
            <article data-test="property-card">
              <span data-test="property-card-price">$410,000</span>
              <address data-test="property-card-addr">1 A St, Austin, TX</address>
            </article>
            <div class="list-card-info">
              <div class="list-card-price">$999,000</div>
              <div class="list-card-addr">2 B St, Austin, TX</div>
            </div>
            </body></html>"#;

        let candidates = attempt(html, ListingStatus::Active);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].price, 410_000);
    }

    #[test]
    fn legacy_list_cards() {
        let html = r#"<html><body>
            <div class="list-card-info">
              <a class="list-card-link" href="/homedetails/9_zpid/"></a>
              <div class="list-card-price">$315,500</div>
              <div class="list-card-addr">9 Pine Ct, Round Rock, TX 78664</div>
              <div class="list-card-details">4 bds 2.5 ba 2,250 sqft</div>
            </div>
            </body></html>"#;

        let candidates = attempt(html, ListingStatus::Active);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].bathrooms, 2.5);
        assert_eq!(candidates[0].area_sqft, 2250);
        assert_eq!(candidates[0].listing_url.as_deref(), Some("/homedetails/9_zpid/"));
    }

    #[test]
    fn missing_address_uses_placeholder() {
        let html = r#"<html><body><div class="PropertyCard"><span class="price">$200,000</span></div></body></html>"#;
        let candidates = attempt(html, ListingStatus::Active);
        assert_eq!(candidates[0].address.as_deref(), Some(ADDRESS_UNAVAILABLE));
    }

    #[test]
    fn sold_cards_carry_their_date() {
        let html = r#"<html><body>
            <article data-test="property-card">
              <span>Sold 05/12/2024</span>
              <span data-test="property-card-price">$402,000</span>
              <address data-test="property-card-addr">5 Cedar Ln, Austin, TX</address>
            </article>
            </body></html>"#;

        let sold = attempt(html, ListingStatus::Sold);
        assert_eq!(sold[0].sold_date.as_deref(), Some("05/12/2024"));

        let active = attempt(html, ListingStatus::Active);
        assert_eq!(active[0].sold_date, None);
    }

    #[test]
    fn skips_links_that_are_not_web_pages() {
        let html = r#"<html><body>
            <article data-test="property-card">
              <a href="javascript:void(0)">Save</a>
              <a href="tel:+15125550100">Call</a>
              <a href="/homedetails/31_zpid/">Details</a>
              <address data-test="property-card-addr">31 Rio Grande St, Austin, TX 78701</address>
              <span data-test="property-card-price">$450,000</span>
            </article>
            <article data-test="property-card">
              <a href="mailto:agent@example.com">Email</a>
              <address data-test="property-card-addr">9 Pecan St, Austin, TX 78701</address>
              <span data-test="property-card-price">$310,000</span>
            </article>
            </body></html>"#;

        let candidates = attempt(html, ListingStatus::Active);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].listing_url.as_deref(), Some("/homedetails/31_zpid/"));
        assert_eq!(candidates[1].listing_url, None);
    }

    #[test]
    fn web_hrefs() {
        assert!(is_web_href("/homedetails/1_zpid/"));
        assert!(is_web_href("homedetails/1_zpid/"));
        assert!(is_web_href("https://www.zillow.com/homedetails/1_zpid/"));
        assert!(!is_web_href("#top"));
        assert!(!is_web_href("javascript:void(0)"));
        assert!(!is_web_href("mailto:agent@example.com"));
        assert!(!is_web_href(""));
    }

    #[test]
    fn no_cards_no_candidates() {
        assert!(attempt("<html><body><p>nothing</p></body></html>", ListingStatus::Active).is_empty());
    }
}
