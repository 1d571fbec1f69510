use super::normalize::{number_like, price_like};
use super::ExtractionStrategy;
use crate::models::{Candidate, ListingStatus};
use chrono::DateTime;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Keys whose presence marks a script as worth parsing
const CONTAINER_KEYS: &[&str] = &[
    "listResults",
    "mapResults",
    "searchResults",
    "relaxedResults",
    "searchPageState",
];

const ADDRESS_KEYS: &[&str] = &[
    "address",
    "streetAddress",
    "formattedAddress",
    "fullAddress",
    "addressStreet",
];
const PRICE_KEYS: &[&str] = &["unformattedPrice", "price", "listPrice", "soldPrice"];
const BED_KEYS: &[&str] = &["beds", "bedrooms", "bd", "bedroomCount"];
const BATH_KEYS: &[&str] = &["baths", "bathrooms", "ba", "bathroomCount"];
const AREA_KEYS: &[&str] = &["area", "livingArea", "livingAreaValue", "sqft", "squareFeet"];
const URL_KEYS: &[&str] = &["detailUrl", "listingUrl", "url", "href"];
const ID_KEYS: &[&str] = &["zpid", "listingId"];
const SOLD_DATE_KEYS: &[&str] = &["dateSold", "soldDate", "lastSoldDate"];

/// Nested objects some payloads tuck the listing fields into
const NESTED_KEYS: &[&str] = &["hdpData", "homeInfo"];

const MAX_DEPTH: usize = 32;

/// Finds listing arrays inside JSON payloads embedded in `<script>` tags
pub struct EmbeddedObjectStrategy {
    scripts: Selector,
}

impl EmbeddedObjectStrategy {
    pub fn new() -> Self {
        Self {
            scripts: Selector::parse("script").expect("static selector"),
        }
    }
}

impl Default for EmbeddedObjectStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for EmbeddedObjectStrategy {
    fn name(&self) -> &'static str {
        "embedded-object"
    }

    fn attempt(&self, document: &Html, status: ListingStatus) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let mut seen = HashSet::new();

        for script in document.select(&self.scripts) {
            let body: String = script.text().collect();
            if !CONTAINER_KEYS.iter().any(|key| body.contains(key)) {
                continue;
            }

            for root in json_fragments(&body) {
                let mut listings = Vec::new();
                collect_listings(&root, 0, &mut listings);

                for listing in listings {
                    let candidate = candidate_from(listing, status);
                    let key = (
                        candidate.address.clone(),
                        candidate.price,
                        candidate.listing_url.clone(),
                    );
                    if seen.insert(key) {
                        candidates.push(candidate);
                    }
                }
            }
        }

        candidates
    }
}

/// Parseable JSON values in a script body, in the order they appear.
///
/// A body that is entirely JSON is used as is. Otherwise every balanced
/// object holding a container key is taken (covers one or more
/// `window.x = {...};` assignments or callback arguments), then every array
/// or object following a container key that none of those objects cover.
fn json_fragments(body: &str) -> Vec<Value> {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return vec![value];
    }

    let mut fragments: Vec<(usize, Value)> = Vec::new();
    let mut covered: Vec<(usize, usize)> = Vec::new();

    let mut cursor = 0;
    while let Some(offset) = trimmed[cursor..].find('{') {
        let start = cursor + offset;
        let parsed = balanced_slice(trimmed, start)
            .filter(|slice| CONTAINER_KEYS.iter().any(|key| slice.contains(key)))
            .and_then(|slice| {
                serde_json::from_str::<Value>(slice)
                    .ok()
                    .map(|value| (slice.len(), value))
            });
        match parsed {
            Some((len, value)) => {
                fragments.push((start, value));
                covered.push((start, start + len));
                cursor = start + len;
            }
            None => cursor = start + 1,
        }
    }

    let is_covered = |pos: usize| covered.iter().any(|&(from, to)| from <= pos && pos < to);

    for key in CONTAINER_KEYS {
        let needle = format!("\"{key}\"");
        for (pos, _) in trimmed.match_indices(&needle) {
            if is_covered(pos) {
                continue;
            }
            let rest = &trimmed[pos + needle.len()..];
            let Some(colon) = rest.find(|c: char| !c.is_whitespace()) else {
                continue;
            };
            if !rest[colon..].starts_with(':') {
                continue;
            }
            let value_start = pos + needle.len() + colon + 1;
            let Some(offset) = trimmed[value_start..].find(|c: char| !c.is_whitespace()) else {
                continue;
            };
            match balanced_slice(trimmed, value_start + offset)
                .map(serde_json::from_str::<Value>)
            {
                Some(Ok(value)) => fragments.push((pos, value)),
                Some(Err(e)) => debug!("Skipping malformed {} fragment: {}", key, e),
                None => {}
            }
        }
    }

    fragments.sort_by_key(|(pos, _)| *pos);
    fragments.into_iter().map(|(_, value)| value).collect()
}

/// The `{...}` or `[...]` starting at byte `start`, respecting string literals.
fn balanced_slice(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let (open, close) = match bytes.get(start)? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return text.get(start..=i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_listing_like(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    [ADDRESS_KEYS, PRICE_KEYS, BED_KEYS, ID_KEYS]
        .iter()
        .flat_map(|keys| keys.iter())
        .any(|key| object.contains_key(*key))
}

/// Depth-first walk collecting objects from arrays that hold listings.
/// A listing array is not descended into further.
fn collect_listings<'a>(value: &'a Value, depth: usize, out: &mut Vec<&'a Map<String, Value>>) {
    if depth > MAX_DEPTH {
        return;
    }
    match value {
        Value::Array(items) => {
            if items.iter().any(is_listing_like) {
                out.extend(
                    items
                        .iter()
                        .filter(|item| is_listing_like(item))
                        .filter_map(Value::as_object),
                );
                return;
            }
            for item in items {
                collect_listings(item, depth + 1, out);
            }
        }
        Value::Object(map) => {
            for child in map.values() {
                collect_listings(child, depth + 1, out);
            }
        }
        _ => {}
    }
}

/// First alias present (and not null) wins; nested detail objects are
/// consulted only when the top level has none of the aliases.
fn lookup<'a>(listing: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    let direct = aliases
        .iter()
        .filter_map(|key| listing.get(*key))
        .find(|v| !v.is_null());
    if direct.is_some() {
        return direct;
    }

    NESTED_KEYS
        .iter()
        .filter_map(|key| listing.get(*key).and_then(Value::as_object))
        .find_map(|nested| lookup(nested, aliases))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(parts) => {
            // {"streetAddress": .., "city": .., "state": .., "zipcode": ..}
            let street = ["streetAddress", "street", "line"]
                .iter()
                .find_map(|k| parts.get(*k).and_then(Value::as_str))?;
            let mut pieces = vec![street.trim().to_string()];
            for key in ["city", "state"] {
                if let Some(part) = parts.get(key).and_then(Value::as_str) {
                    pieces.push(part.trim().to_string());
                }
            }
            let mut joined = pieces.join(", ");
            if let Some(zip) = ["zipcode", "zipCode", "postalCode"]
                .iter()
                .find_map(|k| parts.get(*k).and_then(Value::as_str))
            {
                joined = format!("{joined} {zip}");
            }
            Some(joined)
        }
        _ => None,
    }
}

fn sold_date_of(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.format("%Y-%m-%d").to_string()),
        other => text_of(other),
    }
}

fn candidate_from(listing: &Map<String, Value>, status: ListingStatus) -> Candidate {
    let count = |aliases: &[&str]| lookup(listing, aliases).map(number_like).unwrap_or(0.0);

    let listing_url = lookup(listing, URL_KEYS).and_then(text_of).or_else(|| {
        lookup(listing, ID_KEYS)
            .and_then(text_of)
            .map(|id| format!("/homedetails/{id}_zpid/"))
    });

    let sold_date = match status {
        ListingStatus::Sold => lookup(listing, SOLD_DATE_KEYS).and_then(sold_date_of),
        ListingStatus::Active => None,
    };

    Candidate {
        address: lookup(listing, ADDRESS_KEYS).and_then(text_of),
        bedrooms: count(BED_KEYS).floor().min(u32::MAX as f64) as u32,
        bathrooms: count(BATH_KEYS),
        area_sqft: count(AREA_KEYS).round().min(u32::MAX as f64) as u32,
        price: lookup(listing, PRICE_KEYS).map(price_like).unwrap_or(0),
        listing_url,
        sold_date,
    }
}
