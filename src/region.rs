//! Turns a (city, state) pair into a [`RegionTarget`].
//!
//! A handful of locator shapes are probed in order. A page only counts if it
//! carries enough listing-page markers; the region identifier is then read
//! from page JSON, from `"regionId"` fragments in the raw text, or as a last
//! resort from a numeric value bound to a region-like key. A validated page
//! without an
//! identifier still yields a usable target with `region_id == 0`.

use crate::error::ResolveError;
use crate::models::{RegionTarget, LOCALITY_REGION_KIND};
use crate::scrapers::FetchSession;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

/// Markers expected on a genuine listings page (matched case-insensitively)
const PAGE_INDICATORS: &[&str] = &[
    "zillow",
    "homes for sale",
    "real estate",
    "listresults",
    "searchpagestate",
    "regionid",
    "zpid",
    "property-card",
];

pub const MIN_INDICATOR_MATCHES: usize = 2;

static REGION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""regionId"\s*:\s*"?(\d+)"#).unwrap());

static REGION_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""regionType"\s*:\s*"?(\d+)"#).unwrap());

/// A 5-7 digit value bound to a region-like key, e.g. `rid=10221` or
/// `"region":10221`. Prices, zip codes and areas never match.
static BARE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[^a-z0-9_])"?(?:rid|region|region_?id)"?\s*[=:]\s*"?(\d{5,7})\b"#)
        .unwrap()
});

const BARE_IDENTIFIER_RANGE: std::ops::RangeInclusive<u64> = 10_000..=9_999_999;

const MAX_DEPTH: usize = 24;

/// Region details read from a validated page
#[derive(Debug, Default, PartialEq)]
struct RegionHint {
    region_id: u64,
    region_kind: Option<u32>,
    display_name: Option<String>,
    admin_area: Option<String>,
}

pub struct RegionResolver {
    site: Url,
    min_indicator_matches: usize,
}

impl RegionResolver {
    pub fn new(site: Url) -> Self {
        Self {
            site,
            min_indicator_matches: MIN_INDICATOR_MATCHES,
        }
    }

    /// Locators to probe, most specific first, without duplicates
    pub fn candidate_locators(&self, locality: &str, admin_area: &str) -> Vec<String> {
        let city = locality.trim().to_lowercase();
        let state = admin_area
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        let words: Vec<&str> = city.split_whitespace().collect();

        let paths = [
            format!("{}-{}/", words.join("-"), state),
            format!("homes/{},-{}_rb/", words.join("_"), state),
            format!("{}-{}/", words.concat(), state),
        ];

        let mut locators: Vec<String> = Vec::new();
        for path in paths {
            let Ok(url) = self.site.join(&path) else {
                warn!("Skipping unusable locator path {}", path);
                continue;
            };
            let url = url.to_string();
            if !locators.contains(&url) {
                locators.push(url);
            }
        }
        locators
    }

    /// Number of distinct listing-page markers in a document
    pub fn indicator_matches(document: &str) -> usize {
        let lowered = document.to_lowercase();
        PAGE_INDICATORS
            .iter()
            .filter(|marker| lowered.contains(*marker))
            .count()
    }

    pub async fn resolve(
        &self,
        session: &mut FetchSession<'_>,
        locality: &str,
        admin_area: &str,
    ) -> Result<RegionTarget, ResolveError> {
        if locality.trim().is_empty() {
            return Err(ResolveError::EmptyLocality);
        }

        let locators = self.candidate_locators(locality, admin_area);
        let mut degraded: Option<String> = None;

        for locator in &locators {
            info!("Trying URL: {}", locator);

            let Some(body) = session.fetch(locator).await else {
                continue;
            };

            let matches = Self::indicator_matches(&body);
            if matches < self.min_indicator_matches {
                debug!("{} does not look like a listings page ({} markers)", locator, matches);
                continue;
            }

            match extract_region_hint(&body) {
                Some(hint) => {
                    info!("Found region {} for {}, {}", hint.region_id, locality, admin_area);
                    return Ok(self.target(hint, locator, locality, admin_area));
                }
                None => {
                    debug!("No region identifier on {}", locator);
                    degraded.get_or_insert_with(|| locator.clone());
                }
            }
        }

        if let Some(locator) = degraded {
            warn!(
                "Using {} for {}, {} without a region identifier",
                locator, locality, admin_area
            );
            return Ok(self.target(RegionHint::default(), &locator, locality, admin_area));
        }

        Err(ResolveError::NoValidCandidate {
            locality: locality.to_string(),
            admin_area: admin_area.to_string(),
            attempted: locators.len(),
        })
    }

    fn target(&self, hint: RegionHint, locator: &str, locality: &str, admin_area: &str) -> RegionTarget {
        let locality = locality.trim().to_string();
        let admin_area = hint
            .admin_area
            .unwrap_or_else(|| admin_area.trim().to_uppercase());
        let display_name = hint
            .display_name
            .unwrap_or_else(|| format!("{}, {}", title_case(&locality), admin_area));

        RegionTarget {
            region_id: hint.region_id,
            region_kind: hint.region_kind.unwrap_or(LOCALITY_REGION_KIND),
            base_locator: locator.to_string(),
            display_name,
            locality,
            admin_area,
        }
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn extract_region_hint(document: &str) -> Option<RegionHint> {
    region_from_json(document)
        .or_else(|| region_from_pattern(document))
        .or_else(|| region_from_bare_number(document))
}

/// Region fields from JSON script payloads
fn region_from_json(document: &str) -> Option<RegionHint> {
    let html = Html::parse_document(document);
    let selector = Selector::parse(r#"script[type="application/json"], script#__NEXT_DATA__"#).ok()?;

    html.select(&selector).find_map(|script| {
        let text: String = script.text().collect();
        let data: Value = serde_json::from_str(text.trim()).ok()?;

        let holder = [
            "/props/pageProps",
            "/props/pageProps/searchPageState/regionState/regionInfo/0",
        ]
        .iter()
        .filter_map(|pointer| data.pointer(pointer))
        .find(|v| v.get("regionId").is_some())
        .or_else(|| find_object_with(&data, "regionId", 0))?;

        let region_id = holder.get("regionId").and_then(as_id).filter(|id| *id > 0)?;

        Some(RegionHint {
            region_id,
            region_kind: holder
                .get("regionType")
                .and_then(as_id)
                .and_then(|k| u32::try_from(k).ok()),
            display_name: holder
                .get("regionName")
                .and_then(Value::as_str)
                .map(str::to_string)
                .filter(|s| !s.is_empty()),
            admin_area: holder
                .get("stateAbbreviation")
                .and_then(Value::as_str)
                .map(str::to_string)
                .filter(|s| !s.is_empty()),
        })
    })
}

fn find_object_with<'a>(value: &'a Value, key: &str, depth: usize) -> Option<&'a Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) if map.contains_key(key) => Some(value),
        Value::Object(map) => map.values().find_map(|v| find_object_with(v, key, depth + 1)),
        Value::Array(items) => items.iter().find_map(|v| find_object_with(v, key, depth + 1)),
        _ => None,
    }
}

fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `"regionId":10221` anywhere in the raw text
fn region_from_pattern(document: &str) -> Option<RegionHint> {
    let region_id = REGION_ID
        .captures_iter(document)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .find(|id| *id > 0)?;

    Some(RegionHint {
        region_id,
        region_kind: REGION_TYPE
            .captures(document)
            .and_then(|c| c[1].parse().ok()),
        ..RegionHint::default()
    })
}

fn region_from_bare_number(document: &str) -> Option<RegionHint> {
    let region_id = BARE_IDENTIFIER
        .captures_iter(document)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .find(|id| BARE_IDENTIFIER_RANGE.contains(id))?;

    Some(RegionHint {
        region_id,
        ..RegionHint::default()
    })
}
