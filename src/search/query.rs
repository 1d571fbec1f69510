use crate::models::{GeoBounds, ListingStatus, RegionTarget};
use serde_json::{json, Value};
use url::Url;

/// Viewport used when neither the caller nor the table below has bounds
pub const CONTINENTAL_BOUNDS: GeoBounds = GeoBounds::new(-125.0, -66.9, 24.4, 49.4);

/// Recently sold means sold within this many days
const SOLD_WITHIN_DAYS: &str = "90";

/// Default viewports keyed by lower-cased locality name
static DEFAULT_BOUNDS: &[(&str, GeoBounds)] = &[
    ("austin", GeoBounds::new(-97.94, -97.56, 30.10, 30.52)),
    ("dallas", GeoBounds::new(-97.00, -96.55, 32.61, 33.02)),
    ("houston", GeoBounds::new(-95.79, -95.01, 29.52, 30.11)),
    ("san antonio", GeoBounds::new(-98.81, -98.22, 29.22, 29.73)),
    ("phoenix", GeoBounds::new(-112.32, -111.93, 33.29, 33.92)),
    ("denver", GeoBounds::new(-105.11, -104.60, 39.61, 39.91)),
    ("los angeles", GeoBounds::new(-118.67, -118.16, 33.70, 34.34)),
    ("san francisco", GeoBounds::new(-122.52, -122.36, 37.70, 37.83)),
    ("seattle", GeoBounds::new(-122.44, -122.24, 47.49, 47.73)),
    ("chicago", GeoBounds::new(-87.94, -87.52, 41.64, 42.02)),
    ("miami", GeoBounds::new(-80.32, -80.14, 25.70, 25.86)),
    ("new york", GeoBounds::new(-74.26, -73.70, 40.49, 40.92)),
];

/// Caller bounds, else the locality default, else the continental box
pub fn bounds_for(locality: &str, supplied: Option<GeoBounds>) -> GeoBounds {
    if let Some(bounds) = supplied {
        return bounds;
    }
    let key = locality.trim().to_lowercase();
    DEFAULT_BOUNDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, bounds)| *bounds)
        .unwrap_or(CONTINENTAL_BOUNDS)
}

fn status_filter(status: ListingStatus) -> Value {
    match status {
        ListingStatus::Active => json!({
            "fsba": { "value": true },
            "fsbo": { "value": true },
            "rs": { "value": false },
        }),
        ListingStatus::Sold => json!({
            "rs": { "value": true },
            "fsba": { "value": false },
            "fsbo": { "value": false },
            "nc": { "value": false },
            "cmsn": { "value": false },
            "auc": { "value": false },
            "fore": { "value": false },
            "doz": { "value": SOLD_WITHIN_DAYS },
        }),
    }
}

/// The `searchQueryState` document the listing pages read their filters from
pub fn search_query_state(
    target: &RegionTarget,
    min_price: u64,
    max_price: u64,
    bounds: GeoBounds,
    status: ListingStatus,
) -> Value {
    let mut filter_state = status_filter(status);
    filter_state["price"] = json!({ "min": min_price, "max": max_price });

    let mut state = json!({
        "pagination": {},
        "usersSearchTerm": target.display_name,
        "mapBounds": bounds,
        "isMapVisible": true,
        "isListVisible": true,
        "filterState": filter_state,
    });

    if !target.is_degraded() {
        state["regionSelection"] = json!([
            { "regionId": target.region_id, "regionType": target.region_kind }
        ]);
    }

    state
}

/// Base locator plus the query for one status search
pub fn search_locator(
    target: &RegionTarget,
    min_price: u64,
    max_price: u64,
    bounds: GeoBounds,
    status: ListingStatus,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&target.base_locator)?;
    let state = search_query_state(target, min_price, max_price, bounds, status);
    url.query_pairs_mut()
        .append_pair("searchQueryState", &state.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(region_id: u64) -> RegionTarget {
        RegionTarget {
            region_id,
            region_kind: 6,
            base_locator: "https://www.zillow.com/austin-tx/".to_string(),
            display_name: "Austin, TX".to_string(),
            locality: "Austin".to_string(),
            admin_area: "TX".to_string(),
        }
    }

    fn decoded_state(url: &Url) -> Value {
        let (_, raw) = url
            .query_pairs()
            .find(|(k, _)| k == "searchQueryState")
            .unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn bounds_fallbacks() {
        let supplied = GeoBounds::new(-1.0, 1.0, -1.0, 1.0);
        assert_eq!(bounds_for("Austin", Some(supplied)), supplied);
        assert_eq!(bounds_for("  AUSTIN ", None), DEFAULT_BOUNDS[0].1);
        assert_eq!(bounds_for("Marfa", None), CONTINENTAL_BOUNDS);
    }

    #[test]
    fn sold_locator_carries_filters() {
        let bounds = bounds_for("Austin", None);
        let url = search_locator(&target(10221), 300_000, 500_000, bounds, ListingStatus::Sold).unwrap();

        assert!(url.as_str().starts_with("https://www.zillow.com/austin-tx/?searchQueryState="));
        let state = decoded_state(&url);
        assert_eq!(state["filterState"]["price"]["min"], 300_000);
        assert_eq!(state["filterState"]["price"]["max"], 500_000);
        assert_eq!(state["filterState"]["rs"]["value"], true);
        assert_eq!(state["filterState"]["doz"]["value"], "90");
        assert_eq!(state["mapBounds"]["west"], -97.94);
        assert_eq!(state["regionSelection"][0]["regionId"], 10221);
    }

    #[test]
    fn degraded_target_omits_region_selection() {
        let url = search_locator(&target(0), 1, 2, CONTINENTAL_BOUNDS, ListingStatus::Active).unwrap();
        let state = decoded_state(&url);
        assert!(state.get("regionSelection").is_none());
        assert_eq!(state["filterState"]["rs"]["value"], false);
    }
}
