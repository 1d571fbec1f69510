use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Rejection;

/// Placeholder text the markup scans use when a card has no address element.
pub const ADDRESS_UNAVAILABLE: &str = "Address not available";

/// Region kind code for a city-level region
pub const LOCALITY_REGION_KIND: u32 = 6;

/// Listing status a search targets and a record carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Active,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "recently-sold",
        }
    }
}

/// Tentative listing pulled out of a document, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub address: Option<String>,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub area_sqft: u32,
    pub price: u64,
    /// Raw link as found in the source, possibly relative
    pub listing_url: Option<String>,
    pub sold_date: Option<String>,
}

/// Validated property listing
///
/// Fields are private: the only way to obtain a record is through
/// [`PropertyRecord::accept`], so every record in circulation has a positive
/// price, a real address and an absolute listing URL.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropertyRecord {
    address: String,
    bedrooms: u32,
    bathrooms: f64,
    area_sqft: u32,
    price: u64,
    listing_url: String,
    status: ListingStatus,
    sold_date: Option<String>,
}

impl PropertyRecord {
    /// Run the acceptance gate over a candidate.
    ///
    /// Relative links are resolved against `site`. A missing link, or one
    /// that does not resolve to an http(s) page, falls back to the site root.
    pub fn accept(
        candidate: Candidate,
        status: ListingStatus,
        site: &Url,
    ) -> Result<Self, Rejection> {
        if candidate.price == 0 {
            return Err(Rejection::NonPositivePrice);
        }

        let address = candidate
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty() && a != ADDRESS_UNAVAILABLE)
            .ok_or(Rejection::MissingAddress)?;

        let listing_url = candidate
            .listing_url
            .as_deref()
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| site.join(href).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or_else(|| site.clone());

        let sold_date = match status {
            ListingStatus::Sold => candidate.sold_date.filter(|d| !d.trim().is_empty()),
            ListingStatus::Active => None,
        };

        Ok(Self {
            address,
            bedrooms: candidate.bedrooms,
            bathrooms: if candidate.bathrooms.is_finite() && candidate.bathrooms > 0.0 {
                candidate.bathrooms
            } else {
                0.0
            },
            area_sqft: candidate.area_sqft,
            price: candidate.price,
            listing_url: listing_url.to_string(),
            status,
            sold_date,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// 0 means unknown
    pub fn bedrooms(&self) -> u32 {
        self.bedrooms
    }

    /// 0.0 means unknown
    pub fn bathrooms(&self) -> f64 {
        self.bathrooms
    }

    /// 0 means unknown
    pub fn area_sqft(&self) -> u32 {
        self.area_sqft
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub fn sold_date(&self) -> Option<&str> {
        self.sold_date.as_deref()
    }
}

/// Resolved query location for a search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionTarget {
    /// 0 when the page validated but no identifier could be read
    pub region_id: u64,
    pub region_kind: u32,
    /// Locator every search for this region is built on; never empty
    pub base_locator: String,
    pub display_name: String,
    pub locality: String,
    pub admin_area: String,
}

impl RegionTarget {
    pub fn is_degraded(&self) -> bool {
        self.region_id == 0
    }
}

/// Map viewport
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl GeoBounds {
    pub const fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// Bounds are only used when all four edges are given.
    pub fn from_parts(
        west: Option<f64>,
        east: Option<f64>,
        south: Option<f64>,
        north: Option<f64>,
    ) -> Option<Self> {
        Some(Self::new(west?, east?, south?, north?))
    }
}
