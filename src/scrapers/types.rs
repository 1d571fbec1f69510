use crate::models::GeoBounds;
use serde::{Deserialize, Serialize};

/// What a fetcher got back from the remote
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub status: u16,
    pub body: String,
}

impl FetchedDocument {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Search parameters for a subject-and-comparables search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// City name
    pub locality: String,
    /// State abbreviation (e.g. TX)
    pub admin_area: String,
    /// Minimum price (USD)
    pub min_price: u64,
    /// Maximum price (USD)
    pub max_price: u64,
    /// Map viewport; a default is substituted when absent
    pub bounds: Option<GeoBounds>,
}

impl SearchParams {
    pub fn new(
        locality: impl Into<String>,
        admin_area: impl Into<String>,
        min_price: u64,
        max_price: u64,
    ) -> Self {
        Self {
            locality: locality.into(),
            admin_area: admin_area.into(),
            min_price,
            max_price,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: GeoBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}
