pub mod format;
pub mod query;

pub use format::format_record;
pub use query::{bounds_for, search_locator, CONTINENTAL_BOUNDS};

use crate::error::{ResolveError, SearchError};
use crate::extract::RecordExtractor;
use crate::models::{ListingStatus, PropertyRecord, RegionTarget};
use crate::region::RegionResolver;
use crate::scrapers::{DocumentFetcher, FetchSession, SearchParams};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

pub const DEFAULT_COMPARABLES_CAP: usize = 10;

/// Progress of a single search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchState {
    Init,
    ResolvingRegion,
    RegionFailed,
    RegionReady,
    SearchingActive,
    SearchingSold,
    Done,
}

/// Typed result of a completed search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub region: RegionTarget,
    pub subject: Option<PropertyRecord>,
    pub comparables: Vec<PropertyRecord>,
    pub state: SearchState,
    /// Requests issued while searching
    pub fetches: usize,
}

/// Response handed to the outer interface
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResponse {
    pub subject_property: Option<String>,
    pub comparables: Vec<String>,
    pub total_comps_found: usize,
    pub error: Option<String>,
    pub region_info: Option<RegionTarget>,
}

impl SearchResponse {
    fn failed(message: String) -> Self {
        Self {
            subject_property: None,
            comparables: Vec::new(),
            total_comps_found: 0,
            error: Some(message),
            region_info: None,
        }
    }
}

impl From<&SearchOutcome> for SearchResponse {
    fn from(outcome: &SearchOutcome) -> Self {
        let comparables: Vec<String> = outcome
            .comparables
            .iter()
            .map(|record| format_record(record, true))
            .collect();

        Self {
            subject_property: outcome.subject.as_ref().map(|r| format_record(r, false)),
            total_comps_found: comparables.len(),
            comparables,
            error: None,
            region_info: Some(outcome.region.clone()),
        }
    }
}

/// Resolves a region, then runs the active and sold searches against it
pub struct SearchOrchestrator {
    fetcher: Arc<dyn DocumentFetcher>,
    resolver: RegionResolver,
    extractor: RecordExtractor,
    request_delay: Duration,
    comparables_cap: usize,
}

impl SearchOrchestrator {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, site: Url) -> Self {
        Self {
            fetcher,
            resolver: RegionResolver::new(site.clone()),
            extractor: RecordExtractor::new(site),
            request_delay: Duration::ZERO,
            comparables_cap: DEFAULT_COMPARABLES_CAP,
        }
    }

    /// Minimum spacing between the requests of one search
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_comparables_cap(mut self, cap: usize) -> Self {
        self.comparables_cap = cap;
        self
    }

    /// Resolve a region on its own
    pub async fn probe_region(
        &self,
        locality: &str,
        admin_area: &str,
    ) -> Result<RegionTarget, ResolveError> {
        let mut session = FetchSession::new(self.fetcher.as_ref(), self.request_delay);
        self.resolver.resolve(&mut session, locality, admin_area).await
    }

    pub async fn find_subject_and_comparables(
        &self,
        params: &SearchParams,
    ) -> Result<SearchOutcome, SearchError> {
        if params.min_price > params.max_price {
            return Err(SearchError::InvalidPriceRange {
                min: params.min_price,
                max: params.max_price,
            });
        }

        info!(
            "Searching for properties in {}, {} with price range ${} - ${}",
            params.locality, params.admin_area, params.min_price, params.max_price
        );

        let mut state = SearchState::Init;
        let mut session = FetchSession::new(self.fetcher.as_ref(), self.request_delay);

        advance(&mut state, SearchState::ResolvingRegion);
        let region = match self
            .resolver
            .resolve(&mut session, &params.locality, &params.admin_area)
            .await
        {
            Ok(region) => region,
            Err(source) => {
                advance(&mut state, SearchState::RegionFailed);
                warn!("Could not find location info for {}, {}: {}", params.locality, params.admin_area, source);
                return Err(SearchError::RegionNotFound {
                    locality: params.locality.clone(),
                    admin_area: params.admin_area.clone(),
                    source,
                });
            }
        };
        advance(&mut state, SearchState::RegionReady);

        let bounds = bounds_for(&params.locality, params.bounds);

        advance(&mut state, SearchState::SearchingActive);
        let active = self
            .search_status(&mut session, &region, params, bounds, ListingStatus::Active)
            .await?;
        let subject = active.into_iter().next();
        if subject.is_none() {
            warn!("No active listings found in {}, {}", params.locality, params.admin_area);
        }

        advance(&mut state, SearchState::SearchingSold);
        let mut comparables = self
            .search_status(&mut session, &region, params, bounds, ListingStatus::Sold)
            .await?;
        comparables.truncate(self.comparables_cap);
        info!("Found {} comparable properties", comparables.len());

        advance(&mut state, SearchState::Done);

        Ok(SearchOutcome {
            region,
            subject,
            comparables,
            state,
            fetches: session.issued(),
        })
    }

    /// Search and render the outer response; never fails
    pub async fn search(&self, params: &SearchParams) -> SearchResponse {
        match self.find_subject_and_comparables(params).await {
            Ok(outcome) => SearchResponse::from(&outcome),
            Err(e @ SearchError::Internal(_)) => {
                error!("Search failed: {}", e);
                SearchResponse::failed("Search failed due to an internal error".to_string())
            }
            Err(e) => SearchResponse::failed(e.to_string()),
        }
    }

    async fn search_status(
        &self,
        session: &mut FetchSession<'_>,
        region: &RegionTarget,
        params: &SearchParams,
        bounds: crate::models::GeoBounds,
        status: ListingStatus,
    ) -> Result<Vec<PropertyRecord>, SearchError> {
        let locator = search_locator(region, params.min_price, params.max_price, bounds, status)
            .map_err(|e| {
                SearchError::Internal(format!("bad base locator {}: {}", region.base_locator, e))
            })?;

        info!("Searching {}: {}", status.as_str(), locator);

        let Some(body) = session.fetch(locator.as_str()).await else {
            return Ok(Vec::new());
        };

        let records = self.extractor.extract(&body, status);
        info!("Parsed {} properties from search results", records.len());
        Ok(records)
    }
}

fn advance(state: &mut SearchState, next: SearchState) {
    debug!("Search state {:?} -> {:?}", state, next);
    *state = next;
}
