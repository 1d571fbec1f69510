//! Finds a subject listing and recently sold comparables for a city by
//! scraping a real-estate listing site.

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod region;
pub mod scrapers;
pub mod search;

pub use config::{Config, FetcherKind};
pub use error::{FetchError, Rejection, ResolveError, SearchError};
pub use extract::RecordExtractor;
pub use models::{GeoBounds, ListingStatus, PropertyRecord, RegionTarget};
pub use region::RegionResolver;
pub use scrapers::{DocumentFetcher, SearchParams};
pub use search::{SearchOrchestrator, SearchOutcome, SearchResponse, SearchState};
