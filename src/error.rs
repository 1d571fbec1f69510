use thiserror::Error;

/// Failure to obtain a document at all (as opposed to a non-success status)
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("replay error: {0}")]
    Replay(String),
}

/// Why a candidate did not become a [`crate::models::PropertyRecord`]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Rejection {
    #[error("price missing or zero")]
    NonPositivePrice,
    #[error("address missing")]
    MissingAddress,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("locality name is empty")]
    EmptyLocality,
    #[error("no listings page found for {locality}, {admin_area} ({attempted} locators tried)")]
    NoValidCandidate {
        locality: String,
        admin_area: String,
        attempted: usize,
    },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("minimum price {min} exceeds maximum price {max}")]
    InvalidPriceRange { min: u64, max: u64 },
    #[error("Could not find location information for {locality}, {admin_area}")]
    RegionNotFound {
        locality: String,
        admin_area: String,
        #[source]
        source: ResolveError,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0} must be set when the replay fetcher is selected")]
    Missing(&'static str),
}
