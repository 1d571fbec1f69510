use crate::error::FetchError;
use crate::scrapers::types::FetchedDocument;
use async_trait::async_trait;

/// Source of raw documents for the extraction core.
///
/// Implementations own all transport policy (headers, timeouts, sessions);
/// they report whatever status the remote gave and never retry.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `locator`
    async fn fetch(&self, locator: &str) -> Result<FetchedDocument, FetchError>;

    /// Get the name of the fetch backend
    fn source_name(&self) -> &'static str;
}
