use crate::scrapers::traits::DocumentFetcher;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The fetches belonging to one search.
///
/// Spaces consecutive requests by at least `min_interval` and folds every
/// failure (transport error or non-success status) into "no document".
/// Dropping the session mid-search simply means no further requests go out.
pub struct FetchSession<'a> {
    fetcher: &'a dyn DocumentFetcher,
    min_interval: Duration,
    last_issued: Option<Instant>,
    issued: usize,
}

impl<'a> FetchSession<'a> {
    pub fn new(fetcher: &'a dyn DocumentFetcher, min_interval: Duration) -> Self {
        Self {
            fetcher,
            min_interval,
            last_issued: None,
            issued: 0,
        }
    }

    /// Number of requests issued so far
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Body of the document at `locator`, or `None` on any failure
    pub async fn fetch(&mut self, locator: &str) -> Option<String> {
        self.pace().await;
        self.issued += 1;

        debug!("Fetching {} via {}", locator, self.fetcher.source_name());

        match self.fetcher.fetch(locator).await {
            Ok(document) if document.is_success() => {
                debug!("Downloaded {} bytes from {}", document.body.len(), locator);
                Some(document.body)
            }
            Ok(document) => {
                warn!("{} returned status: {}", locator, document.status);
                None
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", locator, e);
                None
            }
        }
    }

    async fn pace(&mut self) {
        if let Some(last) = self.last_issued {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_issued = Some(Instant::now());
    }
}
