pub mod embedded;
pub mod markup;
pub mod normalize;
pub mod text;

pub use embedded::EmbeddedObjectStrategy;
pub use markup::StructuredMarkupStrategy;
pub use text::PlainTextStrategy;

use crate::models::{Candidate, ListingStatus, PropertyRecord};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

/// One way of finding listing candidates in a parsed document
pub trait ExtractionStrategy: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Candidates in document order; never fails, an empty list means
    /// "nothing recognisable here"
    fn attempt(&self, document: &Html, status: ListingStatus) -> Vec<Candidate>;
}

/// Runs the strategy cascade over a document and validates what it finds
pub struct RecordExtractor {
    site: Url,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl RecordExtractor {
    /// Default cascade: structured markup, embedded JSON, plain-text heuristics
    pub fn new(site: Url) -> Self {
        Self::with_strategies(
            site,
            vec![
                Box::new(StructuredMarkupStrategy::new()),
                Box::new(EmbeddedObjectStrategy::new()),
                Box::new(PlainTextStrategy::new()),
            ],
        )
    }

    pub fn with_strategies(site: Url, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { site, strategies }
    }

    pub fn site(&self) -> &Url {
        &self.site
    }

    /// Extract validated records from a raw document.
    ///
    /// The first strategy that produces at least one accepted record wins;
    /// later strategies are not consulted.
    pub fn extract(&self, document: &str, status: ListingStatus) -> Vec<PropertyRecord> {
        let html = Html::parse_document(document);

        for strategy in &self.strategies {
            let candidates = strategy.attempt(&html, status);
            let found = candidates.len();

            let records: Vec<PropertyRecord> = candidates
                .into_iter()
                .filter_map(|candidate| {
                    PropertyRecord::accept(candidate, status, &self.site)
                        .map_err(|reason| {
                            debug!("{} dropped a candidate: {}", strategy.name(), reason);
                        })
                        .ok()
                })
                .collect();

            if records.is_empty() {
                debug!(
                    "{} produced no usable records ({} candidates)",
                    strategy.name(),
                    found
                );
                continue;
            }

            info!(
                "{} extracted {} {} records ({} candidates)",
                strategy.name(),
                records.len(),
                status.as_str(),
                found
            );
            return records;
        }

        debug!("No strategy recognised the document");
        Vec::new()
    }
}

/// Compile a static selector list, skipping anything the parser rejects.
pub(crate) fn compile_selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|pattern| match Selector::parse(pattern) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!("Ignoring selector {:?}: {}", pattern, e);
                None
            }
        })
        .collect()
}

/// Visible text of an element, whitespace-separated per text node.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
