use crate::error::FetchError;
use crate::scrapers::traits::DocumentFetcher;
use crate::scrapers::types::FetchedDocument;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Deserialize)]
struct IndexEntry {
    #[serde(default = "default_status")]
    status: u16,
    file: String,
}

fn default_status() -> u16 {
    200
}

/// Serves previously captured pages keyed by locator.
///
/// Unknown locators answer 404. Every request is recorded so callers can see
/// what was asked for and in which order.
#[derive(Default)]
pub struct ReplayFetcher {
    documents: HashMap<String, FetchedDocument>,
    requests: Mutex<Vec<String>>,
}

impl ReplayFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, locator: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.documents.insert(
            locator.into(),
            FetchedDocument {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// Load captures from a directory holding an `index.json` of the form
    /// `{"<locator>": {"status": 200, "file": "page.html"}}`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let index_path = dir.join("index.json");
        let index = std::fs::read_to_string(&index_path)
            .with_context(|| format!("Failed to read {}", index_path.display()))?;
        let entries: HashMap<String, IndexEntry> =
            serde_json::from_str(&index).context("Failed to parse replay index")?;

        let mut fetcher = Self::new();
        for (locator, entry) in entries {
            let path = dir.join(&entry.file);
            let body = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            fetcher = fetcher.with_document(locator, entry.status, body);
        }

        info!("Loaded {} captured pages from {}", fetcher.documents.len(), dir.display());
        Ok(fetcher)
    }

    /// Locators requested so far, oldest first
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentFetcher for ReplayFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedDocument, FetchError> {
        self.requests
            .lock()
            .map_err(|e| FetchError::Replay(e.to_string()))?
            .push(locator.to_string());

        Ok(self
            .documents
            .get(locator)
            .cloned()
            .unwrap_or(FetchedDocument {
                status: 404,
                body: String::new(),
            }))
    }

    fn source_name(&self) -> &'static str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_captures_from_disk() {
        let dir = std::env::temp_dir().join(format!("housing-comps-replay-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("austin.html"), "<html>austin</html>").unwrap();
        std::fs::write(
            dir.join("index.json"),
            r#"{"https://www.zillow.com/austin-tx/": {"file": "austin.html"},
                "https://www.zillow.com/blocked/": {"status": 403, "file": "austin.html"}}"#,
        )
        .unwrap();

        let fetcher = ReplayFetcher::from_dir(&dir).unwrap();
        let page = fetcher.fetch("https://www.zillow.com/austin-tx/").await.unwrap();
        assert!(page.is_success());
        assert_eq!(page.body, "<html>austin</html>");

        let blocked = fetcher.fetch("https://www.zillow.com/blocked/").await.unwrap();
        assert_eq!(blocked.status, 403);

        assert_eq!(fetcher.requests().len(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_index_is_an_error() {
        assert!(ReplayFetcher::from_dir("/nonexistent/housing-comps").is_err());
    }
}
