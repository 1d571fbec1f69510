use crate::error::FetchError;
use crate::scrapers::traits::DocumentFetcher;
use crate::scrapers::types::FetchedDocument;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Dismisses the consent banner if one is showing
const ACCEPT_COOKIES_JS: &str = r#"
const button = document.querySelector('button[id*="accept"], button[id*="consent"]');
if (button) button.click();
"#;

/// Fetcher that renders pages in headless Chrome.
///
/// Chrome does not surface the HTTP status of a navigation, so a page that
/// finished loading is reported as 200.
pub struct BrowserFetcher {
    browser: Browser,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch headless Chrome; `settle` is how long to let scripts run after load
    pub fn new(settle: Duration) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self { browser, settle })
    }

    fn render(browser: &Browser, locator: &str, settle: Duration) -> Result<String> {
        let tab = browser.new_tab()?;

        tab.navigate_to(locator)?;
        tab.wait_until_navigated()?;
        thread::sleep(settle);

        let _ = tab.evaluate(ACCEPT_COOKIES_JS, false);

        let html = tab.get_content()?;
        let _ = tab.close(true);
        Ok(html)
    }
}

#[async_trait]
impl DocumentFetcher for BrowserFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedDocument, FetchError> {
        let browser = self.browser.clone();
        let settle = self.settle;
        let target = locator.to_string();

        let html = tokio::task::spawn_blocking(move || Self::render(&browser, &target, settle))
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        debug!("Rendered {} ({} bytes)", locator, html.len());

        Ok(FetchedDocument::ok(html))
    }

    fn source_name(&self) -> &'static str {
        "headless-chrome"
    }
}
