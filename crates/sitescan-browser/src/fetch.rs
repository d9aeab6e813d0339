//! The browser fetch tier.

use crate::actions::{extract_domain, BrowserActions};
use crate::context::IsolatedPage;
use crate::engine::BrowserEngine;
use crate::error::Result;
use async_trait::async_trait;
use sitescan_core::{FetchMethod, FetchOutcome, Keyword, PageFetcher, TierFailure};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on the DOM-ready wait after navigation returns.
const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Renders pages in an isolated context on the shared browser and tests the
/// rendered text for the keyword.
#[derive(Clone)]
pub struct BrowserFetcher {
    engine: Arc<BrowserEngine>,
}

impl BrowserFetcher {
    pub fn new(engine: Arc<BrowserEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<BrowserEngine> {
        &self.engine
    }

    async fn render_text(&self, page: &IsolatedPage, url: &str) -> Result<String> {
        let config = self.engine.config();

        page.navigate(url, config.navigation_timeout()).await?;

        if let Err(e) = page.wait_until_ready(READY_TIMEOUT).await {
            // Navigation already succeeded; read whatever rendered.
            debug!("Ready-state check for {} failed: {}", url, e);
        }

        tokio::time::sleep(config.settle()).await;

        page.visible_text().await
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn method(&self) -> FetchMethod {
        FetchMethod::Browser
    }

    async fn fetch(&self, url: &str, keyword: &Keyword) -> FetchOutcome {
        let host = extract_domain(url).unwrap_or_default();

        let browser = match self.engine.acquire().await {
            Ok(browser) => browser,
            Err(e) => {
                warn!(%host, "Browser unavailable: {}", e);
                return FetchOutcome::Failed(e.into());
            }
        };

        let mut page = match IsolatedPage::open(browser, self.engine.fingerprint(), url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(%host, "Could not open browsing context: {}", e);
                return FetchOutcome::Failed(e.into());
            }
        };

        let outcome = match page.block_heavy_resources().await {
            Ok(()) => self.render_text(&page, url).await,
            Err(e) => Err(e),
        };

        page.close().await;

        match outcome {
            Ok(text) => {
                let found = keyword.matches(&text);
                debug!(%host, found, chars = text.len(), "Browser tier read page");
                FetchOutcome::Matched { found }
            }
            Err(e) => {
                let failure = TierFailure::from(e);
                debug!(%host, "Browser tier failed: {}", failure);
                FetchOutcome::Failed(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescan_core::BrowserConfig;

    #[tokio::test]
    async fn test_launch_failure_is_a_tier_failure() {
        let config = BrowserConfig {
            chrome_executable: Some("/nonexistent/sitescan-chromium".into()),
            ..BrowserConfig::default()
        };
        let fetcher = BrowserFetcher::new(Arc::new(BrowserEngine::new(config)));
        let keyword = Keyword::new("widget").expect("valid keyword");

        let outcome = fetcher.fetch("https://a.example/app", &keyword).await;

        assert!(matches!(outcome, FetchOutcome::Failed(TierFailure::Browser(_))));
        assert_eq!(fetcher.method(), FetchMethod::Browser);
    }
}
