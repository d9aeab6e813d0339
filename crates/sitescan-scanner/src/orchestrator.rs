//! Per-URL scan state machine.
//!
//! Each URL moves through `Validate → SkipCheck → HttpTier → BrowserTier`
//! and stops at the first state that can produce a [`ScanResult`]. Tier
//! outcomes are tagged values, so escalation from the HTTP tier to the
//! browser tier is ordinary control flow. No tier is ever attempted twice.

use crate::classifier::should_skip;
use crate::error::Result;
use crate::http::HttpFetcher;
use sitescan_browser::{BrowserEngine, BrowserFetcher};
use sitescan_core::{AppConfig, FetchOutcome, Keyword, PageFetcher, ScanResult, TierFailure};
use std::sync::Arc;
use tracing::debug;

/// Where a URL currently is in its scan.
#[derive(Debug)]
enum ScanState {
    Validate,
    SkipCheck,
    HttpTier,
    BrowserTier { http_failure: TierFailure },
    Done(ScanResult),
}

/// Runs the two fetch tiers for one URL at a time.
#[derive(Clone)]
pub struct ScanOrchestrator {
    http: Arc<dyn PageFetcher>,
    browser: Arc<dyn PageFetcher>,
}

impl ScanOrchestrator {
    /// Create an orchestrator from explicit tiers.
    #[must_use]
    pub fn new(http: Arc<dyn PageFetcher>, browser: Arc<dyn PageFetcher>) -> Self {
        Self { http, browser }
    }

    /// Wire the real HTTP tier and a browser tier on the shared engine.
    pub fn from_config(config: &AppConfig, engine: Arc<BrowserEngine>) -> Result<Self> {
        let http = HttpFetcher::new(&config.http)?;
        Ok(Self::new(
            Arc::new(http),
            Arc::new(BrowserFetcher::new(engine)),
        ))
    }

    /// Scan a single URL to its terminal result.
    pub async fn scan_url(&self, url: &str, keyword: &Keyword) -> ScanResult {
        let mut state = ScanState::Validate;

        loop {
            state = match state {
                ScanState::Validate => {
                    if url::Url::parse(url).is_ok() {
                        ScanState::SkipCheck
                    } else {
                        debug!(url, "Invalid URL");
                        ScanState::Done(ScanResult::invalid_url(url))
                    }
                }
                ScanState::SkipCheck => {
                    if should_skip(url) {
                        debug!(url, "Skipping download URL");
                        ScanState::Done(ScanResult::skipped(url))
                    } else {
                        ScanState::HttpTier
                    }
                }
                ScanState::HttpTier => match self.http.fetch(url, keyword).await {
                    FetchOutcome::Matched { found } => {
                        ScanState::Done(ScanResult::resolved(url, found, self.http.method()))
                    }
                    FetchOutcome::Failed(http_failure) => {
                        debug!(url, reason = %http_failure, "HTTP tier failed, falling back to browser");
                        ScanState::BrowserTier { http_failure }
                    }
                },
                ScanState::BrowserTier { http_failure } => {
                    match self.browser.fetch(url, keyword).await {
                        FetchOutcome::Matched { found } => ScanState::Done(ScanResult::resolved(
                            url,
                            found,
                            self.browser.method(),
                        )),
                        FetchOutcome::Failed(browser_failure) => {
                            debug!(
                                url,
                                http = %http_failure,
                                browser = %browser_failure,
                                "Both tiers failed"
                            );
                            ScanState::Done(ScanResult::failed(
                                url,
                                browser_failure.to_string(),
                                http_failure.to_string(),
                            ))
                        }
                    }
                }
                ScanState::Done(result) => return result,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sitescan_core::{FetchMethod, ScanStatus, ScanValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        method: FetchMethod,
        outcome: FetchOutcome,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(method: FetchMethod, outcome: FetchOutcome) -> Arc<Self> {
            Arc::new(Self {
                method,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for Scripted {
        fn method(&self) -> FetchMethod {
            self.method
        }

        async fn fetch(&self, _url: &str, _keyword: &Keyword) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn keyword() -> Keyword {
        Keyword::new("widget").expect("valid keyword")
    }

    #[tokio::test]
    async fn test_http_failure_then_browser_failure() {
        let http = Scripted::new(FetchMethod::Http, FetchOutcome::failed(TierFailure::Blocked));
        let browser = Scripted::new(
            FetchMethod::Browser,
            FetchOutcome::failed(TierFailure::Timeout("navigation exceeded 60s".to_string())),
        );
        let orchestrator = ScanOrchestrator::new(http.clone(), browser.clone());

        let result = orchestrator.scan_url("https://a.example/x", &keyword()).await;

        assert_eq!(result.status, ScanStatus::Error);
        assert_eq!(
            result.result,
            ScanValue::Message("navigation exceeded 60s".to_string())
        );
        assert_eq!(result.error.as_deref(), Some("navigation exceeded 60s"));
        assert_eq!(result.http_error.as_deref(), Some("blocked"));
        assert!(result.method.is_none());
        assert_eq!((http.calls(), browser.calls()), (1, 1));
    }

    #[tokio::test]
    async fn test_browser_not_found_after_needs_js() {
        let http = Scripted::new(
            FetchMethod::Http,
            FetchOutcome::failed(TierFailure::NeedsRendering),
        );
        let browser = Scripted::new(FetchMethod::Browser, FetchOutcome::Matched { found: false });
        let orchestrator = ScanOrchestrator::new(http.clone(), browser.clone());

        let result = orchestrator.scan_url("https://a.example/spa", &keyword()).await;

        assert_eq!(result.status, ScanStatus::NotFound);
        assert_eq!(result.result, ScanValue::Flag(0));
        assert_eq!(result.method, Some(FetchMethod::Browser));
        assert_eq!(browser.calls(), 1);
    }

    #[tokio::test]
    async fn test_url_is_kept_verbatim() {
        let http = Scripted::new(FetchMethod::Http, FetchOutcome::Matched { found: true });
        let browser = Scripted::new(FetchMethod::Browser, FetchOutcome::Matched { found: true });
        let orchestrator = ScanOrchestrator::new(http, browser);

        let url = "HTTPS://A.example/Path?q=Widget";
        let result = orchestrator.scan_url(url, &keyword()).await;
        assert_eq!(result.url, url);
    }
}
