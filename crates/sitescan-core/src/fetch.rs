//! Contract shared by the two fetch tiers.
//!
//! A tier never returns `Err`: every failure mode is a [`TierFailure`] inside
//! the returned [`FetchOutcome`], and the orchestrator decides whether that
//! failure escalates to the next tier or ends the URL.

use crate::types::{FetchMethod, Keyword};
use async_trait::async_trait;
use std::fmt;

/// Why a tier could not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierFailure {
    /// The response looks like an anti-bot or rate-limit page
    Blocked,
    /// The markup is a client-rendered shell with almost no text
    NeedsRendering,
    /// The server answered with a 5xx status
    HttpStatus(u16),
    /// Connection, TLS, DNS or body read failure
    Network(String),
    /// Request or navigation exceeded its time budget
    Timeout(String),
    /// The browser could not load the page
    Navigation(String),
    /// Browser launch, context or script evaluation failure
    Browser(String),
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocked => f.write_str("blocked"),
            Self::NeedsRendering => f.write_str("needs_js"),
            Self::HttpStatus(code) => write!(f, "HTTP {code}"),
            Self::Network(msg)
            | Self::Timeout(msg)
            | Self::Navigation(msg)
            | Self::Browser(msg) => f.write_str(msg),
        }
    }
}

/// Tagged outcome of a single tier attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page text was read; `found` says whether the keyword is in it
    Matched {
        /// Keyword containment
        found: bool,
    },
    /// The tier could not read the page
    Failed(TierFailure),
}

impl FetchOutcome {
    /// Shorthand for a failed outcome.
    #[must_use]
    pub fn failed(failure: TierFailure) -> Self {
        Self::Failed(failure)
    }

    /// Whether the tier produced a verdict.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// One fetch strategy: read a page and test it for a keyword.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Which tier this fetcher is, recorded on resolved results.
    fn method(&self) -> FetchMethod;

    /// Fetch `url` and test its visible text for `keyword`.
    async fn fetch(&self, url: &str, keyword: &Keyword) -> FetchOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(FetchOutcome);

    #[async_trait]
    impl PageFetcher for Fixed {
        fn method(&self) -> FetchMethod {
            FetchMethod::Http
        }

        async fn fetch(&self, _url: &str, _keyword: &Keyword) -> FetchOutcome {
            self.0.clone()
        }
    }

    #[test]
    fn test_failure_display_matches_wire_reasons() {
        assert_eq!(TierFailure::Blocked.to_string(), "blocked");
        assert_eq!(TierFailure::NeedsRendering.to_string(), "needs_js");
        assert_eq!(TierFailure::HttpStatus(502).to_string(), "HTTP 502");
        assert_eq!(
            TierFailure::Timeout("navigation timed out after 60s".to_string()).to_string(),
            "navigation timed out after 60s"
        );
    }

    #[tokio::test]
    async fn test_fetcher_is_object_safe() {
        let fetcher: Box<dyn PageFetcher> = Box::new(Fixed(FetchOutcome::Matched { found: true }));
        let keyword = Keyword::new("widget").expect("valid keyword");
        let outcome = fetcher.fetch("https://a.example", &keyword).await;
        assert!(outcome.is_success());
        assert_eq!(fetcher.method(), FetchMethod::Http);
    }
}
