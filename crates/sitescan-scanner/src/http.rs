//! The plain HTTP fetch tier.

use crate::classifier::{is_blocked, needs_rendering};
use crate::error::Result;
use crate::text::visible_text;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::redirect::Policy;
use reqwest::Client;
use sitescan_core::{FetchMethod, FetchOutcome, HttpConfig, Keyword, PageFetcher, TierFailure};
use tracing::debug;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Fetches pages with a browser-like HTTP client and decides whether the
/// static markup is good enough to judge.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build the client: bounded timeout, limited redirects, realistic
    /// headers, compressed responses decoded transparently.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    fn transport_failure(&self, err: &reqwest::Error) -> TierFailure {
        if err.is_timeout() {
            TierFailure::Timeout(format!("timeout of {}s exceeded", self.timeout_secs))
        } else {
            TierFailure::Network(err.to_string())
        }
    }
}

/// Judge a retrievable (status < 500) response.
pub fn evaluate_response(status: u16, body: &str, keyword: &Keyword) -> FetchOutcome {
    if is_blocked(status, body) {
        return FetchOutcome::Failed(TierFailure::Blocked);
    }
    if needs_rendering(body) {
        return FetchOutcome::Failed(TierFailure::NeedsRendering);
    }
    FetchOutcome::Matched {
        found: keyword.matches(&visible_text(body)),
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn method(&self) -> FetchMethod {
        FetchMethod::Http
    }

    async fn fetch(&self, url: &str, keyword: &Keyword) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(self.transport_failure(&e)),
        };

        let status = response.status().as_u16();
        if status >= 500 {
            debug!(url, status, "HTTP tier got server error");
            return FetchOutcome::Failed(TierFailure::HttpStatus(status));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Failed(self.transport_failure(&e)),
        };

        let outcome = evaluate_response(status, &body, keyword);
        debug!(url, status, bytes = body.len(), ?outcome, "HTTP tier evaluated response");
        outcome
    }
}
