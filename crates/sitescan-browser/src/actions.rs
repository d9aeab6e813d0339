use crate::context::IsolatedPage;
use crate::error::{BrowserError, Result};
use chromiumoxide::error::CdpError;
use std::time::Duration;
use tracing::debug;

/// Resolves once the document is interactive, or after 10s regardless.
const WAIT_FOR_READY_SCRIPT: &str = r"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
";

/// Drops non-content nodes and returns the rendered body text, lower-cased.
const VISIBLE_TEXT_SCRIPT: &str = r"
    (() => {
        document.querySelectorAll('script, style, noscript, iframe').forEach((el) => el.remove());
        const text = document.body ? document.body.innerText : '';
        return (text || '').toLowerCase();
    })()
";

/// Page operations the browser tier performs.
#[async_trait::async_trait]
pub trait BrowserActions {
    /// Navigate to a URL, failing after `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until the DOM is ready, bounded by `timeout`
    async fn wait_until_ready(&self, timeout: Duration) -> Result<()>;

    /// Extract the visible text of the rendered document
    async fn visible_text(&self) -> Result<String>;
}

#[async_trait::async_trait]
impl BrowserActions for IsolatedPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page().goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(navigation_failure(url, timeout, &e)),
            Err(_) => Err(navigation_timeout(url, timeout)),
        }
    }

    async fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page().evaluate(WAIT_FOR_READY_SCRIPT)).await {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
                Ok(())
            }
            Ok(Err(e)) => Err(BrowserError::Evaluation(e.to_string())),
            Err(_) => Err(BrowserError::Timeout(format!(
                "page not ready after {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn visible_text(&self) -> Result<String> {
        let result = self
            .page()
            .evaluate(VISIBLE_TEXT_SCRIPT)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        result
            .into_value::<String>()
            .map_err(|e| BrowserError::Evaluation(format!("unexpected text result: {e}")))
    }
}

fn navigation_timeout(url: &str, timeout: Duration) -> BrowserError {
    BrowserError::Timeout(format!(
        "navigation to {url} exceeded {}s",
        timeout.as_secs()
    ))
}

/// The CDP handler reports an expired navigation as `CdpError::Timeout`.
fn navigation_failure(url: &str, timeout: Duration, err: &CdpError) -> BrowserError {
    match err {
        CdpError::Timeout => navigation_timeout(url, timeout),
        other => BrowserError::NavigationError(other.to_string()),
    }
}

/// Helper to extract the host from a URL, for log fields
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
