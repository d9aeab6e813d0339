//! Per-fetch isolated browsing context.
//!
//! Every browser fetch opens its own CDP browser context (separate cookies,
//! cache and storage) with a single page inside it. [`IsolatedPage::close`]
//! tears both down; if a fetch path returns early without calling it, `Drop`
//! spawns the same cleanup on the runtime.

use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
    FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::security::SetIgnoreCertificateErrorsParams;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::Page;
use futures::stream::StreamExt;
use std::ops::Deref;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Resource types aborted before they hit the network.
pub fn is_heavy_resource(resource_type: &ResourceType) -> bool {
    matches!(
        resource_type,
        ResourceType::Image | ResourceType::Media | ResourceType::Font | ResourceType::Stylesheet
    )
}

/// A page living in its own browser context on the shared browser.
pub struct IsolatedPage {
    browser: Arc<Browser>,
    context_id: Option<BrowserContextId>,
    page: Option<Page>,
    interceptor: Option<JoinHandle<()>>,
    url: String,
    runtime_handle: tokio::runtime::Handle,
}

impl IsolatedPage {
    /// Create a context and a blank page in it, configured with the
    /// fingerprint's user agent and certificate errors ignored.
    pub async fn open(
        browser: Arc<Browser>,
        fingerprint: &FingerprintConfig,
        url: &str,
    ) -> Result<Self> {
        let context_id = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| BrowserError::Context(format!("create context: {e}")))?
            .result
            .browser_context_id;

        let mut isolated = Self {
            browser,
            context_id: Some(context_id.clone()),
            page: None,
            interceptor: None,
            url: url.to_string(),
            runtime_handle: tokio::runtime::Handle::current(),
        };

        let mut target = CreateTargetParams::new("about:blank");
        target.browser_context_id = Some(context_id);

        let page = isolated
            .browser
            .new_page(target)
            .await
            .map_err(|e| BrowserError::Context(format!("create page: {e}")))?;
        isolated.page = Some(page);

        let page = isolated.page();
        page.execute(SetUserAgentOverrideParams::new(fingerprint.user_agent.clone()))
            .await
            .map_err(|e| BrowserError::Context(format!("set user agent: {e}")))?;
        page.execute(SetIgnoreCertificateErrorsParams::new(true))
            .await
            .map_err(|e| BrowserError::Context(format!("ignore certificate errors: {e}")))?;

        Ok(isolated)
    }

    /// Abort image, media, font and stylesheet requests; continue the rest.
    pub async fn block_heavy_resources(&mut self) -> Result<()> {
        let page = self.page().clone();

        let mut paused = page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(|e| BrowserError::Context(format!("request listener: {e}")))?;

        page.execute(FetchEnableParams {
            patterns: Some(vec![RequestPattern {
                url_pattern: Some("*".to_string()),
                resource_type: None,
                request_stage: Some(RequestStage::Request),
            }]),
            handle_auth_requests: None,
        })
        .await
        .map_err(|e| BrowserError::Context(format!("enable request interception: {e}")))?;

        let url = self.url.clone();
        self.interceptor = Some(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let outcome = if is_heavy_resource(&event.resource_type) {
                    page.execute(FailRequestParams::new(
                        event.request_id.clone(),
                        ErrorReason::BlockedByClient,
                    ))
                    .await
                    .map(|_| ())
                } else {
                    page.execute(ContinueRequestParams::new(event.request_id.clone()))
                        .await
                        .map(|_| ())
                };

                if let Err(e) = outcome {
                    trace!("Request filter for {} could not resolve request: {}", url, e);
                }
            }
        }));

        Ok(())
    }

    pub fn page(&self) -> &Page {
        self.page
            .as_ref()
            .expect("IsolatedPage: page is set for the whole public lifetime")
    }

    /// Close the page and dispose the context. Cleanup failures are logged
    /// and swallowed so they never mask the fetch outcome.
    pub async fn close(mut self) {
        let interceptor = self.interceptor.take();
        let page = self.page.take();
        let context_id = self.context_id.take();
        cleanup(
            Arc::clone(&self.browser),
            interceptor,
            page,
            context_id,
            std::mem::take(&mut self.url),
        )
        .await;
    }
}

impl Deref for IsolatedPage {
    type Target = Page;

    fn deref(&self) -> &Self::Target {
        self.page()
    }
}

impl Drop for IsolatedPage {
    fn drop(&mut self) {
        if self.page.is_none() && self.context_id.is_none() && self.interceptor.is_none() {
            return;
        }

        let browser = Arc::clone(&self.browser);
        let interceptor = self.interceptor.take();
        let page = self.page.take();
        let context_id = self.context_id.take();
        let url = std::mem::take(&mut self.url);

        self.runtime_handle.spawn(async move {
            cleanup(browser, interceptor, page, context_id, url).await;
        });
    }
}

async fn cleanup(
    browser: Arc<Browser>,
    interceptor: Option<JoinHandle<()>>,
    page: Option<Page>,
    context_id: Option<BrowserContextId>,
    url: String,
) {
    if let Some(interceptor) = interceptor {
        interceptor.abort();
    }

    if let Some(page) = page {
        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", url, e);
        }
    }

    if let Some(context_id) = context_id {
        if let Err(e) = browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await
        {
            warn!("Failed to dispose browser context for {}: {}", url, e);
        } else {
            debug!("Browser context disposed for {}", url);
        }
    }
}
