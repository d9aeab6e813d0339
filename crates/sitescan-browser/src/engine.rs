use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::browser::CloseParams;
use futures::stream::StreamExt;
use sitescan_core::BrowserConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Launch flags that hide the automation banner and keep Chromium stable in
/// containers.
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-features=IsolateOrigins,site-per-process",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-http2",
];

/// The live browser process and the task draining its CDP events.
struct SharedBrowser {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
}

impl SharedBrowser {
    fn is_alive(&self) -> bool {
        !self.handler.is_finished()
    }
}

/// Process-wide owner of the one shared headless browser.
///
/// The browser is launched on first [`acquire`](Self::acquire) and kept until
/// [`release`](Self::release). Launch and shutdown hold the same lock, so
/// concurrent first use launches exactly once; callers receive a cloned
/// handle and open their own contexts without holding the lock.
pub struct BrowserEngine {
    config: BrowserConfig,
    fingerprint: FingerprintConfig,
    slot: Mutex<Option<SharedBrowser>>,
    launches: AtomicUsize,
}

impl BrowserEngine {
    /// Create an engine; nothing is launched until the first `acquire`.
    pub fn new(config: BrowserConfig) -> Self {
        let fingerprint = FingerprintConfig::from_config(&config);
        Self {
            config,
            fingerprint,
            slot: Mutex::new(None),
            launches: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &FingerprintConfig {
        &self.fingerprint
    }

    /// Number of browser processes launched so far.
    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Whether a live browser is currently held.
    pub async fn is_running(&self) -> bool {
        self.slot.lock().await.as_ref().is_some_and(SharedBrowser::is_alive)
    }

    /// Return the shared browser, launching it if none is live.
    pub async fn acquire(&self) -> Result<Arc<Browser>> {
        let mut slot = self.slot.lock().await;

        if let Some(shared) = slot.as_ref() {
            if shared.is_alive() {
                return Ok(Arc::clone(&shared.browser));
            }
            warn!("Shared browser handler exited, relaunching");
        }

        let shared = self.launch().await?;
        let browser = Arc::clone(&shared.browser);
        *slot = Some(shared);
        Ok(browser)
    }

    /// Shut the shared browser down. Safe to call repeatedly or before any
    /// launch.
    pub async fn release(&self) {
        let Some(shared) = self.slot.lock().await.take() else {
            debug!("No shared browser to release");
            return;
        };

        match Arc::try_unwrap(shared.browser) {
            Ok(mut browser) => {
                if let Err(e) = browser.close().await {
                    warn!("Browser close error (non-fatal): {}", e);
                }
            }
            Err(browser) => {
                // Fetches still hold handles; ask Chromium to exit anyway.
                if let Err(e) = browser.execute(CloseParams::default()).await {
                    warn!("Browser close error (non-fatal): {}", e);
                }
            }
        }

        shared.handler.abort();
        info!("Shared browser released");
    }

    /// Launch options for the shared browser. The CDP request timeout
    /// follows the navigation timeout so `goto` is not cut short.
    fn launch_config(&self) -> Result<LaunchConfig> {
        let mut builder = LaunchConfig::builder()
            .no_sandbox()
            .viewport(self.fingerprint.viewport())
            .window_size(self.fingerprint.viewport_width, self.fingerprint.viewport_height)
            .request_timeout(self.config.navigation_timeout());

        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(exe) = &self.config.chrome_executable {
            builder = builder.chrome_executable(exe);
        }

        builder.build().map_err(BrowserError::Launch)
    }

    async fn launch(&self) -> Result<SharedBrowser> {
        let launch_config = self.launch_config()?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        let count = self.launches.fetch_add(1, Ordering::SeqCst) + 1;
        info!(launches = count, headless = self.config.headless, "Shared browser launched");

        Ok(SharedBrowser {
            browser: Arc::new(browser),
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_release_without_launch_is_noop() {
        let engine = BrowserEngine::new(BrowserConfig::default());

        engine.release().await;
        engine.release().await;

        assert_eq!(engine.launch_count(), 0);
        assert!(!engine.is_running().await);
    }

    #[tokio::test]
    async fn test_acquire_with_missing_executable_fails() {
        let config = BrowserConfig {
            chrome_executable: Some("/nonexistent/sitescan-chromium".into()),
            ..BrowserConfig::default()
        };
        let engine = BrowserEngine::new(config);

        let result = engine.acquire().await;
        assert!(matches!(result, Err(BrowserError::Launch(_))));
        assert_eq!(engine.launch_count(), 0);
        assert!(!engine.is_running().await);
    }

    #[test]
    fn test_cdp_request_timeout_follows_navigation_timeout() {
        let config = BrowserConfig {
            chrome_executable: Some("/nonexistent/sitescan-chromium".into()),
            navigation_timeout_secs: 75,
            ..BrowserConfig::default()
        };
        let engine = BrowserEngine::new(config);

        let launch_config = engine.launch_config().expect("explicit executable builds");
        let rendered = format!("{launch_config:?}");
        assert!(
            rendered.contains("request_timeout: 75s"),
            "launch config: {rendered}"
        );
    }
}
