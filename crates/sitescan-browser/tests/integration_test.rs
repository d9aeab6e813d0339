use sitescan_browser::{BrowserEngine, BrowserFetcher};
use sitescan_core::{BrowserConfig, FetchOutcome, Keyword, PageFetcher};
use std::sync::Arc;

fn fast_config() -> BrowserConfig {
    BrowserConfig {
        settle_ms: 200,
        ..BrowserConfig::default()
    }
}

#[tokio::test]
#[ignore = "Requires Chrome browser - run with --ignored"]
async fn test_concurrent_first_use_launches_once() {
    let engine = Arc::new(BrowserEngine::new(fast_config()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.acquire().await.is_ok() })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.expect("join acquire task"));
    }

    assert_eq!(engine.launch_count(), 1);
    assert!(engine.is_running().await);

    engine.release().await;
    engine.release().await;
    assert!(!engine.is_running().await);
}

#[tokio::test]
#[ignore = "Requires Chrome browser and network access - run with --ignored"]
async fn test_browser_fetch_reads_rendered_text() {
    let engine = Arc::new(BrowserEngine::new(fast_config()));
    let fetcher = BrowserFetcher::new(Arc::clone(&engine));

    let keyword = Keyword::new("Example Domain").expect("valid keyword");
    let outcome = fetcher.fetch("https://example.com", &keyword).await;
    assert_eq!(outcome, FetchOutcome::Matched { found: true });

    let keyword = Keyword::new("definitely-not-on-this-page").expect("valid keyword");
    let outcome = fetcher.fetch("https://example.com", &keyword).await;
    assert_eq!(outcome, FetchOutcome::Matched { found: false });

    assert_eq!(engine.launch_count(), 1);
    engine.release().await;
}
