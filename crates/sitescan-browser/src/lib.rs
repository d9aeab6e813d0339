//! Browser fetch tier for JavaScript-rendered pages.
//!
//! Holds one shared headless Chromium per process and gives every fetch its
//! own isolated browsing context, so concurrent scans never share cookies,
//! cache or storage.

pub mod actions;
pub mod context;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod fingerprint;

pub use actions::BrowserActions;
pub use context::IsolatedPage;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use fetch::BrowserFetcher;
pub use fingerprint::FingerprintConfig;
