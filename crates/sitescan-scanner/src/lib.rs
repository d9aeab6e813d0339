//! Sitescan Scanner - keyword scanning orchestration.
//!
//! This crate decides, for each submitted URL, whether a keyword appears in
//! the page's visible text. A cheap HTTP fetch is tried first; pages that are
//! blocked or rendered client-side escalate to the shared headless browser.
//!
//! # Features
//!
//! - Download URLs (PDFs, archives, installers) skipped without any fetch
//! - Block-page and client-rendered shell detection on static markup
//! - Browser fallback through `sitescan-browser`, at most one attempt per tier
//! - Concurrency-limited batches with index-aligned results
//! - Completion-order progress events and CSV export
//!
//! # Example
//!
//! ```rust,ignore
//! use sitescan_browser::BrowserEngine;
//! use sitescan_core::AppConfig;
//! use sitescan_scanner::{BatchRunner, ScanBatch, ScanOrchestrator, ScanSession};
//! use std::sync::Arc;
//!
//! let config = AppConfig::load_with_env()?;
//! let engine = Arc::new(BrowserEngine::new(config.browser.clone()));
//! let runner = BatchRunner::new(ScanOrchestrator::from_config(&config, engine.clone())?);
//!
//! let batch = ScanBatch::with_limits(urls, "widget", None, &config.scanning)?;
//! let mut session = ScanSession::start(runner, engine, batch);
//! while let Some(event) = session.next_event().await {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod classifier;
#[allow(missing_docs)]
pub mod error;
pub mod export;
pub mod http;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod runner;
#[allow(missing_docs)]
pub mod session;
pub mod text;

// Re-export commonly used types
pub use classifier::{is_blocked, needs_rendering, should_skip};
pub use error::{Result, ScanError};
pub use export::to_csv;
pub use http::{evaluate_response, HttpFetcher};
pub use orchestrator::ScanOrchestrator;
pub use runner::{BatchRunner, ScanBatch};
pub use session::{ProgressEvent, ScanSession, SessionResource};
pub use text::visible_text;
