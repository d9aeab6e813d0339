//! Sitescan Core - Foundation crate for the Sitescan keyword scanner.
//!
//! This crate provides the shared result types, the fetch-tier contract,
//! error handling and configuration management that the browser and scanner
//! crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared result types (`ScanResult`, `ScanStatus`, `Keyword`, `ScanSummary`)
//! - [`fetch`] - The `PageFetcher` tier trait and its tagged `FetchOutcome`
//!
//! # Example
//!
//! ```rust
//! use sitescan_core::{AppConfig, Keyword};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.scanning.default_concurrency, 20);
//!
//! let keyword = Keyword::new("  Widget ")?;
//! assert!(keyword.matches("the best WIDGET around"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, HttpConfig, ScanningConfig, MAX_CONCURRENCY};
pub use error::{ConfigError, ConfigResult, KeywordError};
pub use fetch::{FetchOutcome, PageFetcher, TierFailure};
pub use types::{FetchMethod, Keyword, ScanResult, ScanStatus, ScanSummary, ScanValue};
