//! Configuration management for Sitescan.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Realistic desktop Chrome user agent used by both tiers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main application configuration.
///
/// This is loaded from `~/.config/sitescan/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Batch scheduling settings
    pub scanning: ScanningConfig,
    /// Plain HTTP tier settings
    pub http: HttpConfig,
    /// Browser tier settings
    pub browser: BrowserConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML or fail validation
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file. A missing file is an error.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SITESCAN_CONCURRENCY`: Override default batch concurrency
    /// - `SITESCAN_HEADLESS`: Override browser headless mode (true/false)
    /// - `SITESCAN_CHROME_EXECUTABLE`: Path to the Chromium binary
    /// - `SITESCAN_SETTLE_MS`: Override the render-settle wait
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `SITESCAN_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("SITESCAN_CONCURRENCY") {
            if let Ok(concurrency) = val.parse() {
                self.scanning.default_concurrency = concurrency;
                tracing::debug!("Override scanning.default_concurrency from env: {}", concurrency);
            }
        }

        if let Ok(val) = std::env::var("SITESCAN_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("SITESCAN_CHROME_EXECUTABLE") {
            if !val.is_empty() {
                tracing::debug!("Override browser.chrome_executable from env: {}", val);
                self.browser.chrome_executable = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("SITESCAN_SETTLE_MS") {
            if let Ok(settle_ms) = val.parse() {
                self.browser.settle_ms = settle_ms;
                tracing::debug!("Override browser.settle_ms from env: {}", settle_ms);
            }
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanning.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scanning.max_concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_concurrency".to_string(),
                reason: format!("must not exceed {MAX_CONCURRENCY}"),
            });
        }
        if self.scanning.default_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.default_concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browser.navigation_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/sitescan/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "sitescan", "sitescan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Hard ceiling on concurrent URL scans; config can lower it, never raise it.
pub const MAX_CONCURRENCY: usize = 50;

/// Batch scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Concurrency used when the caller does not ask for one
    pub default_concurrency: usize,
    /// Hard ceiling applied to every requested concurrency
    pub max_concurrency: usize,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            default_concurrency: 20,
            max_concurrency: MAX_CONCURRENCY,
        }
    }
}

/// Plain HTTP tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum redirect hops followed
    pub max_redirects: usize,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Browser tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser viewport width
    pub window_width: u32,
    /// Browser viewport height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Pause after DOM ready before reading text, in milliseconds
    pub settle_ms: u64,
    /// Explicit Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
    /// User agent presented by every browsing context
    pub user_agent: String,
}

impl BrowserConfig {
    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Render-settle wait as a `Duration`.
    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 60,
            settle_ms: 3000,
            chrome_executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
