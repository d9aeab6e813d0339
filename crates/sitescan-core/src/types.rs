//! Shared types used across Sitescan.
//!
//! `ScanResult` is the one record every URL in a batch resolves to, whatever
//! happened to it. The constructors here are the only way the scanner builds
//! results, which keeps the status/method/error combinations consistent.

use crate::error::KeywordError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result text for URLs that fail syntactic validation.
pub const INVALID_URL: &str = "Invalid URL";

/// Result text for URLs classified as downloads.
pub const SKIPPED_DOWNLOAD: &str = "Skipped (PDF/Download)";

/// Result text for URLs never dispatched because the batch was cancelled.
pub const CANCELLED: &str = "Scan cancelled";

/// Terminal status of one scanned URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// The keyword appears in the page text
    Found,
    /// The page was read but the keyword is absent
    NotFound,
    /// The URL could not be scanned
    Error,
    /// The URL was not fetched because it points at a download
    Skipped,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Error => "error",
            Self::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Which fetch tier produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    /// Plain HTTP client
    Http,
    /// Shared headless browser
    Browser,
}

impl fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Browser => f.write_str("browser"),
        }
    }
}

/// The `result` column: `1`/`0` for a verdict, a message otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScanValue {
    /// 1 when found, 0 when not found
    Flag(u8),
    /// Skip reason or error description
    Message(String),
}

impl fmt::Display for ScanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Message(msg) => f.write_str(msg),
        }
    }
}

/// Outcome of scanning a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// The URL exactly as submitted
    pub url: String,
    /// Terminal status
    pub status: ScanStatus,
    /// Verdict flag or message
    pub result: ScanValue,
    /// Tier that produced the verdict, absent for skipped and error outcomes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<FetchMethod>,
    /// Error description, present only when `status` is `Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP tier failure reason when the browser tier failed as well
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_error: Option<String>,
}

impl ScanResult {
    /// A verdict from one of the tiers.
    #[must_use]
    pub fn resolved(url: impl Into<String>, found: bool, method: FetchMethod) -> Self {
        Self {
            url: url.into(),
            status: if found {
                ScanStatus::Found
            } else {
                ScanStatus::NotFound
            },
            result: ScanValue::Flag(u8::from(found)),
            method: Some(method),
            error: None,
            http_error: None,
        }
    }

    /// The URL did not parse.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ScanStatus::Error,
            result: ScanValue::Message(INVALID_URL.to_string()),
            method: None,
            error: Some("Invalid URL format".to_string()),
            http_error: None,
        }
    }

    /// The URL points at a download and was not fetched.
    #[must_use]
    pub fn skipped(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ScanStatus::Skipped,
            result: ScanValue::Message(SKIPPED_DOWNLOAD.to_string()),
            method: None,
            error: None,
            http_error: None,
        }
    }

    /// Both tiers failed. The browser reason is reported as the error,
    /// the HTTP reason is kept alongside it.
    #[must_use]
    pub fn failed(
        url: impl Into<String>,
        browser_error: impl Into<String>,
        http_error: impl Into<String>,
    ) -> Self {
        let browser_error = browser_error.into();
        Self {
            url: url.into(),
            status: ScanStatus::Error,
            result: ScanValue::Message(browser_error.clone()),
            method: None,
            error: Some(browser_error),
            http_error: Some(http_error.into()),
        }
    }

    /// The batch was cancelled before this URL was dispatched.
    #[must_use]
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ScanStatus::Error,
            result: ScanValue::Message(CANCELLED.to_string()),
            method: None,
            error: Some(CANCELLED.to_string()),
            http_error: None,
        }
    }
}

/// Per-status tally of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Number of results
    pub total: usize,
    /// Results with status `found`
    pub found: usize,
    /// Results with status `not_found`
    pub not_found: usize,
    /// Results with status `error`
    pub errors: usize,
    /// Results with status `skipped`
    pub skipped: usize,
}

impl ScanSummary {
    /// Tally a slice of results.
    #[must_use]
    pub fn from_results(results: &[ScanResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, result| {
                match result.status {
                    ScanStatus::Found => summary.found += 1,
                    ScanStatus::NotFound => summary.not_found += 1,
                    ScanStatus::Error => summary.errors += 1,
                    ScanStatus::Skipped => summary.skipped += 1,
                }
                summary
            },
        )
    }
}

/// Trimmed, non-empty search keyword matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword {
    text: String,
    needle: String,
}

impl Keyword {
    /// Create a keyword from user input.
    ///
    /// # Errors
    /// Returns error if the input is blank after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, KeywordError> {
        let text = raw.as_ref().trim();
        if text.is_empty() {
            return Err(KeywordError);
        }
        Ok(Self {
            text: text.to_string(),
            needle: text.to_lowercase(),
        })
    }

    /// The trimmed keyword as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Case-insensitive substring test.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.needle)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for Keyword {
    type Error = KeywordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.text
    }
}
