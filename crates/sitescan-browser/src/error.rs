use sitescan_core::TierFailure;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser context error: {0}")]
    Context(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    Evaluation(String),
}

impl From<BrowserError> for TierFailure {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::NavigationError(_) => TierFailure::Navigation(err.to_string()),
            BrowserError::Timeout(_) => TierFailure::Timeout(err.to_string()),
            BrowserError::Launch(_) | BrowserError::Context(_) | BrowserError::Evaluation(_) => {
                TierFailure::Browser(err.to_string())
            }
        }
    }
}
