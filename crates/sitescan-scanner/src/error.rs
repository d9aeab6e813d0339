use sitescan_core::KeywordError;
use thiserror::Error;

/// Errors that reject a batch before any URL is scanned, keep the engine
/// from being built, abort a running session, or break an export.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No valid URLs provided")]
    NoUrls,

    #[error("Keyword is required")]
    EmptyKeyword(#[from] KeywordError),

    #[error("Concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Scan batch failed: {0}")]
    BatchFailed(String),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ScanError::NoUrls.to_string(), "No valid URLs provided");
        assert_eq!(
            ScanError::EmptyKeyword(KeywordError).to_string(),
            "Keyword is required"
        );
        assert_eq!(
            ScanError::InvalidConcurrency(0).to_string(),
            "Concurrency must be at least 1, got 0"
        );
        assert_eq!(
            ScanError::BatchFailed("worker panicked".into()).to_string(),
            "Scan batch failed: worker panicked"
        );
    }
}
