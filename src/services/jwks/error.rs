use thiserror::Error;

/// Key-set retrieval errors.
///
/// `Clone` because a single fetch result is handed to every caller that
/// joined the in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySetError {
    #[error("key set source not configured: {0}")]
    NotConfigured(String),

    #[error("failed to fetch key set from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("failed to parse key set from {url}: {reason}")]
    ParseFailed { url: String, reason: String },
}

impl KeySetError {
    pub fn fetch_failed(url: &str, reason: impl ToString) -> Self {
        Self::FetchFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse_failed(url: &str, reason: impl ToString) -> Self {
        Self::ParseFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
