//! Crate-wide error type.

use reqwest::StatusCode;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Script name outside the allow-list. Raised before any I/O happens.
    #[error("unknown script {0}")]
    InvalidScript(String),

    /// Outbound call exceeded the configured timeout.
    #[error("upstream request to {url} timed out after {timeout_secs}s")]
    UpstreamTimeout { url: String, timeout_secs: u64 },

    /// The provider answered the script fetch with a non-success status.
    #[error("upstream returned {0}")]
    UpstreamStatus(StatusCode),

    /// Transport failure other than a timeout (connect refused, DNS, decode).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
