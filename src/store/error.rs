//! Store-specific error types
//!
//! # Error Types
//!
//! - **`Http`**: transport failures from `reqwest` (connect, timeout, TLS)
//! - **`Status`**: the store answered with a non-success HTTP status
//! - **`Malformed`**: a response did not have the expected shape
//! - **`Json`**: a request or response body could not be (de)serialized
//! - **`Url`**: the configured host/prefix do not form a valid URL
//! - **`ScrollNotFound`**: the scroll cursor expired or never existed
//!
//! Only transport failures and overload statuses are worth retrying, see
//! [`StoreError::is_retryable`].

use thiserror::Error;

/// Search store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response
    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Unexpected response shape
    #[error("Malformed store response: {0}")]
    Malformed(String),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid store URL
    #[error("Invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    /// Scroll cursor expired or unknown
    #[error("Scroll cursor not found: {0}")]
    ScrollNotFound(String),
}

impl StoreError {
    /// Whether a retry may succeed
    ///
    /// Timeouts and connection failures count only when `retry_on_timeout`
    /// is set; `429`, `502`, `503` and `504` are always retryable.
    #[must_use]
    pub fn is_retryable(&self, retry_on_timeout: bool) -> bool {
        match self {
            Self::Http(e) => retry_on_timeout && (e.is_timeout() || e.is_connect()),
            Self::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}
