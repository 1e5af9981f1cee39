//! Client error types.

/// Errors from calls to either external API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error after exhausting retries.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API returned a non-2xx status that is not retryable (or
    /// retries were exhausted).
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// A pagination continuation URL pointed at a different host than
    /// the configured base — refused rather than followed.
    #[error("pagination URL host mismatch: {url}")]
    PaginationHostMismatch { url: String },
    /// A configured or continuation URL could not be parsed.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    /// A spawned fetch task failed to complete.
    #[error("background fetch for {endpoint} failed: {reason}")]
    TaskFailed { endpoint: String, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}
