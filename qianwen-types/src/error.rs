//! Error types surfaced through the completion callback.

/// Errors from a Qianwen chat request.
///
/// Only [`QianwenError::Network`] comes out of the streaming path itself.
/// The others are produced while building the request or validating the
/// HTTP response before the body is streamed.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum QianwenError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// Transport failure (DNS, TLS, connection reset, read error mid-stream).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The server answered with something other than a streamable success.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The API key was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Anything else, e.g. a request body that failed to serialize.
    #[error("unknown error: {0}")]
    Unknown(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl QianwenError {
    /// Wrap a transport-level failure.
    pub fn network(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Network(err.into())
    }

    /// Whether this error is likely transient. Nothing is retried automatically;
    /// this is a hint for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<serde_json::Error> for QianwenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unknown(Box::new(err))
    }
}
