//! Internal error helpers for mapping HTTP/reqwest errors to [`QianwenError`].

use qianwen_types::QianwenError;

/// Map a non-success HTTP status from the completion endpoint to a [`QianwenError`].
///
/// DashScope answers a bad or missing key with 401 (`InvalidApiKey`) and a key
/// without access to the application with 403.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> QianwenError {
    match status.as_u16() {
        401 | 403 => QianwenError::Unauthorized(body.to_string()),
        _ => QianwenError::InvalidResponse(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to a [`QianwenError`].
///
/// The URL is validated before reqwest sees it, so a builder error means a
/// header value was rejected (an API key with control characters, say). No
/// timeout is configured here, so timeouts from a caller-supplied client are
/// reported as network errors like any other transport failure.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> QianwenError {
    if err.is_builder() {
        QianwenError::Unknown(Box::new(err))
    } else {
        QianwenError::network(err)
    }
}
