//! DashScope application client struct and builder.

use qianwen_types::{Message, QianwenError};
use reqwest::header::CONTENT_TYPE;
use zeroize::Zeroizing;

use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{map_http_status, map_reqwest_error};
use crate::types::CompletionRequest;

/// Header that switches the completion endpoint to SSE output.
const SSE_HEADER: &str = "x-dashscope-sse";

/// Client for one DashScope application's completion endpoint.
///
/// # Example
///
/// ```no_run
/// use qianwen_provider::Qianwen;
///
/// let client = Qianwen::new("sk-...", "your-app-id")
///     .base_url("https://dashscope.aliyuncs.com");
/// ```
#[derive(Clone)]
pub struct Qianwen {
    /// DashScope API key (`DASHSCOPE_API_KEY`).
    pub(crate) api_key: Zeroizing<String>,
    /// Application id the completion endpoint is scoped to.
    pub(crate) app_id: String,
    /// API base URL (override for testing or proxies).
    pub(crate) base_url: String,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl Qianwen {
    /// Create a client for `app_id` with the given API key.
    ///
    /// Default base URL: `https://dashscope.aliyuncs.com`.
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            api_key: Zeroizing::new(api_key.into()),
            app_id: app_id.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from a loaded [`ClientConfig`].
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            api_key: config.api_key,
            app_id: config.app_id,
            base_url: config.base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or an API proxy.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, custom TLS).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the completion endpoint URL.
    pub fn completion_url(&self) -> String {
        format!(
            "{}/api/v1/apps/{}/completion",
            self.base_url.trim_end_matches('/'),
            self.app_id
        )
    }

    /// Build the streaming completion request for `messages` without sending it.
    ///
    /// Fails with [`QianwenError::InvalidUrl`] when the endpoint is not an
    /// `http(s)` URL, and with [`QianwenError::Unknown`] when the body cannot be
    /// serialized or a header value is rejected.
    pub fn build_request(&self, messages: &[Message]) -> Result<reqwest::Request, QianwenError> {
        let raw_url = self.completion_url();
        let url = reqwest::Url::parse(&raw_url)
            .map_err(|e| QianwenError::InvalidUrl(format!("{raw_url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(QianwenError::InvalidUrl(format!(
                "{raw_url}: unsupported scheme {}",
                url.scheme()
            )));
        }

        let body = serde_json::to_vec(&CompletionRequest::new(messages))?;

        self.client
            .post(url)
            .bearer_auth(self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(SSE_HEADER, "enable")
            .body(body)
            .build()
            .map_err(map_reqwest_error)
    }

    /// Send a built request and check the response status.
    ///
    /// On success the body has not been read yet; it is the event stream.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, QianwenError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "completion endpoint rejected request");
            return Err(map_http_status(status, &body));
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Qianwen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Qianwen")
            .field("api_key", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
