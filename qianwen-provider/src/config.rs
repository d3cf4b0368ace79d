//! Client configuration: credentials, application id, endpoint.

use zeroize::Zeroizing;

/// Default DashScope API base URL.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "DASHSCOPE_API_KEY";

/// Environment variable holding the application id.
pub const APP_ID_VAR: &str = "DASHSCOPE_APP_ID";

/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "DASHSCOPE_BASE_URL";

/// Errors from loading a [`ClientConfig`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Settings needed to talk to one DashScope application.
///
/// The API key is zeroed on drop and never shown by `Debug`.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) api_key: Zeroizing<String>,
    pub(crate) app_id: String,
    pub(crate) base_url: String,
}

impl ClientConfig {
    /// Config for `app_id` authenticated with `api_key`, using [`DEFAULT_BASE_URL`].
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            api_key: Zeroizing::new(api_key.into()),
            app_id: app_id.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Load from `DASHSCOPE_API_KEY`, `DASHSCOPE_APP_ID` and the optional
    /// `DASHSCOPE_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let api_key = required(API_KEY_VAR)?;
        let app_id = required(APP_ID_VAR)?;
        let mut config = Self::new(api_key, app_id);
        if let Some(url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.base_url = url;
        }
        Ok(config)
    }

    /// The application id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn loads_required_vars() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test"),
            (APP_ID_VAR, "app-123"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_str(), "sk-test");
        assert_eq!(config.app_id(), "app-123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_var_overrides_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test"),
            (APP_ID_VAR, "app-123"),
            (BASE_URL_VAR, "http://localhost:8080"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = ClientConfig::from_lookup(lookup_from(&[(APP_ID_VAR, "app-123")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(API_KEY_VAR)));
        assert!(err.to_string().contains("DASHSCOPE_API_KEY"));
    }

    #[test]
    fn empty_app_id_counts_as_missing() {
        let err = ClientConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test"),
            (APP_ID_VAR, "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(APP_ID_VAR)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ClientConfig::new("sk-very-secret", "app-123");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("app-123"));
    }
}
