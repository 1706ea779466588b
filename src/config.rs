//! Client configuration read from the environment.

use std::time::Duration;

use crate::error::PlaygroundError;

/// Default generation service location when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Connection settings for the remote collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the generation service (e.g. `http://localhost:8000`).
    pub api_url: String,

    /// Base URL of the collections/settings service, when it differs from
    /// `api_url`.
    pub persistence_url: Option<String>,

    /// Bearer token for an already signed-in session, if any.
    pub auth_token: Option<String>,

    /// Transport timeout. `None` leaves it to the HTTP client default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Creates a config pointing both services at `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: trim_base(api_url.into()),
            persistence_url: None,
            auth_token: None,
            timeout: None,
        }
    }

    /// Sets the generation service URL.
    ///
    /// Persistence follows it unless a persistence URL was set explicitly.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_base(url.into());
        self
    }

    /// Sets the persistence service URL.
    pub fn with_persistence_url(mut self, url: impl Into<String>) -> Self {
        self.persistence_url = Some(trim_base(url.into()));
        self
    }

    /// Sets the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Sets the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create config from environment variables
    ///
    /// Reads:
    /// - `ICONGEN_API_URL` (default: "http://localhost:8000")
    /// - `ICONGEN_PERSISTENCE_URL` (default: same as the API URL)
    /// - `ICONGEN_AUTH_TOKEN` (optional)
    /// - `ICONGEN_TIMEOUT_SECS` (optional, whole seconds)
    pub fn from_env() -> Result<Self, PlaygroundError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PlaygroundError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(get("ICONGEN_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()));

        if let Some(url) = get("ICONGEN_PERSISTENCE_URL") {
            config = config.with_persistence_url(url);
        }
        if let Some(token) = get("ICONGEN_AUTH_TOKEN") {
            config = config.with_auth_token(token);
        }
        if let Some(secs) = get("ICONGEN_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                PlaygroundError::Config(format!("ICONGEN_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Joins `path` onto the generation service URL.
    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Base URL of the persistence service.
    pub fn persistence_base(&self) -> &str {
        self.persistence_url.as_deref().unwrap_or(&self.api_url)
    }

    /// Joins `path` onto the persistence service URL.
    pub fn persistence_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.persistence_base(), path.trim_start_matches('/'))
    }

    /// Builds the shared HTTP client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, PlaygroundError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| PlaygroundError::Config(format!("Failed to construct HTTP client: {e}")))
    }
}

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.persistence_url.is_none());
        assert_eq!(config.persistence_base(), DEFAULT_API_URL);
        assert!(config.auth_token.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn reads_all_keys() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ICONGEN_API_URL", "https://icons.example.com/"),
            ("ICONGEN_PERSISTENCE_URL", "https://store.example.com"),
            ("ICONGEN_AUTH_TOKEN", "abc"),
            ("ICONGEN_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://icons.example.com");
        assert_eq!(config.persistence_base(), "https://store.example.com");
        assert_eq!(config.auth_token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn empty_values_are_unset() {
        let config =
            ClientConfig::from_lookup(lookup(&[("ICONGEN_AUTH_TOKEN", "  ")])).unwrap();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn bad_timeout_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[("ICONGEN_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, PlaygroundError::Config(_)));
    }

    #[test]
    fn api_override_moves_default_persistence() {
        let config = ClientConfig::from_lookup(lookup(&[]))
            .unwrap()
            .with_api_url("https://icons.example.com/");
        assert_eq!(config.api_url, "https://icons.example.com");
        assert_eq!(
            config.persistence_endpoint("/settings"),
            "https://icons.example.com/settings"
        );
    }

    #[test]
    fn api_override_keeps_explicit_persistence() {
        let config = ClientConfig::from_lookup(lookup(&[(
            "ICONGEN_PERSISTENCE_URL",
            "https://store.example.com",
        )]))
        .unwrap()
        .with_api_url("https://icons.example.com");
        assert_eq!(
            config.persistence_endpoint("collections"),
            "https://store.example.com/collections"
        );
    }

    #[test]
    fn endpoints_join_cleanly() {
        let config = ClientConfig::new("http://localhost:8000/");
        assert_eq!(config.api_endpoint("/generate"), "http://localhost:8000/generate");
        assert_eq!(
            config.persistence_endpoint("settings"),
            "http://localhost:8000/settings"
        );
    }
}
