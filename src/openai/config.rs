//! Connection configuration for the OpenAI-compatible API.

use std::time::Duration;

use crate::error::SettingsError;
use crate::settings::Settings;

/// Default API host, including the version prefix.
pub const DEFAULT_HOST: &str = "https://api.openai.com/v1";

/// Connection parameters for one client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    host: Option<String>,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Blank host and proxy values mean "default host" and "no proxy".
    pub fn new(
        api_key: String,
        host: Option<&str>,
        proxy: Option<&str>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            api_key,
            host: host
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
            proxy: proxy
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self::new(
            settings.api_key()?,
            settings.host(),
            settings.proxy(),
            settings.timeout_secs(),
        ))
    }

    /// Effective base URL with any trailing slash trimmed, so endpoint
    /// paths can be appended without doubling separators.
    pub fn base_url(&self) -> String {
        self.host
            .as_deref()
            .unwrap_or(DEFAULT_HOST)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_host_when_unset_or_blank() {
        let config = ClientConfig::new("sk-test".to_string(), None, None, 30);
        assert_eq!(config.base_url(), DEFAULT_HOST);

        let config = ClientConfig::new("sk-test".to_string(), Some("   "), None, 30);
        assert_eq!(config.base_url(), DEFAULT_HOST);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config =
            ClientConfig::new("sk-test".to_string(), Some("https://proxy.test/v1/"), None, 30);
        assert_eq!(config.base_url(), "https://proxy.test/v1");
    }

    #[test]
    fn test_blank_proxy_means_none() {
        let config = ClientConfig::new("sk-test".to_string(), None, Some(""), 30);
        assert!(config.proxy.is_none());

        let config =
            ClientConfig::new("sk-test".to_string(), None, Some("http://proxy:8080"), 30);
        assert_eq!(config.proxy.as_deref(), Some("http://proxy:8080"));
    }

    #[test]
    fn test_timeout_carried_through() {
        let config = ClientConfig::new("sk-test".to_string(), None, None, 45);
        assert_eq!(config.timeout, Duration::from_secs(45));
    }
}
