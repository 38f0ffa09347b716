//! Email adapter configuration.

use std::time::Duration;

use courier_config::{ConfigError, Environment, optional, require_all};

/// Default SendGrid API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.sendgrid.com";

/// Sender used when neither the call nor the environment names one.
pub const FALLBACK_FROM: &str = "noreply@example.com";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Required API key variable.
pub const API_KEY_ENV: &str = "SENDGRID_API_KEY";
/// Optional default sender variable.
pub const FROM_EMAIL_ENV: &str = "SENDGRID_FROM_EMAIL";
/// Optional base URL override, used against local mocks.
pub const API_URL_ENV: &str = "SENDGRID_API_URL";

/// Configuration for the SendGrid client and email adapter.
#[derive(Clone)]
pub struct SendGridConfig {
    /// API key for bearer authentication.
    pub api_key: String,

    /// Sender for calls that do not supply `from`.
    pub default_from: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl SendGridConfig {
    /// Create a new config with the given API key and defaults for the rest.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            default_from: FALLBACK_FROM.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read configuration from an environment.
    ///
    /// Fails when `SENDGRID_API_KEY` is unset or empty.
    pub fn from_env<E>(env: &E) -> courier_config::Result<Self>
    where
        E: Environment + ?Sized,
    {
        let Some(api_key) = require_all(env, &[API_KEY_ENV])?.into_iter().next() else {
            return Err(ConfigError::missing([API_KEY_ENV]));
        };
        tracing::info!(source = %api_key.source, "using SendGrid API key");

        let mut config = Self::new(api_key.into_value());
        if let Some(from) = optional(env, FROM_EMAIL_ENV) {
            config = config.with_default_from(from);
        }
        if let Some(base) = optional(env, API_URL_ENV) {
            url::Url::parse(&base)
                .map_err(|e| ConfigError::invalid_value(API_URL_ENV, e.to_string()))?;
            config = config.with_base_url(base);
        }
        Ok(config)
    }

    /// Set the default sender.
    pub fn with_default_from(mut self, from: impl Into<String>) -> Self {
        self.default_from = from.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl std::fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("api_key", &"<redacted>")
            .field("default_from", &self.default_from)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_config::MapEnv;

    #[test]
    fn test_from_env_defaults() {
        let env = MapEnv::new().with(API_KEY_ENV, "SG.test");
        let config = SendGridConfig::from_env(&env).unwrap();

        assert_eq!(config.api_key, "SG.test");
        assert_eq!(config.default_from, FALLBACK_FROM);
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_env_overrides() {
        let env = MapEnv::new()
            .with(API_KEY_ENV, "SG.test")
            .with(FROM_EMAIL_ENV, "orders@shop.test")
            .with(API_URL_ENV, "http://127.0.0.1:9999");
        let config = SendGridConfig::from_env(&env).unwrap();

        assert_eq!(config.default_from, "orders@shop.test");
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_empty_from_uses_fallback() {
        let env = MapEnv::new()
            .with(API_KEY_ENV, "SG.test")
            .with(FROM_EMAIL_ENV, "");
        let config = SendGridConfig::from_env(&env).unwrap();
        assert_eq!(config.default_from, FALLBACK_FROM);
    }

    #[test]
    fn test_missing_api_key() {
        let err = SendGridConfig::from_env(&MapEnv::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "SENDGRID_API_KEY environment variable is required"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let env = MapEnv::new()
            .with(API_KEY_ENV, "SG.test")
            .with(API_URL_ENV, "not a url");
        let err = SendGridConfig::from_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = SendGridConfig::new("SG.secret");
        assert!(!format!("{:?}", config).contains("SG.secret"));
    }
}
