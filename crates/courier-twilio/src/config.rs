//! Messaging adapter configuration.

use std::time::Duration;

use courier_config::{ConfigError, Environment, optional, require_all};

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Default Lookup API base URL.
pub const DEFAULT_LOOKUPS_BASE: &str = "https://lookups.twilio.com";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ACCOUNT_SID_ENV: &str = "TWILIO_ACCOUNT_SID";
pub const AUTH_TOKEN_ENV: &str = "TWILIO_AUTH_TOKEN";
pub const PHONE_NUMBER_ENV: &str = "TWILIO_PHONE_NUMBER";
pub const WHATSAPP_NUMBER_ENV: &str = "TWILIO_WHATSAPP_NUMBER";
pub const API_URL_ENV: &str = "TWILIO_API_URL";
pub const LOOKUPS_URL_ENV: &str = "TWILIO_LOOKUPS_URL";

/// Configuration for the Twilio client and messaging adapter.
#[derive(Clone)]
pub struct TwilioConfig {
    /// Account SID; also the basic-auth user.
    pub account_sid: String,

    /// Auth token; the basic-auth password.
    pub auth_token: String,

    /// Default sender for SMS and voice.
    pub phone_number: Option<String>,

    /// Default sender for WhatsApp, without the `whatsapp:` prefix.
    pub whatsapp_number: Option<String>,

    /// Base URL for the Messages and Calls APIs.
    pub api_base_url: String,

    /// Base URL for the Lookup API.
    pub lookups_base_url: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl TwilioConfig {
    /// Create a config with credentials and defaults for the rest.
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            phone_number: None,
            whatsapp_number: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
            lookups_base_url: DEFAULT_LOOKUPS_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read configuration from an environment.
    ///
    /// Fails when either credential is unset or empty, naming both when
    /// both are missing.
    pub fn from_env<E>(env: &E) -> courier_config::Result<Self>
    where
        E: Environment + ?Sized,
    {
        let mut creds = require_all(env, &[ACCOUNT_SID_ENV, AUTH_TOKEN_ENV])?.into_iter();
        let (Some(sid), Some(token)) = (creds.next(), creds.next()) else {
            return Err(ConfigError::missing([ACCOUNT_SID_ENV, AUTH_TOKEN_ENV]));
        };
        tracing::info!(
            sid_source = %sid.source,
            token_source = %token.source,
            "using Twilio credentials"
        );

        let mut config = Self::new(sid.into_value(), token.into_value());
        config.phone_number = optional(env, PHONE_NUMBER_ENV);
        config.whatsapp_number = optional(env, WHATSAPP_NUMBER_ENV);

        if let Some(base) = optional(env, API_URL_ENV) {
            url::Url::parse(&base)
                .map_err(|e| ConfigError::invalid_value(API_URL_ENV, e.to_string()))?;
            config.api_base_url = base;
        }
        if let Some(base) = optional(env, LOOKUPS_URL_ENV) {
            url::Url::parse(&base)
                .map_err(|e| ConfigError::invalid_value(LOOKUPS_URL_ENV, e.to_string()))?;
            config.lookups_base_url = base;
        }

        if config.phone_number.is_none() {
            tracing::warn!("{} not set; SMS and calls need an explicit from", PHONE_NUMBER_ENV);
        }
        Ok(config)
    }

    /// Point both APIs at one base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = url.clone();
        self.lookups_base_url = url;
        self
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .field("whatsapp_number", &self.whatsapp_number)
            .field("api_base_url", &self.api_base_url)
            .field("lookups_base_url", &self.lookups_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
