//! SendGrid v3 HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::config::SendGridConfig;
use crate::error::{Result, SendGridError};
use crate::message::MailMessage;

/// What the API told us about an accepted message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    /// Value of the `X-Message-Id` response header, when present.
    pub message_id: Option<String>,
}

/// Something that can deliver a [`MailMessage`].
///
/// The email adapter only talks to this trait, so tests can swap the HTTP
/// client for an in-memory recorder.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Submit one message for delivery.
    async fn send(&self, message: &MailMessage) -> Result<SendReceipt>;
}

/// Authenticated SendGrid client. Cheap to share behind an `Arc`.
pub struct SendGridClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl SendGridClient {
    /// Build a client from configuration.
    pub fn new(config: &SendGridConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| SendGridError::Config("Invalid API key".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(format!("courier-sendgrid/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SendGridError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            timeout: config.timeout,
        })
    }

    /// The normalised base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(SendGridError::from)
    }
}

#[async_trait]
impl MailSender for SendGridClient {
    async fn send(&self, message: &MailMessage) -> Result<SendReceipt> {
        let url = self.url("v3/mail/send")?;
        tracing::debug!(
            to = message.recipient().unwrap_or_default(),
            template = message.template_id.as_deref(),
            "sending mail"
        );

        let response = self
            .http
            .post(url)
            .json(message)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = SendGridError::from_response(status.as_u16(), &body);
            if err.is_auth_error() {
                tracing::error!(status = status.as_u16(), "SendGrid rejected the API key");
            } else {
                tracing::warn!(status = status.as_u16(), error = %err, "mail send rejected");
            }
            return Err(err);
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        tracing::info!(
            status = status.as_u16(),
            message_id = message_id.as_deref(),
            "mail accepted"
        );

        Ok(SendReceipt { message_id })
    }
}
