//! Twilio client errors.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum TwilioError {
    /// HTTP request failed before a response arrived.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Twilio error code, when the body carried one.
        code: Option<u32>,
        /// Vendor message, or `HTTP <status>` when the body had none.
        message: String,
    },

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TwilioError {
    /// Build an error from a failed response's status and body.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
        let code = parsed.as_ref().and_then(|e| e.code);
        let message = parsed
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        if status == 404 {
            TwilioError::NotFound(message)
        } else {
            TwilioError::Api {
                status,
                code,
                message,
            }
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TwilioError::NotFound(_))
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, TwilioError::Api { status: 401 | 403, .. })
    }
}

/// Result type for Twilio operations.
pub type Result<T> = std::result::Result<T, TwilioError>;

/// Error body returned by the REST API.
#[derive(Debug, serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
}
