//! SendGrid client errors.
//!
//! The `Display` text of these errors is what the caller sees after
//! `Error: `, so API failures render as the vendor's own message.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum SendGridError {
    /// HTTP request failed before a response arrived.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// URL joining failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Vendor message, or `HTTP <status>` when the body had none.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SendGridError {
    /// Build an API error from a status and the raw response body.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .map(|err| {
                err.errors
                    .into_iter()
                    .filter_map(|item| item.message)
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        SendGridError::Api { status, message }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SendGridError::Api { status: 401 | 403, .. })
    }
}

/// Result type for SendGrid operations.
pub type Result<T> = std::result::Result<T, SendGridError>;

/// Error body returned by the v3 API.
#[derive(Debug, serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorItem {
    #[serde(default)]
    message: Option<String>,
}
