//! Mail Send request body.
//!
//! Only the subset of the v3 `mail/send` schema the adapter uses: a single
//! personalization with one recipient, plain/HTML content or a dynamic
//! template.

use serde::Serialize;
use serde_json::{Map, Value};

/// An email address object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub email: String,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Recipients plus per-recipient template data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Personalization {
    pub to: Vec<EmailAddress>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_template_data: Option<Map<String, Value>>,
}

/// One content part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

impl Content {
    /// `text/plain` part.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain".to_string(),
            value: value.into(),
        }
    }

    /// `text/html` part.
    pub fn html(value: impl Into<String>) -> Self {
        Self {
            content_type: "text/html".to_string(),
            value: value.into(),
        }
    }
}

/// A complete Mail Send request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailMessage {
    pub personalizations: Vec<Personalization>,

    pub from: EmailAddress,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl MailMessage {
    /// A plain message. Content parts are ordered `text/plain` first, as
    /// the API requires.
    pub fn simple(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        text: Option<String>,
        html: Option<String>,
    ) -> Self {
        let mut content = Vec::new();
        if let Some(text) = text {
            content.push(Content::plain(text));
        }
        if let Some(html) = html {
            content.push(Content::html(html));
        }

        Self {
            personalizations: vec![Personalization {
                to: vec![EmailAddress::new(to)],
                dynamic_template_data: None,
            }],
            from: EmailAddress::new(from),
            subject: Some(subject.into()),
            content,
            template_id: None,
        }
    }

    /// A dynamic-template message.
    pub fn template(
        to: impl Into<String>,
        from: impl Into<String>,
        template_id: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![EmailAddress::new(to)],
                dynamic_template_data: Some(data),
            }],
            from: EmailAddress::new(from),
            subject: None,
            content: Vec::new(),
            template_id: Some(template_id.into()),
        }
    }

    /// First recipient, for logging.
    pub fn recipient(&self) -> Option<&str> {
        self.personalizations
            .first()
            .and_then(|p| p.to.first())
            .map(|a| a.email.as_str())
    }
}
