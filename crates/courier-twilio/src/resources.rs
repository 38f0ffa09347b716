//! Request parameters and response resources for the Twilio APIs.
//!
//! Responses carry many more fields than listed here; unknown fields are
//! ignored.

use serde::Deserialize;

/// Parameters for creating a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub to: String,
    /// Omitted from the request when `None`.
    pub from: Option<String>,
    pub body: String,
}

impl NewMessage {
    /// Form fields in API naming.
    pub(crate) fn form(&self) -> Vec<(&'static str, &str)> {
        let mut form = vec![("To", self.to.as_str())];
        if let Some(from) = &self.from {
            form.push(("From", from.as_str()));
        }
        form.push(("Body", self.body.as_str()));
        form
    }
}

/// Parameters for starting a call with inline TwiML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCall {
    pub to: String,
    /// Omitted from the request when `None`.
    pub from: Option<String>,
    pub twiml: String,
}

impl NewCall {
    pub(crate) fn form(&self) -> Vec<(&'static str, &str)> {
        let mut form = vec![("To", self.to.as_str())];
        if let Some(from) = &self.from {
            form.push(("From", from.as_str()));
        }
        form.push(("Twiml", self.twiml.as_str()));
        form
    }
}

/// A message resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResource {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    /// RFC 2822 timestamp; `null` until the carrier accepts the message.
    #[serde(default)]
    pub date_sent: Option<String>,
}

/// A call resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallResource {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A Lookup v2 phone number resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhoneNumberResource {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub national_format: Option<String>,
    /// `false` when the number failed validation; absent on older responses.
    #[serde(default)]
    pub valid: Option<bool>,
}
