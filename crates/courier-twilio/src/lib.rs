//! Twilio messaging adapter for the Courier MCP runtime.
//!
//! Tools: `send_sms`, `send_whatsapp`, `make_call`, `check_phone_number`
//! and `get_message_status`. Outbound senders fall back to the numbers
//! configured in the environment when a call does not name one.
//!
//! `check_phone_number` never reports an error to the caller. Lookup
//! failures are classified as [`PhoneLookup::Invalid`] or
//! [`PhoneLookup::Unavailable`] and both read as "appears to be invalid".

pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod tools;

pub use client::{MessagingApi, TwilioClient};
pub use config::TwilioConfig;
pub use error::{Result, TwilioError};
pub use resources::{CallResource, MessageResource, NewCall, NewMessage, PhoneNumberResource};
pub use tools::{MessagingAdapter, PhoneLookup, SERVER_NAME, SERVER_VERSION, catalog, say_twiml};
