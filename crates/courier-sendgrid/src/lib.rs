//! SendGrid email adapter for the Courier MCP runtime.
//!
//! Exposes four tools over MCP:
//! - `send_email`: plain or HTML message
//! - `send_template_email`: dynamic template with data
//! - `verify_email`: local syntax check, no API call
//! - `get_domain_authentication_status`: placeholder reply
//!
//! The HTTP client sits behind [`MailSender`] so the adapter can be tested
//! without the network.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod tools;

pub use client::{MailSender, SendGridClient, SendReceipt};
pub use config::SendGridConfig;
pub use error::{Result, SendGridError};
pub use message::MailMessage;
pub use tools::{EmailAdapter, SERVER_NAME, SERVER_VERSION, catalog, is_valid_email_syntax};
