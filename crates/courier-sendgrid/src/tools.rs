//! Email tool catalog and handlers.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use courier_mcp::{
    FieldKind, ServerInfo, ToolAdapter, ToolCatalog, ToolDescriptor, ToolError, decode_call,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::MailSender;
use crate::message::MailMessage;

/// Name reported during initialization.
pub const SERVER_NAME: &str = "sendgrid-mcp-server";

/// Version reported during initialization.
pub const SERVER_VERSION: &str = "1.0.0";

/// Build the email tool catalog.
pub fn catalog() -> ToolCatalog {
    ToolCatalog::new(vec![
        ToolDescriptor::new("send_email", "Send an email using SendGrid")
            .required("to", FieldKind::String, "Recipient email address")
            .required("subject", FieldKind::String, "Email subject")
            .optional("text", FieldKind::String, "Plain text content")
            .optional("html", FieldKind::String, "HTML content")
            .optional(
                "from",
                FieldKind::String,
                "Sender email address (optional, uses default if not provided)",
            ),
        ToolDescriptor::new(
            "send_template_email",
            "Send an email using a SendGrid template",
        )
        .required("to", FieldKind::String, "Recipient email address")
        .required("templateId", FieldKind::String, "SendGrid template ID")
        .optional("dynamicData", FieldKind::Object, "Dynamic template data")
        .optional("from", FieldKind::String, "Sender email address (optional)"),
        ToolDescriptor::new(
            "verify_email",
            "Verify if an email address is valid (syntax check only)",
        )
        .required("email", FieldKind::String, "Email address to verify"),
        ToolDescriptor::new(
            "get_domain_authentication_status",
            "Check domain authentication status (requires API key with appropriate permissions)",
        )
        .required("domain", FieldKind::String, "Domain to check"),
    ])
}

#[derive(Debug, Deserialize)]
struct SendEmailArgs {
    to: String,
    subject: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendTemplateEmailArgs {
    to: String,
    template_id: String,
    #[serde(default)]
    dynamic_data: Option<Map<String, Value>>,
    #[serde(default)]
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyEmailArgs {
    email: String,
}

#[derive(Debug, Deserialize)]
struct DomainArgs {
    domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "tool", content = "arguments", rename_all = "snake_case")]
enum EmailCall {
    SendEmail(SendEmailArgs),
    SendTemplateEmail(SendTemplateEmailArgs),
    VerifyEmail(VerifyEmailArgs),
    GetDomainAuthenticationStatus(DomainArgs),
}

/// Syntax-only address check: something, `@`, something, `.`, something,
/// with no whitespace and exactly one `@`.
pub fn is_valid_email_syntax(email: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// Treat empty strings the same as absent ones.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The email adapter: catalog plus SendGrid-backed handlers.
pub struct EmailAdapter {
    sender: Arc<dyn MailSender>,
    default_from: String,
    catalog: ToolCatalog,
}

impl EmailAdapter {
    /// Create an adapter over `sender`. `default_from` is used for calls
    /// that do not name a sender.
    pub fn new(sender: Arc<dyn MailSender>, default_from: impl Into<String>) -> Self {
        Self {
            sender,
            default_from: default_from.into(),
            catalog: catalog(),
        }
    }

    fn sender_address(&self, from: Option<String>) -> String {
        non_empty(from).unwrap_or_else(|| self.default_from.clone())
    }

    async fn send_email(&self, args: SendEmailArgs) -> Result<String, ToolError> {
        let from = self.sender_address(args.from);
        let message = MailMessage::simple(
            &args.to,
            from,
            args.subject,
            non_empty(args.text),
            non_empty(args.html),
        );
        self.sender.send(&message).await.map_err(ToolError::vendor)?;
        Ok(format!("Email sent successfully to {}", args.to))
    }

    async fn send_template_email(&self, args: SendTemplateEmailArgs) -> Result<String, ToolError> {
        let from = self.sender_address(args.from);
        let message = MailMessage::template(
            &args.to,
            from,
            args.template_id,
            args.dynamic_data.unwrap_or_default(),
        );
        self.sender.send(&message).await.map_err(ToolError::vendor)?;
        Ok(format!("Template email sent successfully to {}", args.to))
    }
}

#[async_trait]
impl ToolAdapter for EmailAdapter {
    fn server_info(&self) -> ServerInfo {
        ServerInfo::new(SERVER_NAME, SERVER_VERSION)
    }

    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn invoke(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        match decode_call::<EmailCall>(name, arguments)? {
            EmailCall::SendEmail(args) => self.send_email(args).await,
            EmailCall::SendTemplateEmail(args) => self.send_template_email(args).await,
            EmailCall::VerifyEmail(args) => {
                let verdict = if is_valid_email_syntax(&args.email) {
                    "valid"
                } else {
                    "invalid"
                };
                Ok(format!(
                    "Email {} is {} (syntax check only)",
                    args.email, verdict
                ))
            }
            EmailCall::GetDomainAuthenticationStatus(args) => {
                tracing::debug!(domain = %args.domain, "domain authentication check not configured");
                Ok("Domain authentication check requires additional API configuration".to_string())
            }
        }
    }
}
