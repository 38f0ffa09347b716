//! Messaging tool catalog and handlers.

use std::sync::Arc;

use async_trait::async_trait;
use courier_mcp::{
    FieldKind, ServerInfo, ToolAdapter, ToolCatalog, ToolDescriptor, ToolError, decode_call,
};
use serde::Deserialize;
use serde_json::Value;

use crate::client::MessagingApi;
use crate::error::TwilioError;
use crate::resources::{NewCall, NewMessage, PhoneNumberResource};

/// Name reported during initialization.
pub const SERVER_NAME: &str = "twilio-mcp-server";

/// Version reported during initialization.
pub const SERVER_VERSION: &str = "1.0.0";

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Build the messaging tool catalog.
pub fn catalog() -> ToolCatalog {
    ToolCatalog::new(vec![
        ToolDescriptor::new("send_sms", "Send an SMS message using Twilio")
            .required(
                "to",
                FieldKind::String,
                "Recipient phone number (with country code, e.g., +1234567890)",
            )
            .required("body", FieldKind::String, "SMS message content")
            .optional(
                "from",
                FieldKind::String,
                "Sender phone number (optional, uses default if not provided)",
            ),
        ToolDescriptor::new("send_whatsapp", "Send a WhatsApp message using Twilio")
            .required(
                "to",
                FieldKind::String,
                "Recipient WhatsApp number (with country code)",
            )
            .required("body", FieldKind::String, "WhatsApp message content")
            .optional("from", FieldKind::String, "Sender WhatsApp number (optional)"),
        ToolDescriptor::new("make_call", "Make a voice call using Twilio")
            .required("to", FieldKind::String, "Recipient phone number")
            .required("message", FieldKind::String, "Text to speak during the call")
            .optional("from", FieldKind::String, "Caller phone number (optional)"),
        ToolDescriptor::new("check_phone_number", "Lookup and validate a phone number")
            .required("phoneNumber", FieldKind::String, "Phone number to validate"),
        ToolDescriptor::new("get_message_status", "Get the status of a sent message")
            .required("messageSid", FieldKind::String, "Message SID from Twilio"),
    ])
}

#[derive(Debug, Deserialize)]
struct SendArgs {
    to: String,
    body: String,
    #[serde(default)]
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallArgs {
    to: String,
    message: String,
    #[serde(default)]
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckPhoneArgs {
    phone_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageStatusArgs {
    message_sid: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "tool", content = "arguments", rename_all = "snake_case")]
enum MessagingCall {
    SendSms(SendArgs),
    SendWhatsapp(SendArgs),
    MakeCall(CallArgs),
    CheckPhoneNumber(CheckPhoneArgs),
    GetMessageStatus(MessageStatusArgs),
}

/// Result of a carrier lookup.
///
/// Callers only ever see "valid" or "appears to be invalid"; the split
/// between a number that is known bad and a lookup that could not be made
/// is kept for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneLookup {
    /// The number exists and validated.
    Valid {
        country_code: Option<String>,
        national_format: Option<String>,
    },
    /// The vendor says the number is not valid.
    Invalid,
    /// The lookup itself failed.
    Unavailable(String),
}

impl PhoneLookup {
    /// Classify a lookup result.
    pub fn classify(result: Result<PhoneNumberResource, TwilioError>) -> Self {
        match result {
            Ok(PhoneNumberResource {
                valid: Some(false), ..
            }) => PhoneLookup::Invalid,
            Ok(found) => PhoneLookup::Valid {
                country_code: found.country_code,
                national_format: found.national_format,
            },
            Err(e) if e.is_not_found() => PhoneLookup::Invalid,
            Err(TwilioError::Api { status: 400, .. }) => PhoneLookup::Invalid,
            Err(e) => PhoneLookup::Unavailable(e.to_string()),
        }
    }

    /// Reply text for `number`.
    pub fn render(&self, number: &str) -> String {
        match self {
            PhoneLookup::Valid {
                country_code,
                national_format,
            } => format!(
                "Phone number {} is valid. Country: {}, Type: {}",
                number,
                country_code.as_deref().unwrap_or("unknown"),
                national_format.as_deref().unwrap_or("unknown"),
            ),
            PhoneLookup::Invalid | PhoneLookup::Unavailable(_) => {
                format!("Phone number {} appears to be invalid", number)
            }
        }
    }
}

/// Add the `whatsapp:` channel prefix unless already present.
fn whatsapp_address(number: &str) -> String {
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

/// Escape text for inclusion in a TwiML element.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// TwiML that speaks `message` once.
pub fn say_twiml(message: &str) -> String {
    format!("<Response><Say>{}</Say></Response>", escape_xml(message))
}

/// The messaging adapter: catalog plus Twilio-backed handlers.
pub struct MessagingAdapter {
    api: Arc<dyn MessagingApi>,
    phone_number: Option<String>,
    whatsapp_number: Option<String>,
    catalog: ToolCatalog,
}

impl MessagingAdapter {
    /// Create an adapter over `api` with optional default senders.
    pub fn new(
        api: Arc<dyn MessagingApi>,
        phone_number: Option<String>,
        whatsapp_number: Option<String>,
    ) -> Self {
        Self {
            api,
            phone_number,
            whatsapp_number,
            catalog: catalog(),
        }
    }

    fn voice_sender(&self, from: Option<String>) -> Option<String> {
        from.filter(|f| !f.is_empty())
            .or_else(|| self.phone_number.clone())
    }

    async fn send_sms(&self, args: SendArgs) -> Result<String, ToolError> {
        let message = NewMessage {
            to: args.to,
            from: self.voice_sender(args.from),
            body: args.body,
        };
        let created = self
            .api
            .create_message(&message)
            .await
            .map_err(ToolError::vendor)?;
        Ok(format!("SMS sent successfully. Message SID: {}", created.sid))
    }

    async fn send_whatsapp(&self, args: SendArgs) -> Result<String, ToolError> {
        let from = args
            .from
            .filter(|f| !f.is_empty())
            .or_else(|| self.whatsapp_number.clone());
        let message = NewMessage {
            to: whatsapp_address(&args.to),
            from: from.as_deref().map(whatsapp_address),
            body: args.body,
        };
        let created = self
            .api
            .create_message(&message)
            .await
            .map_err(ToolError::vendor)?;
        Ok(format!("WhatsApp message sent. Message SID: {}", created.sid))
    }

    async fn make_call(&self, args: CallArgs) -> Result<String, ToolError> {
        let call = NewCall {
            to: args.to,
            from: self.voice_sender(args.from),
            twiml: say_twiml(&args.message),
        };
        let created = self.api.create_call(&call).await.map_err(ToolError::vendor)?;
        Ok(format!("Call initiated. Call SID: {}", created.sid))
    }

    async fn check_phone_number(&self, args: CheckPhoneArgs) -> String {
        let lookup = PhoneLookup::classify(self.api.lookup_phone_number(&args.phone_number).await);
        match &lookup {
            PhoneLookup::Valid { .. } => {}
            PhoneLookup::Invalid => {
                tracing::info!(number = %args.phone_number, "number rejected by lookup")
            }
            PhoneLookup::Unavailable(reason) => {
                tracing::warn!(number = %args.phone_number, error = %reason, "lookup failed")
            }
        }
        lookup.render(&args.phone_number)
    }

    async fn get_message_status(&self, args: MessageStatusArgs) -> Result<String, ToolError> {
        let message = self
            .api
            .fetch_message(&args.message_sid)
            .await
            .map_err(ToolError::vendor)?;
        Ok(format!(
            "Message Status: {}, To: {}, Sent: {}",
            message.status.as_deref().unwrap_or("unknown"),
            message.to.as_deref().unwrap_or("unknown"),
            message.date_sent.as_deref().unwrap_or("not yet sent"),
        ))
    }
}

#[async_trait]
impl ToolAdapter for MessagingAdapter {
    fn server_info(&self) -> ServerInfo {
        ServerInfo::new(SERVER_NAME, SERVER_VERSION)
    }

    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn invoke(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        match decode_call::<MessagingCall>(name, arguments)? {
            MessagingCall::SendSms(args) => self.send_sms(args).await,
            MessagingCall::SendWhatsapp(args) => self.send_whatsapp(args).await,
            MessagingCall::MakeCall(args) => self.make_call(args).await,
            MessagingCall::CheckPhoneNumber(args) => Ok(self.check_phone_number(args).await),
            MessagingCall::GetMessageStatus(args) => self.get_message_status(args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{CallResource, MessageResource};
    use courier_mcp::{Dispatcher, ToolOutcome};
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory Twilio that records requests.
    #[derive(Default)]
    struct MockApi {
        messages: Mutex<Vec<NewMessage>>,
        calls: Mutex<Vec<NewCall>>,
        fail_with: Mutex<Option<TwilioError>>,
        lookup: Mutex<Option<Result<PhoneNumberResource, TwilioError>>>,
        stored: Mutex<Option<MessageResource>>,
    }

    impl MockApi {
        fn take_failure(&self) -> crate::error::Result<()> {
            match self.fail_with.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl MessagingApi for MockApi {
        async fn create_message(
            &self,
            message: &NewMessage,
        ) -> crate::error::Result<MessageResource> {
            self.take_failure()?;
            let mut messages = self.messages.lock().unwrap();
            messages.push(message.clone());
            Ok(MessageResource {
                sid: format!("SM{:04}", messages.len()),
                status: Some("queued".into()),
                to: Some(message.to.clone()),
                from: message.from.clone(),
                date_sent: None,
            })
        }

        async fn create_call(&self, call: &NewCall) -> crate::error::Result<CallResource> {
            self.take_failure()?;
            self.calls.lock().unwrap().push(call.clone());
            Ok(CallResource {
                sid: "CA0001".into(),
                status: Some("queued".into()),
            })
        }

        async fn fetch_message(&self, sid: &str) -> crate::error::Result<MessageResource> {
            self.take_failure()?;
            self.stored
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| TwilioError::NotFound(format!("message {} not found", sid)))
        }

        async fn lookup_phone_number(
            &self,
            _number: &str,
        ) -> crate::error::Result<PhoneNumberResource> {
            self.lookup
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(TwilioError::NotFound("not found".into())))
        }
    }

    fn setup(
        phone: Option<&str>,
        whatsapp: Option<&str>,
    ) -> (Arc<MockApi>, Dispatcher) {
        let api = Arc::new(MockApi::default());
        let adapter = MessagingAdapter::new(
            api.clone(),
            phone.map(str::to_string),
            whatsapp.map(str::to_string),
        );
        (api, Dispatcher::new(Arc::new(adapter)))
    }

    #[test]
    fn test_catalog() {
        let catalog = catalog();
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec![
                "send_sms",
                "send_whatsapp",
                "make_call",
                "check_phone_number",
                "get_message_status"
            ]
        );
        let schema = catalog.get("check_phone_number").unwrap().input_schema();
        assert_eq!(schema["required"], json!(["phoneNumber"]));
    }

    #[tokio::test]
    async fn test_send_sms_uses_configured_default_from() {
        let (api, dispatcher) = setup(Some("+15550001111"), None);
        let outcome = dispatcher
            .dispatch(
                "send_sms",
                Some(json!({"to": "+27821234567", "body": "Hello"})),
            )
            .await;

        assert_eq!(
            outcome,
            ToolOutcome::Success("SMS sent successfully. Message SID: SM0001".into())
        );
        let sent = api.messages.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![NewMessage {
                to: "+27821234567".into(),
                from: Some("+15550001111".into()),
                body: "Hello".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_send_sms_without_any_from() {
        let (api, dispatcher) = setup(None, None);
        let outcome = dispatcher
            .dispatch(
                "send_sms",
                Some(json!({"to": "+27821234567", "body": "Hello"})),
            )
            .await;
        assert!(outcome.is_success());
        assert_eq!(api.messages.lock().unwrap()[0].from, None);
    }

    #[tokio::test]
    async fn test_send_sms_explicit_from_wins() {
        let (api, dispatcher) = setup(Some("+15550001111"), None);
        dispatcher
            .dispatch(
                "send_sms",
                Some(json!({"to": "+1", "body": "x", "from": "+19998887777"})),
            )
            .await;
        assert_eq!(
            api.messages.lock().unwrap()[0].from.as_deref(),
            Some("+19998887777")
        );
    }

    #[tokio::test]
    async fn test_send_whatsapp_prefixes_both_addresses() {
        let (api, dispatcher) = setup(Some("+15550001111"), Some("+14155238886"));
        let outcome = dispatcher
            .dispatch(
                "send_whatsapp",
                Some(json!({"to": "+27821234567", "body": "Order shipped"})),
            )
            .await;

        assert_eq!(outcome.text(), "WhatsApp message sent. Message SID: SM0001");
        let sent = api.messages.lock().unwrap()[0].clone();
        assert_eq!(sent.to, "whatsapp:+27821234567");
        assert_eq!(sent.from.as_deref(), Some("whatsapp:+14155238886"));
    }

    #[tokio::test]
    async fn test_send_whatsapp_does_not_double_prefix() {
        let (api, dispatcher) = setup(None, None);
        dispatcher
            .dispatch(
                "send_whatsapp",
                Some(json!({"to": "whatsapp:+1555", "body": "x", "from": "+1666"})),
            )
            .await;
        let sent = api.messages.lock().unwrap()[0].clone();
        assert_eq!(sent.to, "whatsapp:+1555");
        assert_eq!(sent.from.as_deref(), Some("whatsapp:+1666"));
    }

    #[tokio::test]
    async fn test_make_call_escapes_message() {
        let (api, dispatcher) = setup(Some("+15550001111"), None);
        let outcome = dispatcher
            .dispatch(
                "make_call",
                Some(json!({"to": "+1555", "message": "Order <42> & more"})),
            )
            .await;

        assert_eq!(outcome.text(), "Call initiated. Call SID: CA0001");
        let call = api.calls.lock().unwrap()[0].clone();
        assert_eq!(
            call.twiml,
            "<Response><Say>Order &lt;42&gt; &amp; more</Say></Response>"
        );
        assert_eq!(call.from.as_deref(), Some("+15550001111"));
    }

    #[tokio::test]
    async fn test_vendor_failure_then_recovery() {
        let (api, dispatcher) = setup(Some("+1"), None);
        *api.fail_with.lock().unwrap() = Some(TwilioError::Api {
            status: 401,
            code: Some(20003),
            message: "Authenticate".into(),
        });

        let args = json!({"to": "+27821234567", "body": "Hello"});
        let failed = dispatcher.dispatch("send_sms", Some(args.clone())).await;
        let result = failed.into_call_result();
        assert_eq!(result.text(), "Error: Authenticate");
        assert!(result.is_error());

        let ok = dispatcher.dispatch("send_sms", Some(args)).await;
        assert!(ok.is_success());
    }

    #[tokio::test]
    async fn test_check_phone_number_valid() {
        let (api, dispatcher) = setup(None, None);
        *api.lookup.lock().unwrap() = Some(Ok(PhoneNumberResource {
            phone_number: Some("+27821234567".into()),
            country_code: Some("ZA".into()),
            national_format: Some("082 123 4567".into()),
            valid: Some(true),
        }));

        let outcome = dispatcher
            .dispatch(
                "check_phone_number",
                Some(json!({"phoneNumber": "+27821234567"})),
            )
            .await;
        assert_eq!(
            outcome.text(),
            "Phone number +27821234567 is valid. Country: ZA, Type: 082 123 4567"
        );
    }

    #[tokio::test]
    async fn test_check_phone_number_not_found_is_not_an_error() {
        let (_, dispatcher) = setup(None, None);
        let outcome = dispatcher
            .dispatch("check_phone_number", Some(json!({"phoneNumber": "12345"})))
            .await;
        assert_eq!(
            outcome,
            ToolOutcome::Success("Phone number 12345 appears to be invalid".into())
        );
    }

    #[tokio::test]
    async fn test_check_phone_number_lookup_unavailable() {
        let (api, dispatcher) = setup(None, None);
        *api.lookup.lock().unwrap() = Some(Err(TwilioError::Api {
            status: 500,
            code: None,
            message: "HTTP 500".into(),
        }));
        let outcome = dispatcher
            .dispatch("check_phone_number", Some(json!({"phoneNumber": "+1555"})))
            .await;
        assert_eq!(outcome.text(), "Phone number +1555 appears to be invalid");
        assert!(outcome.is_success());
    }

    #[test]
    fn test_lookup_classification() {
        assert_eq!(
            PhoneLookup::classify(Ok(PhoneNumberResource {
                phone_number: None,
                country_code: None,
                national_format: None,
                valid: Some(false),
            })),
            PhoneLookup::Invalid
        );
        assert_eq!(
            PhoneLookup::classify(Err(TwilioError::NotFound("gone".into()))),
            PhoneLookup::Invalid
        );
        assert_eq!(
            PhoneLookup::classify(Err(TwilioError::Api {
                status: 401,
                code: Some(20003),
                message: "Authenticate".into(),
            })),
            PhoneLookup::Unavailable("Authenticate".into())
        );
        let valid = PhoneLookup::Valid {
            country_code: Some("US".into()),
            national_format: None,
        };
        assert_eq!(
            valid.render("+1555"),
            "Phone number +1555 is valid. Country: US, Type: unknown"
        );
    }

    #[tokio::test]
    async fn test_get_message_status() {
        let (api, dispatcher) = setup(None, None);
        *api.stored.lock().unwrap() = Some(MessageResource {
            sid: "SM1".into(),
            status: Some("delivered".into()),
            to: Some("+27821234567".into()),
            from: None,
            date_sent: Some("Thu, 30 Jul 2015 20:12:33 +0000".into()),
        });

        let outcome = dispatcher
            .dispatch("get_message_status", Some(json!({"messageSid": "SM1"})))
            .await;
        assert_eq!(
            outcome.text(),
            "Message Status: delivered, To: +27821234567, Sent: Thu, 30 Jul 2015 20:12:33 +0000"
        );
    }

    #[tokio::test]
    async fn test_get_message_status_not_yet_sent() {
        let (api, dispatcher) = setup(None, None);
        *api.stored.lock().unwrap() = Some(MessageResource {
            sid: "SM1".into(),
            status: Some("queued".into()),
            to: Some("+1".into()),
            from: None,
            date_sent: None,
        });
        let outcome = dispatcher
            .dispatch("get_message_status", Some(json!({"messageSid": "SM1"})))
            .await;
        assert_eq!(
            outcome.text(),
            "Message Status: queued, To: +1, Sent: not yet sent"
        );
    }

    #[tokio::test]
    async fn test_get_message_status_unknown_sid_is_error() {
        let (_, dispatcher) = setup(None, None);
        let outcome = dispatcher
            .dispatch("get_message_status", Some(json!({"messageSid": "SMX"})))
            .await;
        assert_eq!(outcome.text(), "Error: message SMX not found");
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let (api, dispatcher) = setup(Some("+1"), None);
        let outcome = dispatcher.dispatch("make_call", Some(json!({"to": "+1"}))).await;
        assert!(
            outcome
                .text()
                .starts_with("Error: Invalid arguments for make_call:")
        );
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a'b\"c"), "a&apos;b&quot;c");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
