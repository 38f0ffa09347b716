//! Twilio REST and Lookup HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::TwilioConfig;
use crate::error::{Result, TwilioError};
use crate::resources::{CallResource, MessageResource, NewCall, NewMessage, PhoneNumberResource};

/// REST API version path segment.
const API_VERSION: &str = "2010-04-01";

/// The Twilio operations the messaging adapter needs.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Create (send) a message.
    async fn create_message(&self, message: &NewMessage) -> Result<MessageResource>;

    /// Start an outbound call.
    async fn create_call(&self, call: &NewCall) -> Result<CallResource>;

    /// Fetch a message by SID.
    async fn fetch_message(&self, sid: &str) -> Result<MessageResource>;

    /// Look up a phone number. Unknown numbers fail with
    /// [`TwilioError::NotFound`].
    async fn lookup_phone_number(&self, number: &str) -> Result<PhoneNumberResource>;
}

/// Authenticated Twilio client.
pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    api_base: Url,
    lookups_base: Url,
    timeout: Duration,
}

impl TwilioClient {
    /// Build a client from configuration.
    pub fn new(config: &TwilioConfig) -> Result<Self> {
        let api_base = Url::parse(&config.api_base_url)?;
        let lookups_base = Url::parse(&config.lookups_base_url)?;
        for base in [&api_base, &lookups_base] {
            if base.cannot_be_a_base() {
                return Err(TwilioError::Config(format!("not a base URL: {}", base)));
            }
        }

        let http = reqwest::Client::builder()
            .user_agent(format!("courier-twilio/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TwilioError::Config(e.to_string()))?;

        Ok(Self {
            http,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            api_base,
            lookups_base,
            timeout: config.timeout,
        })
    }

    /// Append percent-encoded path segments to `base`.
    fn join(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| TwilioError::Config(format!("not a base URL: {}", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL under `/2010-04-01/Accounts/{sid}/`.
    fn account_url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec![API_VERSION, "Accounts", self.account_sid.as_str()];
        all.extend_from_slice(segments);
        Self::join(&self.api_base, &all)
    }

    async fn post_form<T: DeserializeOwned>(&self, url: Url, form: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .timeout(self.timeout)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .timeout(self.timeout)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            let err = TwilioError::from_response(status.as_u16(), &body);
            if err.is_auth_error() {
                tracing::error!(status = status.as_u16(), "Twilio rejected the account credentials");
            } else {
                tracing::debug!(status = status.as_u16(), error = %err, "Twilio request failed");
            }
            Err(err)
        }
    }
}

#[async_trait]
impl MessagingApi for TwilioClient {
    async fn create_message(&self, message: &NewMessage) -> Result<MessageResource> {
        let url = self.account_url(&["Messages.json"])?;
        let created: MessageResource = self.post_form(url, &message.form()).await?;
        tracing::info!(sid = %created.sid, status = ?created.status, "message created");
        Ok(created)
    }

    async fn create_call(&self, call: &NewCall) -> Result<CallResource> {
        let url = self.account_url(&["Calls.json"])?;
        let created: CallResource = self.post_form(url, &call.form()).await?;
        tracing::info!(sid = %created.sid, status = ?created.status, "call created");
        Ok(created)
    }

    async fn fetch_message(&self, sid: &str) -> Result<MessageResource> {
        let resource = format!("{}.json", sid);
        let url = self.account_url(&["Messages", &resource])?;
        self.get(url).await
    }

    async fn lookup_phone_number(&self, number: &str) -> Result<PhoneNumberResource> {
        let url = Self::join(&self.lookups_base, &["v2", "PhoneNumbers", number])?;
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TwilioClient {
        let config = TwilioConfig::new("AC123", "tok").with_base_url(server.uri());
        TwilioClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_create_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(basic_auth("AC123", "tok"))
            .and(body_string_contains("To=%2B27821234567"))
            .and(body_string_contains("From=%2B15550001111"))
            .and(body_string_contains("Body=Hello+there"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sid": "SM0001",
                "status": "queued",
                "to": "+27821234567",
                "date_sent": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_message(&NewMessage {
                to: "+27821234567".into(),
                from: Some("+15550001111".into()),
                body: "Hello there".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.sid, "SM0001");
    }

    #[tokio::test]
    async fn test_create_message_without_from() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sid": "SM2"})))
            .mount(&server)
            .await;

        client_for(&server)
            .create_message(&NewMessage {
                to: "+1555".into(),
                from: None,
                body: "x".into(),
            })
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(!body.contains("From="));
    }

    #[tokio::test]
    async fn test_create_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Calls.json"))
            .and(body_string_contains("Twiml=%3CResponse%3E"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sid": "CA0001",
                "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_call(&NewCall {
                to: "+1555".into(),
                from: Some("+1666".into()),
                twiml: "<Response><Say>Hi</Say></Response>".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.sid, "CA0001");
    }

    #[tokio::test]
    async fn test_fetch_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2010-04-01/Accounts/AC123/Messages/SM0001.json"))
            .and(basic_auth("AC123", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sid": "SM0001",
                "status": "delivered",
                "to": "+27821234567",
                "date_sent": "Thu, 30 Jul 2015 20:12:33 +0000"
            })))
            .mount(&server)
            .await;

        let msg = client_for(&server).fetch_message("SM0001").await.unwrap();
        assert_eq!(msg.status.as_deref(), Some("delivered"));
        assert_eq!(
            msg.date_sent.as_deref(),
            Some("Thu, 30 Jul 2015 20:12:33 +0000")
        );
    }

    #[tokio::test]
    async fn test_lookup_encodes_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/PhoneNumbers/+27%2082%20123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "phone_number": "+2782123",
                "country_code": "ZA",
                "national_format": "082 123",
                "valid": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = client_for(&server)
            .lookup_phone_number("+27 82 123")
            .await
            .unwrap();
        assert_eq!(lookup.country_code.as_deref(), Some("ZA"));
    }

    #[tokio::test]
    async fn test_lookup_slash_does_not_escape_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/PhoneNumbers/1%2F2"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .lookup_phone_number("1/2")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/PhoneNumbers/12345"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": 20404,
                "message": "The requested resource /PhoneNumbers/12345 was not found",
                "status": 404
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .lookup_phone_number("12345")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": 20003,
                "message": "Authenticate",
                "status": 401
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_message(&NewMessage {
                to: "+1".into(),
                from: None,
                body: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
        assert_eq!(err.to_string(), "Authenticate");
    }

    #[tokio::test]
    async fn test_separate_lookup_base() {
        let api = MockServer::start().await;
        let lookups = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/PhoneNumbers/+1555"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
            .expect(1)
            .mount(&lookups)
            .await;

        let mut config = TwilioConfig::new("AC123", "tok").with_base_url(api.uri());
        config.lookups_base_url = lookups.uri();
        let client = TwilioClient::new(&config).unwrap();
        client.lookup_phone_number("+1555").await.unwrap();
        assert!(api.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_base_url() {
        let mut config = TwilioConfig::new("AC1", "t");
        config.api_base_url = "mailto:ops@example.com".into();
        assert!(matches!(
            TwilioClient::new(&config),
            Err(TwilioError::Config(_))
        ));
    }
}
