//! SMS and WhatsApp reminders via the Twilio messaging API.
//!
//! Both channels POST the same form to the account's `Messages.json`
//! endpoint. WhatsApp writes the sender and recipient as
//! `whatsapp:+<number>`; SMS sends the numbers as configured.

use std::time::Duration;

use async_trait::async_trait;
use fleetdocs_core::validation::{require_non_empty, validate_e164};
use fleetdocs_core::{Channel, CoreError, Message};
use serde::Deserialize;

use crate::notifier::{DeliveryError, Notifier, NotifierSession};

/// Production Twilio API origin.
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for Twilio delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Twilio answered with a non-2xx status.
    #[error("Twilio returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

/// Error body returned by the Twilio REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<i64>,
}

// ---------------------------------------------------------------------------
// TwilioConfig
// ---------------------------------------------------------------------------

/// Twilio account and addressing settings shared by SMS and WhatsApp.
#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 form.
    pub from_number: String,
    /// Recipient number in E.164 form.
    pub to_number: String,
    /// API origin; overridden in tests.
    pub api_base: String,
}

impl TwilioConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable             | Required | Default                  |
    /// |----------------------|----------|--------------------------|
    /// | `TWILIO_ACCOUNT_SID` | yes      | -                        |
    /// | `TWILIO_AUTH_TOKEN`  | yes      | -                        |
    /// | `TWILIO_FROM_NUMBER` | yes      | -                        |
    /// | `REMINDER_PHONE_TO`  | yes      | -                        |
    /// | `TWILIO_API_BASE`    | no       | `https://api.twilio.com` |
    pub fn from_env() -> Result<Self, CoreError> {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let config = Self {
            account_sid: var("TWILIO_ACCOUNT_SID"),
            auth_token: var("TWILIO_AUTH_TOKEN"),
            from_number: var("TWILIO_FROM_NUMBER"),
            to_number: var("REMINDER_PHONE_TO"),
            api_base: std::env::var("TWILIO_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TWILIO_API_BASE.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_empty(&self.account_sid, "TWILIO_ACCOUNT_SID")?;
        require_non_empty(&self.auth_token, "TWILIO_AUTH_TOKEN")?;
        validate_e164(&self.from_number, "TWILIO_FROM_NUMBER")?;
        validate_e164(&self.to_number, "REMINDER_PHONE_TO")?;
        require_non_empty(&self.api_base, "TWILIO_API_BASE")?;
        Ok(())
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim().trim_end_matches('/'),
            self.account_sid.trim()
        )
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &"<redacted>")
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .field("api_base", &self.api_base)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TwilioNotifier
// ---------------------------------------------------------------------------

/// Sends reminders as SMS or WhatsApp messages.
#[derive(Debug)]
pub struct TwilioNotifier {
    config: TwilioConfig,
    channel: Channel,
    client: reqwest::Client,
}

impl TwilioNotifier {
    /// Build a notifier for [`Channel::Sms`] or [`Channel::WhatsApp`].
    pub fn new(config: TwilioConfig, channel: Channel) -> Result<Self, CoreError> {
        if !channel.is_phone() {
            return Err(CoreError::Config(format!(
                "Twilio cannot deliver the {channel} channel"
            )));
        }
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            channel,
            client,
        })
    }

    /// Sender and recipient as written for this channel.
    pub fn addresses(&self) -> (String, String) {
        (
            self.channel.address(self.config.from_number.trim()),
            self.channel.address(self.config.to_number.trim()),
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn open(&self) -> Result<Box<dyn NotifierSession>, DeliveryError> {
        let (from, to) = self.addresses();
        Ok(Box::new(TwilioSession {
            client: self.client.clone(),
            url: self.config.messages_url(),
            account_sid: self.config.account_sid.trim().to_string(),
            auth_token: self.config.auth_token.clone(),
            from,
            to,
        }))
    }
}

// ---------------------------------------------------------------------------
// TwilioSession
// ---------------------------------------------------------------------------

struct TwilioSession {
    client: reqwest::Client,
    url: String,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
}

#[async_trait]
impl NotifierSession for TwilioSession {
    async fn send(&mut self, message: &Message) -> Result<(), DeliveryError> {
        let form = [
            ("From", self.from.as_str()),
            ("To", self.to.as_str()),
            ("Body", message.body.as_str()),
        ];

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(TwilioError::from)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(ApiErrorBody {
                    message: Some(m),
                    code: Some(code),
                }) => format!("{m} (code {code})"),
                Ok(ApiErrorBody {
                    message: Some(m), ..
                }) => m,
                _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(())
    }

    async fn close(&mut self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{basic_auth, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MESSAGES_PATH: &str = "/2010-04-01/Accounts/AC123/Messages.json";

    fn config(api_base: &str) -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret-token".to_string(),
            from_number: "+1234567890".to_string(),
            to_number: "+966501234567".to_string(),
            api_base: api_base.to_string(),
        }
    }

    fn message() -> Message {
        let text = "Reminder: Inspection for TRK-12 expires on 2024-04-01".to_string();
        Message {
            subject: text.clone(),
            body: text,
        }
    }

    // -----------------------------------------------------------------------
    // Addressing
    // -----------------------------------------------------------------------

    #[test]
    fn whatsapp_prefixes_both_addresses() {
        let notifier =
            TwilioNotifier::new(config(DEFAULT_TWILIO_API_BASE), Channel::WhatsApp).unwrap();
        assert_eq!(
            notifier.addresses(),
            (
                "whatsapp:+1234567890".to_string(),
                "whatsapp:+966501234567".to_string()
            )
        );
    }

    #[test]
    fn sms_leaves_addresses_unchanged() {
        let notifier = TwilioNotifier::new(config(DEFAULT_TWILIO_API_BASE), Channel::Sms).unwrap();
        assert_eq!(
            notifier.addresses(),
            ("+1234567890".to_string(), "+966501234567".to_string())
        );
    }

    #[test]
    fn email_channel_is_rejected() {
        assert_matches!(
            TwilioNotifier::new(config(DEFAULT_TWILIO_API_BASE), Channel::Email),
            Err(CoreError::Config(_))
        );
    }

    #[test]
    fn placeholder_number_is_a_config_error() {
        let cfg = TwilioConfig {
            to_number: "+9665XXXXXXX".to_string(),
            ..config(DEFAULT_TWILIO_API_BASE)
        };
        assert_matches!(
            TwilioNotifier::new(cfg, Channel::Sms),
            Err(CoreError::Config(msg)) if msg.contains("REMINDER_PHONE_TO")
        );
    }

    #[test]
    fn empty_token_is_a_config_error() {
        let cfg = TwilioConfig {
            auth_token: " ".to_string(),
            ..config(DEFAULT_TWILIO_API_BASE)
        };
        assert!(TwilioNotifier::new(cfg, Channel::WhatsApp).is_err());
    }

    #[test]
    fn messages_url_tolerates_trailing_slash() {
        assert_eq!(
            config("http://localhost:8080/").messages_url(),
            "http://localhost:8080/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let rendered = format!("{:?}", config(DEFAULT_TWILIO_API_BASE));
        assert!(!rendered.contains("secret-token"));
        assert!(!rendered.contains("AC123"));
    }

    // -----------------------------------------------------------------------
    // HTTP
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn whatsapp_send_posts_prefixed_addresses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .and(basic_auth("AC123", "secret-token"))
            .and(body_string_contains("From=whatsapp%3A%2B1234567890"))
            .and(body_string_contains("To=whatsapp%3A%2B966501234567"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"sid": "SM1"})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TwilioNotifier::new(config(&server.uri()), Channel::WhatsApp).unwrap();
        let mut session = notifier.open().await.unwrap();
        session.send(&message()).await.unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn sms_send_posts_plain_addresses_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let notifier = TwilioNotifier::new(config(&server.uri()), Channel::Sms).unwrap();
        let mut session = notifier.open().await.unwrap();
        session.send(&message()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(body.contains("From=%2B1234567890"));
        assert!(body.contains("To=%2B966501234567"));
        assert!(!body.contains("whatsapp"));
        assert!(body.contains("Body=Reminder%3A+Inspection+for+TRK-12+expires+on+2024-04-01"));
    }

    #[tokio::test]
    async fn api_error_is_reported_with_twilio_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let notifier = TwilioNotifier::new(config(&server.uri()), Channel::Sms).unwrap();
        let mut session = notifier.open().await.unwrap();
        let err = session.send(&message()).await.unwrap_err();

        assert_matches!(
            err,
            DeliveryError::Twilio(TwilioError::Api { status: 400, ref message })
                if message == "The 'To' number is not a valid phone number. (code 21211)"
        );
    }

    #[tokio::test]
    async fn api_error_without_body_uses_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let notifier = TwilioNotifier::new(config(&server.uri()), Channel::WhatsApp).unwrap();
        let mut session = notifier.open().await.unwrap();
        let err = session.send(&message()).await.unwrap_err();
        assert_eq!(err.to_string(), "Twilio returned HTTP 503: Service Unavailable");
    }
}
