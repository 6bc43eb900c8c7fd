//! Reminder delivery via SMTP.
//!
//! [`EmailNotifier`] wraps the `lettre` async SMTP transport. A session is one
//! authenticated STARTTLS transport: it is connected and checked when the
//! batch starts, reused for every reminder, and dropped when the batch ends.
//! The SMTP user is also the `From` address.

use async_trait::async_trait;
use fleetdocs_core::validation::require_non_empty;
use fleetdocs_core::{Channel, CoreError, Message};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::notifier::{DeliveryError, Notifier, NotifierSession};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The SMTP server accepted the connection but failed the health check.
    #[error("SMTP server {0} did not pass the connection check")]
    ConnectionCheck(String),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP settings for email reminders.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_server: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// SMTP login, also used as the `From` address.
    pub user: String,
    pub password: String,
    /// Address every reminder is sent to.
    pub recipient: String,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable            | Required | Default |
    /// |---------------------|----------|---------|
    /// | `SMTP_HOST`         | yes      | -       |
    /// | `SMTP_PORT`         | no       | `587`   |
    /// | `SMTP_USER`         | yes      | -       |
    /// | `SMTP_PASSWORD`     | yes      | -       |
    /// | `REMINDER_EMAIL_TO` | yes      | -       |
    pub fn from_env() -> Result<Self, CoreError> {
        let var = |name: &str| std::env::var(name).unwrap_or_default();

        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(port) => port.trim().parse().map_err(|_| {
                CoreError::Config(format!("SMTP_PORT must be a valid port number, got '{port}'"))
            })?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        let config = Self {
            smtp_server: var("SMTP_HOST"),
            smtp_port,
            user: var("SMTP_USER"),
            password: var("SMTP_PASSWORD"),
            recipient: var("REMINDER_EMAIL_TO"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is present.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_empty(&self.smtp_server, "SMTP_HOST")?;
        require_non_empty(&self.user, "SMTP_USER")?;
        require_non_empty(&self.password, "SMTP_PASSWORD")?;
        require_non_empty(&self.recipient, "REMINDER_EMAIL_TO")?;
        if self.smtp_port == 0 {
            return Err(CoreError::Config("SMTP_PORT must not be 0".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EmailNotifier
// ---------------------------------------------------------------------------

/// Sends reminder emails through an SMTP relay.
#[derive(Debug)]
pub struct EmailNotifier {
    config: EmailConfig,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Validate the configuration and parse both mailboxes up front.
    pub fn new(config: EmailConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let from = parse_mailbox(&config.user, "SMTP_USER")?;
        let to = parse_mailbox(&config.recipient, "REMINDER_EMAIL_TO")?;
        Ok(Self { config, from, to })
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(self.config.smtp_server.trim())?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.user.trim().to_string(),
                self.config.password.clone(),
            ))
            .build();
        Ok(transport)
    }
}

fn parse_mailbox(address: &str, name: &str) -> Result<Mailbox, CoreError> {
    address
        .trim()
        .parse()
        .map_err(|e| CoreError::Config(format!("{name} is not a valid email address: {e}")))
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn open(&self) -> Result<Box<dyn NotifierSession>, DeliveryError> {
        let mailer = self.build_transport()?;

        // Connects and authenticates; failures surface before the first send.
        if !mailer.test_connection().await.map_err(EmailError::from)? {
            return Err(EmailError::ConnectionCheck(self.config.smtp_server.clone()).into());
        }

        tracing::debug!(
            smtp_server = %self.config.smtp_server,
            smtp_port = self.config.smtp_port,
            "SMTP session opened"
        );

        Ok(Box::new(EmailSession {
            mailer: Some(mailer),
            from: self.from.clone(),
            to: self.to.clone(),
        }))
    }
}

// ---------------------------------------------------------------------------
// EmailSession
// ---------------------------------------------------------------------------

struct EmailSession {
    /// `None` once closed.
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    to: Mailbox,
}

#[async_trait]
impl NotifierSession for EmailSession {
    async fn send(&mut self, message: &Message) -> Result<(), DeliveryError> {
        let mailer = self.mailer.as_ref().ok_or(DeliveryError::SessionClosed)?;
        let email = build_email(&self.from, &self.to, message)?;
        mailer.send(email).await.map_err(EmailError::from)?;
        Ok(())
    }

    async fn close(&mut self) {
        // Dropping the transport shuts down its connection pool.
        if self.mailer.take().is_some() {
            tracing::debug!("SMTP session closed");
        }
    }
}

/// Assemble a plain-text reminder email.
fn build_email(
    from: &Mailbox,
    to: &Mailbox,
    message: &Message,
) -> Result<lettre::Message, EmailError> {
    lettre::Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| EmailError::Build(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
