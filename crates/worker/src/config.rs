use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use fleetdocs_core::{Channel, CoreError, LeadTime};
use fleetdocs_events::{EmailConfig, EmailNotifier, Notifier, TwilioConfig, TwilioNotifier, DEFAULT_SEND_TIMEOUT};

/// Settings for a single reminder run.
///
/// Built once by the caller and passed down explicitly; nothing here is
/// global.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Date the due rule is evaluated against.
    pub reference_date: NaiveDate,
    pub lead: LeadTime,
    pub channel: Channel,
    /// Upper bound for opening the session and for each individual send.
    pub send_timeout: Duration,
    /// Drop identical reminders within the run.
    pub dedupe: bool,
}

impl RunOptions {
    /// Options for `channel` with defaults: today's local date, one-month
    /// lead, 30 s send timeout, no deduplication.
    pub fn new(channel: Channel) -> Self {
        Self {
            reference_date: chrono::Local::now().date_naive(),
            lead: LeadTime::default(),
            channel,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            dedupe: false,
        }
    }
}

/// Build the notifier for a channel from environment configuration.
///
/// Only the selected channel's variables are read. Any missing or malformed
/// setting fails here, before a session is opened.
pub fn notifier_from_env(channel: Channel) -> Result<Arc<dyn Notifier>, CoreError> {
    let notifier: Arc<dyn Notifier> = match channel {
        Channel::Email => {
            let config = EmailConfig::from_env()?;
            tracing::info!(smtp_server = %config.smtp_server, smtp_port = config.smtp_port, "Loaded email configuration");
            Arc::new(EmailNotifier::new(config)?)
        }
        Channel::Sms | Channel::WhatsApp => {
            let config = TwilioConfig::from_env()?;
            tracing::info!(channel = %channel, api_base = %config.api_base, "Loaded Twilio configuration");
            Arc::new(TwilioNotifier::new(config, channel)?)
        }
    };
    Ok(notifier)
}
