//! Reminder delivery channels.
//!
//! The string names must match what the CLI accepts for `--channel` and what
//! the run report renders.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Reminder delivered by SMTP email.
pub const CHANNEL_EMAIL: &str = "email";

/// Reminder delivered as a plain SMS through Twilio.
pub const CHANNEL_SMS: &str = "sms";

/// Reminder delivered as a WhatsApp message through Twilio.
pub const CHANNEL_WHATSAPP: &str = "whatsapp";

/// Address prefix Twilio expects for WhatsApp senders and recipients.
pub const WHATSAPP_ADDRESS_PREFIX: &str = "whatsapp:";

/// Delivery medium for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    #[serde(rename = "whatsapp")]
    WhatsApp,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::WhatsApp];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => CHANNEL_EMAIL,
            Self::Sms => CHANNEL_SMS,
            Self::WhatsApp => CHANNEL_WHATSAPP,
        }
    }

    /// Human-readable label used in rendered reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "SMS",
            Self::WhatsApp => "WhatsApp",
        }
    }

    /// Whether this channel goes through the Twilio messaging API.
    pub fn is_phone(self) -> bool {
        matches!(self, Self::Sms | Self::WhatsApp)
    }

    /// Format a phone number as a sender/recipient address for this channel.
    ///
    /// WhatsApp addresses carry the `whatsapp:` prefix; SMS and email
    /// addresses are returned unchanged.
    pub fn address(self, number: &str) -> String {
        match self {
            Self::WhatsApp => format!("{WHATSAPP_ADDRESS_PREFIX}{number}"),
            Self::Email | Self::Sms => number.to_string(),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Channel {
    type Err = CoreError;

    /// Case-insensitive parse of `email`, `sms` or `whatsapp`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown channel '{s}', expected one of: email, sms, whatsapp"
                ))
            })
    }
}
