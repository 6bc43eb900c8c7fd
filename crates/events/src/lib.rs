//! Reminder delivery for the fleet document scheduler.
//!
//! - [`Notifier`] / [`NotifierSession`] : the delivery capability, one
//!   implementation per channel.
//! - [`delivery`] : SMTP email and Twilio SMS/WhatsApp notifiers.
//! - [`Dispatcher`] : sends a batch through one notifier session and records
//!   a per-item outcome.

pub mod delivery;
pub mod dispatch;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailNotifier};
pub use delivery::twilio::{TwilioConfig, TwilioNotifier};
pub use dispatch::{Dispatcher, PreparedReminder, DEFAULT_SEND_TIMEOUT};
pub use notifier::{DeliveryError, Notifier, NotifierSession};
