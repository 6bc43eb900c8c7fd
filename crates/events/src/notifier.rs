//! The notifier capability.
//!
//! A [`Notifier`] knows how to reach one channel. Dispatch opens a single
//! [`NotifierSession`] per batch, sends every message through it and closes
//! it afterwards, so connection setup is paid once per run.

use std::time::Duration;

use async_trait::async_trait;
use fleetdocs_core::{Channel, Message};

use crate::delivery::email::EmailError;
use crate::delivery::twilio::TwilioError;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure to deliver a single reminder, or to open the session for a batch.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Twilio(#[from] TwilioError),

    /// The operation did not finish within the configured timeout.
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// A send was attempted on a session that was already closed.
    #[error("Notifier session is closed")]
    SessionClosed,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Notifier: Send + Sync {
    /// The channel this notifier delivers to.
    fn channel(&self) -> Channel;

    /// Acquire a session for a batch of sends.
    async fn open(&self) -> Result<Box<dyn NotifierSession>, DeliveryError>;
}

#[async_trait]
pub trait NotifierSession: Send {
    /// Deliver one message.
    async fn send(&mut self, message: &Message) -> Result<(), DeliveryError>;

    /// Release the session. Called exactly once, after the last send.
    async fn close(&mut self);
}
