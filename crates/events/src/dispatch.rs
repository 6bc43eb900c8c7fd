//! Batch dispatch of due reminders.
//!
//! [`Dispatcher`] opens one notifier session for the batch, sends each
//! reminder individually under a per-send timeout and records a
//! [`DispatchOutcome`] for every item. A failed send never stops the rest of
//! the batch, and the session is always closed once the batch is done.

use std::sync::Arc;
use std::time::Duration;

use fleetdocs_core::{DispatchOutcome, Message, ReminderEvent};

use crate::notifier::{DeliveryError, Notifier};

/// Default upper bound on a single send (and on opening the session).
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// A due reminder with its rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedReminder {
    pub event: ReminderEvent,
    pub message: Message,
}

/// Sends reminder batches through a single notifier.
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Send every reminder in the batch.
    ///
    /// Outcomes are returned in batch order. An empty batch returns
    /// immediately without opening a session. If the session cannot be
    /// opened, every item is marked failed with the reason.
    pub async fn dispatch(&self, batch: Vec<PreparedReminder>) -> Vec<DispatchOutcome> {
        if batch.is_empty() {
            tracing::debug!("No reminders to dispatch");
            return Vec::new();
        }

        let channel = self.notifier.channel();

        let opened = match tokio::time::timeout(self.send_timeout, self.notifier.open()).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(self.send_timeout)),
        };
        let mut session = match opened {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(channel = %channel, error = %e, "Failed to open notifier session");
                let detail = format!("Could not open {channel} session: {e}");
                return batch
                    .into_iter()
                    .map(|item| DispatchOutcome::failed(item.event, detail.clone()))
                    .collect();
            }
        };

        let mut outcomes = Vec::with_capacity(batch.len());
        for PreparedReminder { event, message } in batch {
            let result = match tokio::time::timeout(self.send_timeout, session.send(&message)).await {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(self.send_timeout)),
            };

            match result {
                Ok(()) => {
                    tracing::info!(
                        vehicle_id = %event.candidate.vehicle_id,
                        document = %event.candidate.document_type,
                        channel = %channel,
                        "Reminder sent"
                    );
                    outcomes.push(DispatchOutcome::sent(event));
                }
                Err(e) => {
                    tracing::warn!(
                        vehicle_id = %event.candidate.vehicle_id,
                        document = %event.candidate.document_type,
                        channel = %channel,
                        error = %e,
                        "Reminder delivery failed"
                    );
                    outcomes.push(DispatchOutcome::failed(event, e.to_string()));
                }
            }
        }

        session.close().await;
        outcomes
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
