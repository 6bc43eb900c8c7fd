//! Reminder message text.

use serde::Serialize;

use crate::reminders::ReminderCandidate;

/// A rendered reminder. Email uses both fields; SMS and WhatsApp send the
/// body only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

impl Message {
    /// Render the reminder for a due document. The text is the same for
    /// every channel.
    pub fn for_candidate(candidate: &ReminderCandidate) -> Self {
        let text = format!(
            "Reminder: {} for {} expires on {}",
            candidate.document_type.label(),
            candidate.vehicle_id,
            candidate.expiry_date.format("%Y-%m-%d"),
        );
        Self {
            subject: text.clone(),
            body: text,
        }
    }
}
