//! Document expiry reminder rules.
//!
//! A document is due for a reminder once the reference date reaches its
//! threshold: the expiry date minus the lead time, in calendar months.
//! Overdue documents stay due; the engine does not tell them apart from
//! upcoming ones.
//!
//! Everything here is pure. Dates are calendar dates with no time of day.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::channels::Channel;
use crate::documents::{DocumentRecord, DocumentType};

// ---------------------------------------------------------------------------
// Lead time
// ---------------------------------------------------------------------------

/// Default lead time before expiry, in calendar months.
pub const DEFAULT_LEAD_MONTHS: u32 = 1;

/// How long before expiry a reminder becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTime {
    months: u32,
}

impl LeadTime {
    pub fn months(months: u32) -> Self {
        Self { months }
    }

    pub fn as_months(self) -> u32 {
        self.months
    }
}

impl Default for LeadTime {
    fn default() -> Self {
        Self::months(DEFAULT_LEAD_MONTHS)
    }
}

// ---------------------------------------------------------------------------
// Candidates and events
// ---------------------------------------------------------------------------

/// A document of one vehicle whose reminder is due.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderCandidate {
    pub vehicle_id: String,
    pub document_type: DocumentType,
    pub expiry_date: NaiveDate,
}

impl ReminderCandidate {
    /// Bind this candidate to the channel it will be delivered through.
    pub fn into_event(self, channel: Channel) -> ReminderEvent {
        ReminderEvent {
            candidate: self,
            channel,
        }
    }
}

/// A due reminder addressed to a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderEvent {
    #[serde(flatten)]
    pub candidate: ReminderCandidate,
    pub channel: Channel,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// The date from which a reminder for `expiry` is due.
///
/// Month subtraction keeps the day of month, clamped to the last day of the
/// target month: 2024-03-31 minus one month is 2024-02-29.
pub fn reminder_threshold(expiry: NaiveDate, lead: LeadTime) -> NaiveDate {
    expiry
        .checked_sub_months(Months::new(lead.months))
        .unwrap_or(NaiveDate::MIN)
}

/// Whether a document expiring on `expiry` is due on `reference`.
pub fn is_due(reference: NaiveDate, expiry: NaiveDate, lead: LeadTime) -> bool {
    reference >= reminder_threshold(expiry, lead)
}

/// Collect every due reminder for the given records.
///
/// Output follows record order, then [`DocumentType::ALL`] order within a
/// record. Identical candidates from duplicate rows are all kept.
pub fn due_reminders(
    records: &[DocumentRecord],
    reference: NaiveDate,
    lead: LeadTime,
) -> Vec<ReminderCandidate> {
    records
        .iter()
        .flat_map(|record| {
            record
                .documents()
                .filter(move |(_, expiry)| is_due(reference, *expiry, lead))
                .map(move |(document_type, expiry_date)| ReminderCandidate {
                    vehicle_id: record.vehicle_id().to_string(),
                    document_type,
                    expiry_date,
                })
        })
        .collect()
}
