//! Idempotence hook for reminder dispatch.
//!
//! A run claims every due reminder from its [`ReminderLedger`] before
//! sending, and releases the claim again if the send failed. [`NoLedger`]
//! keeps at-least-once semantics: a rerun on the same day resends everything
//! due. [`InMemoryLedger`] suppresses repeats within a single run, such as
//! duplicate roster rows. Nothing is persisted between runs.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::channels::Channel;
use crate::documents::DocumentType;
use crate::reminders::ReminderEvent;

/// Identity of a reminder for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReminderKey {
    pub vehicle_id: String,
    pub document_type: DocumentType,
    pub expiry_date: NaiveDate,
    pub channel: Channel,
}

impl From<&ReminderEvent> for ReminderKey {
    fn from(event: &ReminderEvent) -> Self {
        Self {
            vehicle_id: event.candidate.vehicle_id.clone(),
            document_type: event.candidate.document_type,
            expiry_date: event.candidate.expiry_date,
            channel: event.channel,
        }
    }
}

pub trait ReminderLedger {
    /// Claim a reminder for sending. Returns `false` if it was already sent
    /// or claimed, in which case the caller must skip it.
    fn claim(&mut self, key: &ReminderKey) -> bool;

    /// Give up a claim after a failed send so a later attempt may retry.
    fn release(&mut self, key: &ReminderKey);
}

/// Ledger that remembers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLedger;

impl ReminderLedger for NoLedger {
    fn claim(&mut self, _key: &ReminderKey) -> bool {
        true
    }

    fn release(&mut self, _key: &ReminderKey) {}
}

/// Run-scoped set of claimed reminders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    claimed: HashSet<ReminderKey>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

impl ReminderLedger for InMemoryLedger {
    fn claim(&mut self, key: &ReminderKey) -> bool {
        self.claimed.insert(key.clone())
    }

    fn release(&mut self, key: &ReminderKey) {
        self.claimed.remove(key);
    }
}
