//! Fleet document reminder domain logic.
//!
//! Pure building blocks with no I/O and no async:
//!
//! - [`roster`] : sheet rows to [`DocumentRecord`]s, with per-row rejection.
//! - [`reminders`] : lead-time thresholds and the due-reminder rule.
//! - [`message`] : reminder text.
//! - [`ledger`] : idempotence hook consulted before dispatch.
//! - [`report`] : dispatch outcomes and the run report.
//! - [`diesel`] : fleet fuel cost arithmetic.

pub mod channels;
pub mod diesel;
pub mod documents;
pub mod error;
pub mod ledger;
pub mod message;
pub mod reminders;
pub mod report;
pub mod roster;
pub mod validation;

pub use channels::Channel;
pub use documents::{DocumentRecord, DocumentType};
pub use error::CoreError;
pub use message::Message;
pub use reminders::{LeadTime, ReminderCandidate, ReminderEvent};
pub use report::{DispatchOutcome, DispatchStatus, RunReport};
