//! Reminder run outcomes and the end-of-run report.

use std::fmt::Write as _;

use serde::Serialize;

use crate::reminders::ReminderEvent;
use crate::roster::RowError;

/// Text shown when a run found nothing to send.
pub const NOTHING_DUE_TEXT: &str = "No reminders to send today.";

// ---------------------------------------------------------------------------
// DispatchOutcome
// ---------------------------------------------------------------------------

/// Terminal state of a dispatched reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Sent,
    Failed,
}

/// Result of sending one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub event: ReminderEvent,
    pub status: DispatchStatus,
    /// Error detail, set only for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DispatchOutcome {
    pub fn sent(event: ReminderEvent) -> Self {
        Self {
            event,
            status: DispatchStatus::Sent,
            detail: None,
        }
    }

    pub fn failed(event: ReminderEvent, detail: impl Into<String>) -> Self {
        Self {
            event,
            status: DispatchStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DispatchStatus::Sent
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Summary of one reminder run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Outcomes in candidate order.
    pub outcomes: Vec<DispatchOutcome>,
    pub had_any_due: bool,
    /// Roster rows skipped during load.
    pub rejected_rows: Vec<RowError>,
    /// Due reminders the ledger held back as already sent.
    pub suppressed: usize,
}

/// Aggregate dispatch outcomes into a report.
pub fn summarize(outcomes: Vec<DispatchOutcome>) -> RunReport {
    RunReport {
        had_any_due: !outcomes.is_empty(),
        outcomes,
        rejected_rows: Vec::new(),
        suppressed: 0,
    }
}

impl RunReport {
    pub fn with_rejected_rows(mut self, rejected: Vec<RowError>) -> Self {
        self.rejected_rows = rejected;
        self
    }

    pub fn with_suppressed(mut self, suppressed: usize) -> Self {
        self.suppressed = suppressed;
        self
    }

    pub fn sent(&self) -> impl Iterator<Item = &DispatchOutcome> {
        self.outcomes.iter().filter(|o| o.is_sent())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DispatchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_sent())
    }

    pub fn sent_count(&self) -> usize {
        self.sent().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Plain-text rendering for terminal output.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.had_any_due {
            out.push_str(NOTHING_DUE_TEXT);
            out.push('\n');
        } else {
            let sent: Vec<_> = self.sent().collect();
            if !sent.is_empty() {
                let _ = writeln!(out, "Sent {} reminder(s):", sent.len());
                for outcome in sent {
                    let _ = writeln!(out, "  {}", describe(&outcome.event));
                }
            }

            let failed: Vec<_> = self.failed().collect();
            if !failed.is_empty() {
                let _ = writeln!(out, "Failed {} reminder(s):", failed.len());
                for outcome in failed {
                    let _ = writeln!(
                        out,
                        "  {}: {}",
                        describe(&outcome.event),
                        outcome.detail.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }

        if self.suppressed > 0 {
            let _ = writeln!(out, "Skipped {} reminder(s) already sent.", self.suppressed);
        }

        if !self.rejected_rows.is_empty() {
            let _ = writeln!(out, "Skipped {} roster row(s):", self.rejected_rows.len());
            for row in &self.rejected_rows {
                let _ = writeln!(out, "  {row}");
            }
        }

        out
    }
}

/// `(vehicle, document, channel)` as shown in reports.
fn describe(event: &ReminderEvent) -> String {
    format!(
        "{} / {} / {}",
        event.candidate.vehicle_id,
        event.candidate.document_type.label(),
        event.channel.label()
    )
}
