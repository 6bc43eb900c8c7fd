//! The reminder run: roster records in, run report out.
//!
//! records -> due reminders -> ledger claim -> message -> dispatch -> report.
//! When nothing is due (or everything was already claimed) the notifier is
//! never opened.

use std::sync::Arc;

use fleetdocs_core::ledger::{ReminderKey, ReminderLedger};
use fleetdocs_core::reminders::due_reminders;
use fleetdocs_core::report::summarize;
use fleetdocs_core::roster::RosterLoad;
use fleetdocs_core::{Message, RunReport};
use fleetdocs_events::{Dispatcher, Notifier, PreparedReminder};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RunOptions;

/// Run one reminder batch and report every outcome.
///
/// The notifier's channel is used for all reminders; `options.channel` is
/// recorded for logging and must match it.
pub async fn run_reminders(
    load: RosterLoad,
    options: &RunOptions,
    notifier: Arc<dyn Notifier>,
    ledger: &mut dyn ReminderLedger,
) -> RunReport {
    let run_id = Uuid::now_v7();
    let span = tracing::info_span!("reminder_run", %run_id, channel = %options.channel);

    async move {
        let channel = notifier.channel();
        if channel != options.channel {
            tracing::warn!(
                requested = %options.channel,
                notifier = %channel,
                "Run channel differs from notifier channel, using notifier channel"
            );
        }

        let candidates = due_reminders(&load.records, options.reference_date, options.lead);
        tracing::info!(
            records = load.records.len(),
            rejected_rows = load.rejected.len(),
            due = candidates.len(),
            reference_date = %options.reference_date,
            lead_months = options.lead.as_months(),
            "Evaluated reminder rules"
        );

        let mut suppressed = 0;
        let mut batch = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let event = candidate.into_event(channel);
            if !ledger.claim(&ReminderKey::from(&event)) {
                tracing::debug!(
                    vehicle_id = %event.candidate.vehicle_id,
                    document = %event.candidate.document_type,
                    "Reminder already sent, skipping"
                );
                suppressed += 1;
                continue;
            }
            let message = Message::for_candidate(&event.candidate);
            batch.push(PreparedReminder { event, message });
        }

        let dispatcher = Dispatcher::new(notifier).with_send_timeout(options.send_timeout);
        let outcomes = dispatcher.dispatch(batch).await;

        for outcome in outcomes.iter().filter(|o| !o.is_sent()) {
            ledger.release(&ReminderKey::from(&outcome.event));
        }

        let report = summarize(outcomes)
            .with_rejected_rows(load.rejected)
            .with_suppressed(suppressed);

        tracing::info!(
            sent = report.sent_count(),
            failed = report.failed_count(),
            suppressed,
            "Reminder run finished"
        );
        report
    }
    .instrument(span)
    .await
}
