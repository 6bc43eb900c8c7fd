//! Command handlers. Each returns the text to print on stdout.

use std::time::Duration;

use anyhow::Context;
use fleetdocs_core::diesel::{
    check_weekly_limit, compute_cost, consumption_rate, format_amount, DieselInputs, LimitStatus,
};
use fleetdocs_core::ledger::{InMemoryLedger, NoLedger, ReminderLedger};
use fleetdocs_core::{roster, LeadTime, RunReport};
use serde_json::json;

use crate::cli::{DieselCommands, RemindArgs};
use crate::config::{notifier_from_env, RunOptions};
use crate::roster_file::read_roster;
use crate::run::run_reminders;

// ---------------------------------------------------------------------------
// remind
// ---------------------------------------------------------------------------

impl From<&RemindArgs> for RunOptions {
    fn from(args: &RemindArgs) -> Self {
        let mut options = RunOptions::new(args.channel);
        if let Some(date) = args.date {
            options.reference_date = date;
        }
        options.lead = LeadTime::months(args.lead_months);
        options.send_timeout = Duration::from_secs(args.send_timeout_secs);
        options.dedupe = args.dedupe;
        options
    }
}

/// Load the roster, build the channel's notifier and run one reminder batch.
///
/// Fatal problems (unreadable file, missing column, bad configuration) are
/// returned as errors before anything is sent. Per-reminder failures are part
/// of the report.
pub async fn remind(args: &RemindArgs, json: bool) -> anyhow::Result<String> {
    let sheet = read_roster(&args.roster)?;
    let load = roster::load(&sheet)
        .with_context(|| format!("Cannot load roster {}", args.roster.display()))?;

    let options = RunOptions::from(args);
    let notifier = notifier_from_env(options.channel)
        .with_context(|| format!("Cannot configure {} delivery", options.channel))?;

    let mut no_ledger = NoLedger;
    let mut run_ledger = InMemoryLedger::new();
    let ledger: &mut dyn ReminderLedger = if options.dedupe {
        &mut run_ledger
    } else {
        &mut no_ledger
    };

    let report = run_reminders(load, &options, notifier, ledger).await;
    render_report(&report, json)
}

pub fn render_report(report: &RunReport, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.render())
    }
}

// ---------------------------------------------------------------------------
// diesel
// ---------------------------------------------------------------------------

pub fn diesel(command: &DieselCommands, json: bool) -> anyhow::Result<String> {
    match *command {
        DieselCommands::Rate { mileage, fuel } => {
            let rate = consumption_rate(mileage, fuel)?;
            if json {
                return Ok(serde_json::to_string_pretty(&json!({
                    "monthly_mileage": mileage,
                    "monthly_fuel": fuel,
                    "consumption_rate": rate,
                }))?);
            }
            Ok(format!("Consumption rate: {rate:.3} L/km per truck"))
        }
        DieselCommands::Cost {
            mileage,
            rate,
            price,
            weekly_limit,
            fleet_size,
        } => {
            let inputs = DieselInputs {
                monthly_mileage: mileage,
                consumption_rate: rate,
                fuel_price: price,
                fleet_size,
            };
            let cost = compute_cost(&inputs)?;
            let weekly = check_weekly_limit(mileage, weekly_limit)?;

            if json {
                return Ok(serde_json::to_string_pretty(&json!({
                    "inputs": inputs,
                    "cost": cost,
                    "weekly_mileage": weekly,
                }))?);
            }

            let limit_line = match weekly.status {
                LimitStatus::Exceeded => format!(
                    "Avg weekly mileage {:.1} km exceeds limit {:.1} km.",
                    weekly.average_weekly, weekly.limit
                ),
                LimitStatus::Within => format!(
                    "Avg weekly mileage {:.1} km within limit per truck.",
                    weekly.average_weekly
                ),
            };
            Ok(format!(
                "Monthly diesel cost per truck: SAR {}\nMonthly diesel cost for fleet: SAR {}\n{}",
                format_amount(cost.cost_per_truck),
                format_amount(cost.total_cost),
                limit_line
            ))
        }
    }
}
