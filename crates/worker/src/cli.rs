use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fleetdocs_core::diesel::{
    DEFAULT_CONSUMPTION_RATE, DEFAULT_FLEET_SIZE, DEFAULT_FUEL_PRICE, DEFAULT_MONTHLY_FUEL_L,
    DEFAULT_MONTHLY_MILEAGE_KM, DEFAULT_WEEKLY_LIMIT_KM,
};
use fleetdocs_core::reminders::DEFAULT_LEAD_MONTHS;
use fleetdocs_core::Channel;

/// Default per-send timeout, in seconds.
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "fleetdocs", version, about = "Fleet diesel cost and document expiry reminders")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send reminders for documents that expire within the lead time.
    Remind(RemindArgs),
    /// Diesel consumption and cost calculations.
    Diesel {
        #[command(subcommand)]
        command: DieselCommands,
    },
}

#[derive(Args, Debug)]
pub struct RemindArgs {
    /// JSON export of the `Documents` sheet.
    #[arg(long, env = "REMINDER_ROSTER")]
    pub roster: PathBuf,
    /// Delivery channel: email, sms or whatsapp.
    #[arg(long, env = "REMINDER_CHANNEL")]
    pub channel: Channel,
    /// Reference date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, default_value_t = DEFAULT_LEAD_MONTHS)]
    pub lead_months: u32,
    #[arg(long, default_value_t = DEFAULT_SEND_TIMEOUT_SECS)]
    pub send_timeout_secs: u64,
    /// Skip identical reminders within this run.
    #[arg(long, default_value_t = false)]
    pub dedupe: bool,
}

#[derive(Subcommand, Debug)]
pub enum DieselCommands {
    /// Consumption rate (L/km) from a month of usage.
    Rate {
        #[arg(long, default_value_t = DEFAULT_MONTHLY_MILEAGE_KM)]
        mileage: f64,
        #[arg(long, default_value_t = DEFAULT_MONTHLY_FUEL_L)]
        fuel: f64,
    },
    /// Monthly cost per truck and for the fleet, with the weekly mileage check.
    Cost {
        #[arg(long, default_value_t = DEFAULT_MONTHLY_MILEAGE_KM)]
        mileage: f64,
        #[arg(long, default_value_t = DEFAULT_CONSUMPTION_RATE)]
        rate: f64,
        #[arg(long, default_value_t = DEFAULT_FUEL_PRICE)]
        price: f64,
        #[arg(long, default_value_t = DEFAULT_WEEKLY_LIMIT_KM)]
        weekly_limit: f64,
        #[arg(long, default_value_t = DEFAULT_FLEET_SIZE)]
        fleet_size: u32,
    },
}
