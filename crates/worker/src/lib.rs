//! Reminder runs and diesel calculations behind the `fleetdocs` binary.
//!
//! The binary stays thin: it loads `.env`, sets up tracing, parses the
//! command line and hands off to [`commands`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod roster_file;
pub mod run;

pub use config::{notifier_from_env, RunOptions};
pub use run::run_reminders;
