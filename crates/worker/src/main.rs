use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetdocs_worker::cli::{Cli, Commands};
use fleetdocs_worker::commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetdocs_worker=info,fleetdocs_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output = match &cli.command {
        Commands::Remind(args) => commands::remind(args, cli.json).await?,
        Commands::Diesel { command } => commands::diesel(command, cli.json)?,
    };
    println!("{output}");
    Ok(())
}
