//! # Zenora Provisioning Service Entry Point

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use zenora::{config::ConfigLoader, db::init_pool, server::run_server, telemetry};

#[derive(Parser)]
#[command(name = "zenora", about = "Zenora employee provisioning service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending database migrations and exit
    Migrate,
    /// Start the API server (default)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;

    telemetry::init_tracing(&config)?;
    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            Migrator::up(&db, None).await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::Serve => {
            Migrator::up(&db, None).await?;
            run_server(config, db).await
        }
    }
}
