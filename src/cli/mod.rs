use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config;
use crate::database::DatabaseManager;
use crate::server;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "cursada-api")]
#[command(about = "Cursada API - users, cursos, enrollments and payments over HTTP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on; overrides API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Cursada API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("connecting to the database")?;
            if config.database.run_migrations_on_start {
                DatabaseManager::migrate(&pool).await.context("running migrations")?;
            }
            server::serve(AppState::new(pool), port.unwrap_or(config.api.port)).await
        }
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("connecting to the database")?;
            DatabaseManager::migrate(&pool).await.context("running migrations")?;
            Ok(())
        }
    }
}
