mod board;
mod ingest;
mod metrics;


use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::board::BoardCommands;
use crate::ingest::IngestCommands;

#[derive(Debug, Parser)]
#[command(name = "feedpulse")]
#[command(about = "Feedback ingestion, classification and metrics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Manage boards
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Ingest feedback into a board
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
    /// Print a board's metric report as JSON
    Metrics {
        /// Board to report on
        #[arg(long)]
        board: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    run(cli).await
}

/// Loads configuration and dispatches an already parsed command. Parsing
/// happens first so `--help` and usage errors need no environment.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = feedpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = feedpulse_db::PoolConfig::from_app_config(&config);
    let pool = feedpulse_db::connect_pool(&config.database_url, pool_config).await?;
    tracing::debug!(env = %config.env, "connected to database");

    match cli.command {
        Commands::Migrate => {
            let applied = feedpulse_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Board { command } => board::run_board(&pool, command).await?,
        Commands::Ingest { command } => ingest::run_ingest(&pool, &config, command).await?,
        Commands::Metrics { board } => metrics::run_metrics(&pool, board).await?,
    }

    Ok(())
}
