use anyhow::Result;
use clap::{Parser, Subcommand};

/// larder - household pantry and shopping-list engine
#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Pantry availability and shopping-list reconciliation", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Drop the database if it exists and recreate it with migrations
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = larder::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    larder::observability::init_observability(&config.observability.log_level)?;

    match cli.command {
        Commands::Migrate => {
            let pool =
                larder::db::connect(&config.database.url, config.database.max_connections).await?;
            larder::db::migrate(&pool).await?;
        }
        Commands::Reset => {
            larder::db::reset(&config.database.url, config.database.max_connections).await?;
        }
    }

    Ok(())
}
