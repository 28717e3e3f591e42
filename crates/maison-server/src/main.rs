//! Maison command line.
//!
//! Commands:
//! - `maison serve` - Run the storefront API
//! - `maison migrate` - Create or update the database schema
//! - `maison create-admin` - Create or promote an admin account

use anyhow::Result;
use clap::{Parser, Subcommand};
use maison_server::logging::init_logging;
use maison_server::AppConfig;

/// Maison - fashion storefront backend
#[derive(Parser)]
#[command(name = "maison")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Apply the database schema and exit
    Migrate,

    /// Create an admin account, or promote an existing one
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.log)?;

    match cli.command {
        Commands::Serve => maison_server::serve(config).await,
        Commands::Migrate => {
            let db = maison_server::open_database(&config).await?;
            db.close().await;
            Ok(())
        }
        Commands::CreateAdmin { email, password } => {
            let db = maison_server::open_database(&config).await?;
            maison_server::ensure_admin(&db, &email, &password).await?;
            db.close().await;
            Ok(())
        }
    }
}
