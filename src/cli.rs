use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use crate::config::AppConfig;
use commands::{init_database, migrate_and_serve, serve};

#[derive(Parser)]
#[command(name = "vaultx")]
#[command(about = "Vault-X budgeting backend with CLI tools and web server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    ///
    /// Refuses to start while database migrations are pending.
    Serve {
        /// Database URL, e.g. sqlite:///absolute/path/to/vaultx.db?mode=rwc
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Apply pending migrations, then start the web server
    MigrateAndServe {
        /// Database URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Bind address for the web server
        #[arg(short, long, env = "BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Initialize the database using migrations
    InitDb {
        /// Database URL
        ///
        /// For SQLite, append `?mode=rwc` to create the file when missing.
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = AppConfig::load()?;

        match self.command {
            Commands::Serve { database_url, bind_address } => {
                config.override_with(database_url, bind_address);
                serve(config).await?;
            }
            Commands::MigrateAndServe { database_url, bind_address } => {
                config.override_with(database_url, bind_address);
                migrate_and_serve(config).await?;
            }
            Commands::InitDb { database_url } => {
                config.override_with(database_url, None);
                init_database(&config).await?;
            }
        }
        Ok(())
    }
}
