use anyhow::{Context, Result};
use chrono::Duration;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::auth::{password::Argon2Hasher, AuthService, TokenService};
use crate::schemas::AppState;

/// Runtime settings, read from defaults, `.env` and the process environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    /// Comma separated list of CORS origins
    pub allowed_origins: String,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Loads `.env` (if present) and overlays environment variables on the defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("database_url", "sqlite://vaultx.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("max_connections", 10)?
            .set_default("jwt_secret", "change-me-in-production-please")?
            .set_default("access_token_ttl_secs", 15 * 60)?
            .set_default("refresh_token_ttl_secs", 7 * 24 * 60 * 60)?
            .set_default("argon2_memory_kib", 19 * 1024)?
            .set_default("argon2_iterations", 2)?
            .set_default("allowed_origins", "http://localhost:5173,http://localhost:3000")?
            .set_default("request_timeout_secs", 30)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration values")?;
        debug!("Configuration loaded, bind address {}", config.bind_address);
        Ok(config)
    }

    /// Command-line flags take precedence over the environment.
    pub fn override_with(&mut self, database_url: Option<String>, bind_address: Option<String>) {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_token_ttl_secs)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Opens the connection pool with the configured size.
pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", config.database_url);
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(std::time::Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", config.database_url))?;
    debug!("Database connection established");
    Ok(db)
}

/// Builds the shared state for an already connected store.
pub fn build_app_state(db: DatabaseConnection, config: &AppConfig) -> Result<AppState> {
    trace!("Building application state");
    let hasher = Argon2Hasher::new(config.argon2_memory_kib, config.argon2_iterations)
        .context("Invalid Argon2 parameters")?;
    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.access_token_ttl());

    Ok(AppState {
        db,
        auth: Arc::new(AuthService {
            hasher,
            tokens,
            refresh_ttl: config.refresh_token_ttl(),
        }),
        config: Arc::new(config.clone()),
    })
}
